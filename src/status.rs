//! The severity every check reports, and the exit code that goes with it

use std::fmt;
use std::process;

/// How bad things are
///
/// The ordering is the order in which statuses win when they are combined:
/// `max(Warning, Critical)` is `Critical`, and `Unknown` beats everything.
/// `Unknown` means "could not determine", so the report keeps the fragments
/// of known problems visible even when the overall status is `Unknown`.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// The process exit code the monitoring system expects
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn exit(self) -> ! {
        process::exit(self.code())
    }
}

impl Default for Status {
    fn default() -> Status {
        Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}
