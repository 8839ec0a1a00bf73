//! Failures that end a check run before anything is classified
//!
//! Every error from the modules below can be converted into a `CheckError`,
//! and every `CheckError` is reported as `UNKNOWN` with no partial results.
//! Problems with a single item (an unparseable date, a state code we don't
//! know) are not errors; they are classified and reported with the item.

use std::fmt;

use derive_more::From;

use crate::select::UnknownName;
use crate::snmp::FetchError;
use crate::threshold::ThresholdError;

#[derive(Debug, From)]
pub enum CheckError {
    /// A `--warning`/`--critical` value that isn't `N` or `N%`
    Threshold(ThresholdError),
    /// An item or state name that isn't in the device tables
    UnknownName(UnknownName),
    /// An invalid `--pattern` or `--exclude-pattern`
    Pattern(regex::Error),
    /// Options that can't be turned into an SNMP session
    Options(String),
    /// The device could not be queried
    Fetch(FetchError),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CheckError::*;
        match *self {
            Threshold(ref e) => write!(f, "{}", e),
            UnknownName(ref e) => write!(f, "{}", e),
            Pattern(ref e) => write!(f, "invalid pattern: {}", e),
            Options(ref e) => write!(f, "{}", e),
            Fetch(ref e) => write!(f, "SNMP fetch failed: {}", e),
        }
    }
}

impl std::error::Error for CheckError {}
