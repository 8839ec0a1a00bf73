//! Turn observations into statuses
//!
//! There are two ways to classify something:
//!
//! * numeric values are compared against warning and critical [`Levels`]
//! * device states are looked up in a [`StatePolicy`] built from the
//!   operator's `--status-ok` and `--status-warning` lists
//!
//! Both are pure functions of their inputs.

use std::fmt;

use crate::status::Status;

/// Which side of a bound is bad
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Breached when `value >= bound`, e.g. percent used
    Above,
    /// Breached when `value < bound`, e.g. percent free or days left
    Below,
}

impl Direction {
    pub fn breaches(self, value: f64, bound: f64) -> bool {
        match self {
            Direction::Above => value >= bound,
            Direction::Below => value < bound,
        }
    }
}

/// Warning and critical bounds, in the same unit as the value they judge
///
/// The two bounds are checked independently and critical wins. Nothing
/// checks that critical is stricter than warning: with `warning = 95,
/// critical = 90` a value of 92 is critical and a value of 96 is critical too.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Levels {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub direction: Direction,
}

impl Levels {
    pub fn new(warning: f64, critical: f64, direction: Direction) -> Levels {
        Levels {
            warning: Some(warning),
            critical: Some(critical),
            direction,
        }
    }

    pub fn evaluate(&self, value: f64) -> Status {
        let breached = |bound: Option<f64>| {
            bound.map_or(false, |b| self.direction.breaches(value, b))
        };
        if breached(self.critical) {
            Status::Critical
        } else if breached(self.warning) {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}

/// A state as the device reported it
///
/// Devices are free to send codes that aren't in our tables (new firmware,
/// broken agents); those are kept around so they can be shown to the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reported<S> {
    Known(S),
    Unrecognized(i64),
}

impl<S: fmt::Display> fmt::Display for Reported<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Reported::Known(ref state) => write!(f, "{}", state),
            Reported::Unrecognized(code) => write!(f, "unknown state code {}", code),
        }
    }
}

/// Which reported states are fine, and which are only worth a warning
#[derive(Clone, Debug, PartialEq)]
pub struct StatePolicy<S> {
    pub ok: Vec<S>,
    pub warning: Vec<S>,
}

impl<S: PartialEq> StatePolicy<S> {
    pub fn new(ok: Vec<S>, warning: Vec<S>) -> StatePolicy<S> {
        StatePolicy { ok, warning }
    }

    /// The warning list is consulted first, so a state in it is never
    /// critical. Anything not in the ok list, including codes we don't
    /// recognize, is critical.
    pub fn evaluate(&self, state: &Reported<S>) -> Status {
        match *state {
            Reported::Known(ref s) if self.warning.contains(s) => Status::Warning,
            Reported::Known(ref s) if self.ok.contains(s) => Status::Ok,
            _ => Status::Critical,
        }
    }
}

/// The outcome of classifying one observation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub message: String,
}

impl Classification {
    pub fn new<M: Into<String>>(status: Status, message: M) -> Classification {
        Classification {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Svc {
        Running,
        Stopped,
        Dead,
    }

    #[test]
    fn usage_levels() {
        let levels = Levels::new(80.0, 90.0, Direction::Above);
        assert_eq!(levels.evaluate(78.0), Status::Ok);
        assert_eq!(levels.evaluate(80.0), Status::Warning);
        assert_eq!(levels.evaluate(81.0), Status::Warning);
        assert_eq!(levels.evaluate(90.0), Status::Critical);
        assert_eq!(levels.evaluate(100.0), Status::Critical);
    }

    #[test]
    fn free_levels() {
        let levels = Levels::new(20.0, 10.0, Direction::Below);
        assert_eq!(levels.evaluate(22.0), Status::Ok);
        assert_eq!(levels.evaluate(20.0), Status::Ok);
        assert_eq!(levels.evaluate(19.0), Status::Warning);
        assert_eq!(levels.evaluate(15.0), Status::Warning);
        assert_eq!(levels.evaluate(9.5), Status::Critical);
    }

    #[test]
    fn inverted_levels_are_not_corrected() {
        let levels = Levels::new(95.0, 90.0, Direction::Above);
        assert_eq!(levels.evaluate(89.0), Status::Ok);
        assert_eq!(levels.evaluate(92.0), Status::Critical);
        assert_eq!(levels.evaluate(96.0), Status::Critical);
    }

    #[test]
    fn missing_bounds_never_breach() {
        let levels = Levels {
            warning: None,
            critical: Some(5.0),
            direction: Direction::Below,
        };
        assert_eq!(levels.evaluate(10.0), Status::Ok);
        assert_eq!(levels.evaluate(4.0), Status::Critical);
    }

    #[test]
    fn states_outside_ok_list_are_critical() {
        let policy = StatePolicy::new(vec![Svc::Running], vec![]);
        assert_eq!(policy.evaluate(&Reported::Known(Svc::Running)), Status::Ok);
        assert_eq!(policy.evaluate(&Reported::Known(Svc::Stopped)), Status::Critical);
    }

    #[test]
    fn warning_list_wins_over_ok_list() {
        let policy = StatePolicy::new(vec![Svc::Running], vec![Svc::Stopped]);
        assert_eq!(policy.evaluate(&Reported::Known(Svc::Stopped)), Status::Warning);
        assert_eq!(policy.evaluate(&Reported::Known(Svc::Dead)), Status::Critical);

        let both = StatePolicy::new(vec![Svc::Stopped], vec![Svc::Stopped]);
        assert_eq!(both.evaluate(&Reported::Known(Svc::Stopped)), Status::Warning);
    }

    #[test]
    fn unrecognized_codes_are_critical() {
        let policy = StatePolicy::new(vec![Svc::Running], vec![Svc::Stopped]);
        assert_eq!(policy.evaluate(&Reported::Unrecognized(42)), Status::Critical);
        assert_eq!(
            Reported::<u8>::Unrecognized(42).to_string(),
            "unknown state code 42"
        );
    }
}
