//! Operator-supplied thresholds, and converting them against a capacity
//!
//! A threshold is a single breach point, given either as an absolute amount
//! (`800`, in the same unit as the capacity) or as a percentage of the
//! capacity (`80%`). Which side of the breach point is bad depends on the
//! [`UsageMode`]: in `Used` mode the check goes off when usage reaches the
//! bound, in `Free` mode when the free amount drops below it.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BOUND: Regex = Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(%?)\s*$").unwrap();
}

#[derive(Debug, PartialEq, Eq)]
pub enum ThresholdError {
    /// The string was not `N` or `N%`
    Invalid(String),
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ThresholdError::Invalid(ref raw) => write!(
                f,
                "invalid threshold '{}', expected a number like '80' or '80%'",
                raw
            ),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// A percentage can't be taken of nothing
    ZeroCapacity { label: String },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConversionError::ZeroCapacity { ref label } => {
                write!(f, "{} reported a total capacity of 0", label)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Unit {
    Percent,
    Absolute,
}

/// One parsed breach point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub unit: Unit,
}

impl Bound {
    pub fn percent(value: f64) -> Bound {
        Bound {
            value,
            unit: Unit::Percent,
        }
    }

    pub fn absolute(value: f64) -> Bound {
        Bound {
            value,
            unit: Unit::Absolute,
        }
    }

    /// Resolve this bound into both of its forms
    ///
    /// This is the only place percentages and absolute amounts are converted
    /// into each other.
    pub fn convert(self, capacity: f64, label: &str) -> Result<Converted, ConversionError> {
        if capacity <= 0.0 {
            return Err(ConversionError::ZeroCapacity {
                label: label.to_owned(),
            });
        }
        Ok(match self.unit {
            Unit::Percent => Converted {
                percent: self.value,
                absolute: capacity * self.value / 100.0,
            },
            Unit::Absolute => Converted {
                percent: self.value / capacity * 100.0,
                absolute: self.value,
            },
        })
    }
}

impl FromStr for Bound {
    type Err = ThresholdError;

    fn from_str(raw: &str) -> Result<Bound, ThresholdError> {
        let caps = BOUND
            .captures(raw)
            .ok_or_else(|| ThresholdError::Invalid(raw.to_owned()))?;
        let value: f64 = caps[1]
            .parse()
            .map_err(|_| ThresholdError::Invalid(raw.to_owned()))?;
        if caps[2].is_empty() {
            Ok(Bound::absolute(value))
        } else {
            Ok(Bound::percent(value))
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.unit {
            Unit::Percent => write!(f, "{}%", self.value),
            Unit::Absolute => write!(f, "{}", self.value),
        }
    }
}

/// A bound in both of its forms, for one particular capacity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Converted {
    pub percent: f64,
    pub absolute: f64,
}

/// Whether thresholds describe how much is used or how much is left
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageMode {
    Used,
    Free,
}

impl UsageMode {
    pub fn from_free_flag(free: bool) -> UsageMode {
        if free {
            UsageMode::Free
        } else {
            UsageMode::Used
        }
    }

    /// The (warning, critical) percentages to use when the operator gave none
    pub fn defaults(self) -> (Bound, Bound) {
        match self {
            UsageMode::Used => (Bound::percent(80.0), Bound::percent(90.0)),
            UsageMode::Free => (Bound::percent(20.0), Bound::percent(10.0)),
        }
    }

    /// Short word for messages and perfdata labels
    pub fn as_str(self) -> &'static str {
        match self {
            UsageMode::Used => "used",
            UsageMode::Free => "free",
        }
    }
}

/// The warning and critical bounds for one capacity metric
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UsageThresholds {
    pub mode: UsageMode,
    pub warning: Bound,
    pub critical: Bound,
}

impl UsageThresholds {
    /// Parse operator input, filling in the mode's default for anything missing
    pub fn parse(
        warning: Option<&str>,
        critical: Option<&str>,
        mode: UsageMode,
    ) -> Result<UsageThresholds, ThresholdError> {
        let (default_warning, default_critical) = mode.defaults();
        Ok(UsageThresholds {
            mode,
            warning: parse_or(warning, default_warning)?,
            critical: parse_or(critical, default_critical)?,
        })
    }
}

fn parse_or(raw: Option<&str>, default: Bound) -> Result<Bound, ThresholdError> {
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(default),
    }
}
