//! Days until a subscription runs out
//!
//! The appliance reports expiry dates as free text like `Jan 15 2024`. We
//! only understand the `<Mon> <day> <year>` shape; anything else is
//! [`ExpiryState::Unparseable`], which the license check reports as unknown
//! for that one module.

use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::classify::{Direction, Levels};
use crate::status::Status;

lazy_static! {
    static ref EXPIRY: Regex =
        Regex::new(r"^\s*([A-Za-z]{3})[A-Za-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\s*$").unwrap();
}

static MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryState {
    Valid(NaiveDate),
    Unparseable,
}

impl fmt::Display for ExpiryState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExpiryState::Valid(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ExpiryState::Unparseable => write!(f, "unparseable"),
        }
    }
}

pub fn parse_expiry(raw: &str) -> ExpiryState {
    let caps = match EXPIRY.captures(raw) {
        Some(caps) => caps,
        None => return ExpiryState::Unparseable,
    };
    let month = caps[1].to_lowercase();
    let month = match MONTHS.iter().position(|m| *m == month) {
        Some(idx) => idx as u32 + 1,
        None => return ExpiryState::Unparseable,
    };
    let parsed = caps[2]
        .parse::<u32>()
        .ok()
        .and_then(|day| caps[3].parse::<i32>().ok().map(|year| (year, day)))
        .and_then(|(year, day)| NaiveDate::from_ymd_opt(year, month, day));
    match parsed {
        Some(date) => ExpiryState::Valid(date),
        None => ExpiryState::Unparseable,
    }
}

/// Signed whole days from `today` until `expires`; negative once expired
pub fn days_left(today: NaiveDate, expires: NaiveDate) -> i64 {
    expires.signed_duration_since(today).num_days()
}

/// Warning and critical day counts
///
/// Fewer days left than a bound breaches it. Critical is normally the smaller
/// number, but that is not enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayLevels {
    pub warning: i64,
    pub critical: i64,
}

impl DayLevels {
    pub fn evaluate(&self, days_left: i64) -> Status {
        self.levels().evaluate(days_left as f64)
    }

    fn levels(&self) -> Levels {
        Levels::new(self.warning as f64, self.critical as f64, Direction::Below)
    }
}
