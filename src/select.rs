//! Picking which items of a metric family to check
//!
//! Items are closed enumerations (see [`crate::mib`]), so a name the operator
//! typed either maps to one of them or is rejected before we talk to the
//! device at all.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

/// A name that isn't in the table it was looked up in
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
    pub known: Vec<&'static str>,
}

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown {} '{}', expected one of: {}",
            self.kind,
            self.name,
            self.known.iter().join(", ")
        )
    }
}

/// Parse every name in `raw`, failing on the first one that isn't known
pub fn parse_names<T>(raw: &[String]) -> Result<Vec<T>, UnknownName>
where
    T: FromStr<Err = UnknownName>,
{
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Include and exclude lists for one metric family
///
/// An empty include list means everything. Exclusions always win.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection<T> {
    pub include: Vec<T>,
    pub exclude: Vec<T>,
}

impl<T> Selection<T>
where
    T: FromStr<Err = UnknownName> + PartialEq + Copy + fmt::Display,
{
    pub fn parse(include: &[String], exclude: &[String]) -> Result<Selection<T>, UnknownName> {
        Ok(Selection {
            include: parse_names(include)?,
            exclude: parse_names(exclude)?,
        })
    }

    /// The selected items out of `all`, sorted by name
    pub fn apply(&self, all: &[T]) -> Vec<T> {
        let mut picked: Vec<T> = all
            .iter()
            .cloned()
            .filter(|item| self.include.is_empty() || self.include.contains(item))
            .filter(|item| !self.exclude.contains(item))
            .collect();
        picked.sort_by_key(|item| item.to_string());
        picked
    }
}
