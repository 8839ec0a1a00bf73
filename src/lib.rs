//! SFOS plugins: strongly typed Nagios checks for Sophos XG firewalls
//!
//! Every check binary in `src/bin` queries the appliance over SNMP and turns
//! what it finds into the standard plugin output: a summary line, an optional
//! detail block, an optional performance-data line, and an exit code that
//! tells the monitoring system how bad things are.
//!
//! The pieces that every check shares live here:
//!
//! * [`threshold`] parses operator thresholds like `80` or `80%` and converts
//!   them against a capacity
//! * [`classify`] turns a value or a device state into a [`Status`]
//! * [`expiry`] works out how many days a subscription has left
//! * [`report`] collects classifications and renders the final output
//!
//! The checks themselves are in [`checks`], one module per metric family,
//! and talk to the device only through the [`snmp::Agent`] trait.

pub mod checks;
pub mod classify;
pub mod error;
pub mod expiry;
pub mod mib;
pub mod report;
pub mod select;
pub mod snmp;
pub mod status;
pub mod threshold;
pub mod usage;

pub use crate::error::CheckError;
pub use crate::report::Report;
pub use crate::status::Status;
