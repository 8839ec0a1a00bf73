//! One module per metric family
//!
//! Every check follows the same shape:
//!
//! * `Options` is what the operator typed, derived with structopt so the
//!   binaries can flatten it into their arguments
//! * `Config::from_options` validates all of it (thresholds, item and state
//!   names, patterns) without touching the network
//! * `run` builds the config, does exactly one SNMP request and hands the
//!   answer to `evaluate`
//! * `evaluate` is pure and builds the [`Report`](crate::report::Report)

use std::ffi::OsString;

use log::warn;
use structopt::clap::ErrorKind;
use structopt::StructOpt;

use crate::classify::{Reported, StatePolicy};
use crate::select::{parse_names, UnknownName};
use crate::status::Status;

pub mod disk;
pub mod ha;
pub mod info;
pub mod license;
pub mod memory;
pub mod service;
pub mod vpn;

/// Build a state policy from `--status-ok` and `--status-warning`
///
/// Empty lists fall back to the check's defaults.
pub(crate) fn state_policy<S>(
    ok: &[String],
    warning: &[String],
    default_ok: &[S],
    default_warning: &[S],
) -> Result<StatePolicy<S>, UnknownName>
where
    S: std::str::FromStr<Err = UnknownName> + PartialEq + Copy,
{
    let ok = if ok.is_empty() {
        default_ok.to_vec()
    } else {
        parse_names(ok)?
    };
    let warning = if warning.is_empty() {
        default_warning.to_vec()
    } else {
        parse_names(warning)?
    };
    Ok(StatePolicy::new(ok, warning))
}

/// Note state codes the device tables don't know about
pub(crate) fn note_unrecognized<S>(item: &str, state: &Reported<S>) {
    if let Reported::Unrecognized(code) = *state {
        warn!("{} reported unrecognized state code {}", item, code);
    }
}

/// Parse the command line, exiting `UNKNOWN` on bad arguments
///
/// clap would exit 1 on its own, which monitoring systems read as a warning.
pub fn parse_args<T: StructOpt>(name: &str) -> T {
    parse_args_from(name, std::env::args_os())
}

pub fn parse_args_from<T, I>(name: &str, argv: I) -> T
where
    T: StructOpt,
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    match T::from_iter_safe(argv) {
        Ok(args) => args,
        Err(e) => match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                let first = e.message.lines().next().unwrap_or("invalid arguments");
                println!("{} UNKNOWN - {}", name, first.trim_start_matches("error: "));
                Status::Unknown.exit()
            }
        },
    }
}
