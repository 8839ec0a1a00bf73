//! IPsec site-to-site tunnels
//!
//! Tunnels are named by whoever configured the firewall, so unlike the other
//! families they are picked with regular expressions over their names.
//!
//! There are two ways to judge them:
//!
//! * `all`: every selected tunnel should be up
//! * `ha`: the selected tunnels are redundant paths to the same peer, and
//!   exactly one of them should be up at a time

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use log::debug;
use regex::Regex;
use structopt::StructOpt;

use crate::checks::note_unrecognized;
use crate::classify::{Classification, Reported};
use crate::error::CheckError;
use crate::mib::{self, TunnelStatus, TUNNEL_ACTIVATED, TUNNEL_NAME, TUNNEL_STATUS};
use crate::report::{PerfData, Report, Uom};
use crate::snmp::{Agent, FetchError, Oid, Values};
use crate::status::Status;

pub const NAME: &str = "SFOS-VPN";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VpnMode {
    All,
    Ha,
}

impl FromStr for VpnMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<VpnMode, String> {
        match raw {
            "all" => Ok(VpnMode::All),
            "ha" => Ok(VpnMode::Ha),
            _ => Err(format!("unknown vpn mode '{}', expected all or ha", raw)),
        }
    }
}

impl fmt::Display for VpnMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            VpnMode::All => write!(f, "all"),
            VpnMode::Ha => write!(f, "ha"),
        }
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(long = "pattern", help = "Only check tunnels whose name matches this regex")]
    pub pattern: Option<String>,
    #[structopt(
        long = "exclude-pattern",
        help = "Skip tunnels whose name matches this regex"
    )]
    pub exclude_pattern: Option<String>,
    #[structopt(
        long = "mode",
        default_value = "all",
        raw(possible_values = r#"&["all", "ha"]"#),
        help = "all: every tunnel should be up; ha: exactly one should be"
    )]
    pub mode: VpnMode,
    #[structopt(long = "inactive-ok", help = "Inactive tunnels are fine (all mode)")]
    pub inactive_ok: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
    pub mode: VpnMode,
    pub inactive_ok: bool,
}

fn maybe_regex(pattern: &Option<String>) -> Result<Option<Regex>, regex::Error> {
    match *pattern {
        Some(ref p) => Regex::new(p).map(Some),
        None => Ok(None),
    }
}

impl Config {
    pub fn from_options(opts: &Options) -> Result<Config, CheckError> {
        let config = Config {
            include: maybe_regex(&opts.pattern)?,
            exclude: maybe_regex(&opts.exclude_pattern)?,
            mode: opts.mode,
            inactive_ok: opts.inactive_ok,
        };
        debug!("vpn config: {:?}", config);
        Ok(config)
    }

    fn selects(&self, name: &str) -> bool {
        self.include.as_ref().map_or(true, |re| re.is_match(name))
            && !self.exclude.as_ref().map_or(false, |re| re.is_match(name))
    }
}

/// One row of the tunnel table
#[derive(Clone, Debug, PartialEq)]
pub struct Tunnel {
    pub index: u32,
    pub name: String,
    pub status: Reported<TunnelStatus>,
    pub activated: bool,
}

impl Tunnel {
    fn is_up(&self) -> bool {
        match self.status {
            Reported::Known(TunnelStatus::Active)
            | Reported::Known(TunnelStatus::PartiallyActive) => true,
            _ => false,
        }
    }

    fn describe(&self) -> String {
        if self.activated {
            format!("{} is {}", self.name, self.status)
        } else {
            format!("{} is {} (not activated)", self.name, self.status)
        }
    }
}

fn column(table: &Oid, column: u32, index: u32) -> Oid {
    Oid::new(format!("{}.{}.{}", table, column, index))
}

/// Rebuild table rows from a walk, ordered by row index
///
/// Every row has to have a name, a status and an activation flag; a row
/// with any of them missing means the walk was cut short.
pub fn tunnels_from_walk(values: &Values) -> Result<Vec<Tunnel>, FetchError> {
    let table = mib::tunnel_table();
    let mut indexes = BTreeSet::new();
    for (oid, _) in values.iter() {
        if let Some(suffix) = oid.index_under(&table) {
            if suffix.len() == 2 && suffix[0] == TUNNEL_NAME {
                indexes.insert(suffix[1]);
            }
        }
    }
    let mut tunnels = Vec::with_capacity(indexes.len());
    for index in indexes {
        tunnels.push(Tunnel {
            index,
            name: values.text(&column(&table, TUNNEL_NAME, index))?,
            status: TunnelStatus::from_code(
                values.integer(&column(&table, TUNNEL_STATUS, index))?,
            ),
            activated: values.integer(&column(&table, TUNNEL_ACTIVATED, index))? != 0,
        });
    }
    Ok(tunnels)
}

pub fn run<A: Agent>(opts: &Options, agent: &mut A) -> Result<Report, CheckError> {
    let config = Config::from_options(opts)?;
    let values = agent.walk(&mib::tunnel_table())?;
    let tunnels = tunnels_from_walk(&values)?;
    debug!("device reported {} tunnels", tunnels.len());
    Ok(evaluate(&config, &tunnels))
}

pub fn evaluate(config: &Config, tunnels: &[Tunnel]) -> Report {
    let mut report = Report::new();
    let mut selected: Vec<&Tunnel> = tunnels.iter().filter(|t| config.selects(&t.name)).collect();
    selected.sort_by(|a, b| a.name.cmp(&b.name));
    if selected.is_empty() {
        report.add(Status::Unknown, "no VPN tunnels matched", vec![]);
        return report;
    }
    for tunnel in &selected {
        note_unrecognized(&tunnel.name, &tunnel.status);
    }

    match config.mode {
        VpnMode::All => all_up(config, &selected, &mut report),
        VpnMode::Ha => one_up(&selected, &mut report),
    }

    let up = selected.iter().filter(|t| t.is_up()).count();
    report.add_perfdata(
        PerfData::new("tunnels_up", up as f64, Uom::None).range(0.0, selected.len() as f64),
    );
    report
}

fn all_up(config: &Config, tunnels: &[&Tunnel], report: &mut Report) {
    for tunnel in tunnels {
        let status = match tunnel.status {
            Reported::Known(TunnelStatus::Active) => Status::Ok,
            Reported::Known(TunnelStatus::PartiallyActive) => Status::Warning,
            Reported::Known(TunnelStatus::Inactive) if config.inactive_ok => Status::Ok,
            _ => Status::Critical,
        };
        report.add_item(Classification::new(status, tunnel.describe()));
    }
    report.add(
        Status::Ok,
        format!("all {} tunnels are ok", tunnels.len()),
        vec![],
    );
}

fn one_up(tunnels: &[&Tunnel], report: &mut Report) {
    let up: Vec<&&Tunnel> = tunnels.iter().filter(|t| t.is_up()).collect();
    let (status, summary) = match up.len() {
        0 => (
            Status::Critical,
            format!("none of {} tunnels is up", tunnels.len()),
        ),
        1 => {
            let status = match up[0].status {
                Reported::Known(TunnelStatus::PartiallyActive) => Status::Warning,
                _ => Status::Ok,
            };
            (status, up[0].describe())
        }
        n => (
            Status::Unknown,
            format!(
                "{} tunnels are up at once: {}",
                n,
                up.iter().map(|t| t.name.as_str()).join(", ")
            ),
        ),
    };
    let detail = tunnels
        .iter()
        .map(|t| format!("{} {}", if t.is_up() { "up:" } else { "down:" }, t.describe()))
        .collect();
    report.add(status, summary, detail);
}
