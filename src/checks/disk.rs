//! Disk usage of the appliance

use log::debug;
use structopt::StructOpt;

use crate::error::CheckError;
use crate::mib::DISK;
use crate::report::Report;
use crate::snmp::Agent;
use crate::threshold::{UsageMode, UsageThresholds};
use crate::usage::{check_usage, CapacityReading};

pub const NAME: &str = "SFOS-DISK";

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(
        short = "w",
        long = "warning",
        help = "MB or percent to warn at [default: 80% used, 20% free]"
    )]
    pub warning: Option<String>,
    #[structopt(
        short = "c",
        long = "critical",
        help = "MB or percent to go critical at [default: 90% used, 10% free]"
    )]
    pub critical: Option<String>,
    #[structopt(long = "free", help = "Thresholds describe free space instead of used space")]
    pub free: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub thresholds: UsageThresholds,
}

impl Config {
    pub fn from_options(opts: &Options) -> Result<Config, CheckError> {
        let thresholds = UsageThresholds::parse(
            opts.warning.as_ref().map(String::as_str),
            opts.critical.as_ref().map(String::as_str),
            UsageMode::from_free_flag(opts.free),
        )?;
        debug!("disk thresholds: {:?}", thresholds);
        Ok(Config { thresholds })
    }
}

pub fn run<A: Agent>(opts: &Options, agent: &mut A) -> Result<Report, CheckError> {
    let config = Config::from_options(opts)?;
    let values = agent.get(&CapacityReading::oids(&DISK))?;
    let reading = CapacityReading::from_values(&DISK, &values)?;
    Ok(evaluate(&config, &reading))
}

pub fn evaluate(config: &Config, reading: &CapacityReading) -> Report {
    let mut report = Report::new();
    check_usage(reading, &config.thresholds, &mut report);
    report
}
