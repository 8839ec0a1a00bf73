//! Memory and swap usage of the appliance

use log::debug;
use structopt::StructOpt;

use crate::error::CheckError;
use crate::mib::{MEMORY, SWAP};
use crate::report::Report;
use crate::snmp::Agent;
use crate::status::Status;
use crate::threshold::{UsageMode, UsageThresholds};
use crate::usage::{check_usage, CapacityReading};

pub const NAME: &str = "SFOS-MEMORY";

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(
        short = "w",
        long = "warning",
        help = "Memory MB or percent to warn at [default: 80% used, 20% free]"
    )]
    pub warning: Option<String>,
    #[structopt(
        short = "c",
        long = "critical",
        help = "Memory MB or percent to go critical at [default: 90% used, 10% free]"
    )]
    pub critical: Option<String>,
    #[structopt(
        short = "W",
        long = "swap-warning",
        help = "Swap MB or percent to warn at [default: 80% used, 20% free]"
    )]
    pub swap_warning: Option<String>,
    #[structopt(
        short = "S",
        long = "swap-critical",
        help = "Swap MB or percent to go critical at [default: 90% used, 10% free]"
    )]
    pub swap_critical: Option<String>,
    #[structopt(long = "free", help = "Thresholds describe free space instead of used space")]
    pub free: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub memory: UsageThresholds,
    pub swap: UsageThresholds,
}

fn as_str(opt: &Option<String>) -> Option<&str> {
    opt.as_ref().map(String::as_str)
}

impl Config {
    pub fn from_options(opts: &Options) -> Result<Config, CheckError> {
        let mode = UsageMode::from_free_flag(opts.free);
        let config = Config {
            memory: UsageThresholds::parse(as_str(&opts.warning), as_str(&opts.critical), mode)?,
            swap: UsageThresholds::parse(
                as_str(&opts.swap_warning),
                as_str(&opts.swap_critical),
                mode,
            )?,
        };
        debug!("memory config: {:?}", config);
        Ok(config)
    }
}

pub fn run<A: Agent>(opts: &Options, agent: &mut A) -> Result<Report, CheckError> {
    let config = Config::from_options(opts)?;
    let mut oids = CapacityReading::oids(&MEMORY);
    oids.extend(CapacityReading::oids(&SWAP));
    let values = agent.get(&oids)?;
    let memory = CapacityReading::from_values(&MEMORY, &values)?;
    let swap = CapacityReading::from_values(&SWAP, &values)?;
    Ok(evaluate(&config, &memory, &swap))
}

/// Appliances without swap report a capacity of 0; that's not a problem.
pub fn evaluate(config: &Config, memory: &CapacityReading, swap: &CapacityReading) -> Report {
    let mut report = Report::new();
    check_usage(memory, &config.memory, &mut report);
    if swap.capacity > 0.0 {
        check_usage(swap, &config.swap, &mut report);
    } else {
        report.add(Status::Ok, "no swap configured", vec!["swap: not configured".to_owned()]);
    }
    report
}
