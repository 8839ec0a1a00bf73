//! Check disk usage of a Sophos XG firewall
//!
//! Thresholds are in MB, or in percent with a trailing `%`. With `--free`
//! they describe the space left instead of the space used.

use structopt::StructOpt;

use sfos_plugins::checks::{self, disk};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Check disk usage of a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-disk (part of sfos-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(flatten)]
    check: disk::Options,
    #[structopt(
        short = "v",
        long = "verbose",
        help = "Print details for every item, not just the summary"
    )]
    verbose: bool,
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    env_logger::init();
    let args: Args = checks::parse_args(disk::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| disk::run(&args.check, &mut agent));
    finish(disk::NAME, args.verbose, result)
}
