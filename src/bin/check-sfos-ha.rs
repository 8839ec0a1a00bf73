//! Check the high-availability cluster of a Sophos XG firewall

use structopt::StructOpt;

use sfos_plugins::checks::{self, ha};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Check the high-availability cluster of a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-ha (part of sfos-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(flatten)]
    check: ha::Options,
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
    let args: Args = checks::parse_args(ha::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| ha::run(&args.check, &mut agent));
    finish(ha::NAME, args.verbose, result)
}
