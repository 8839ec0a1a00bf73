//! Check memory and swap usage of a Sophos XG firewall
//!
//! Memory and swap have separate thresholds; `--free` applies to both.

use structopt::StructOpt;

use sfos_plugins::checks::{self, memory};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Check memory and swap usage of a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-memory (part of sfos-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(flatten)]
    check: memory::Options,
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
    let args: Args = checks::parse_args(memory::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| memory::run(&args.check, &mut agent));
    finish(memory::NAME, args.verbose, result)
}
