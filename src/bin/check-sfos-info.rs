//! Show what a Sophos XG firewall is, which firmware it runs and its uptime
//!
//! Always OK when the device answers, so it is mostly useful for the
//! uptime graph and for inventory.

use structopt::StructOpt;

use sfos_plugins::checks::{self, info};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Show model, firmware and uptime of a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-info (part of sfos-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(short = "v", long = "verbose", help = "Print every device field")]
    verbose: bool,
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    env_logger::init();
    let args: Args = checks::parse_args(info::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| info::run(&mut agent));
    finish(info::NAME, args.verbose, result)
}
