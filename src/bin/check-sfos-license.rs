//! Check the subscription licenses of a Sophos XG firewall
//!
//! Both the state of each module and the days until it expires are checked.

use structopt::StructOpt;

use sfos_plugins::checks::{self, license};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Check the subscription licenses of a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-license (part of sfos-plugins)",
    after_help = "Modules: base-firewall network-protection web-protection mail-protection \
                  webserver-protection sandstorm enhanced-support enhanced-plus-support",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(flatten)]
    check: license::Options,
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
    let args: Args = checks::parse_args(license::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| license::run(&args.check, &mut agent));
    finish(license::NAME, args.verbose, result)
}
