//! Check IPsec tunnels on a Sophos XG firewall

use structopt::StructOpt;

use sfos_plugins::checks::{self, vpn};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Check IPsec tunnels on a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-vpn (part of sfos-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(flatten)]
    check: vpn::Options,
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
    let args: Args = checks::parse_args(vpn::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| vpn::run(&args.check, &mut agent));
    finish(vpn::NAME, args.verbose, result)
}
