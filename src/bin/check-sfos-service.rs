//! Check the services running on a Sophos XG firewall
//!
//! Every service is checked unless `--include` names some. A service in a
//! state that is neither ok nor warning is critical.

use structopt::StructOpt;

use sfos_plugins::checks::{self, service};
use sfos_plugins::report::finish;
use sfos_plugins::snmp::{NetSnmp, SnmpOptions};
use sfos_plugins::CheckError;

/// Check the services running on a Sophos XG firewall
#[derive(Debug, StructOpt)]
#[structopt(
    name = "check-sfos-service (part of sfos-plugins)",
    after_help = "Services: pop3 imap4 smtp ftp http antivirus antispam dns ha ips apache ntp \
                  tomcat sslvpn ipsec database network garner droute sshd dgd",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp")
)]
struct Args {
    #[structopt(flatten)]
    snmp: SnmpOptions,
    #[structopt(flatten)]
    check: service::Options,
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
    let args: Args = checks::parse_args(service::NAME);
    let result = NetSnmp::new(&args.snmp)
        .map_err(CheckError::Options)
        .and_then(|mut agent| service::run(&args.check, &mut agent));
    finish(service::NAME, args.verbose, result)
}

#[cfg(test)]
mod test {
    use super::*;

    fn build_args(argv: Vec<&str>) -> Args {
        Args::from_iter(argv.into_iter())
    }

    #[test]
    fn usage_is_valid() {
        let args = build_args(vec![
            "check-sfos-service",
            "-H",
            "fw.example.com",
            "--exclude",
            "pop3,imap4",
            "--status-warning",
            "stopped",
        ]);
        assert_eq!(args.snmp.host, "fw.example.com");
        assert_eq!(args.check.exclude, vec!["pop3", "imap4"]);
        assert_eq!(args.check.status_warning, vec!["stopped"]);
        assert!(!args.verbose);
    }

    #[test]
    fn host_is_required() {
        assert!(Args::from_iter_safe(vec!["check-sfos-service"]).is_err());
    }

    #[test]
    fn help_lists_the_names() {
        let mut help = Vec::new();
        Args::clap().write_long_help(&mut help).unwrap();
        let help = String::from_utf8(help).unwrap();
        assert!(help.contains("Services:"));
        assert!(help.contains("pop3"));
    }
}
