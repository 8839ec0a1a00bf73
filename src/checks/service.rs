//! Appliance services (mail, web, VPN daemons and friends)

use log::debug;
use structopt::StructOpt;

use crate::checks::{note_unrecognized, state_policy};
use crate::classify::{Classification, Reported, StatePolicy};
use crate::error::CheckError;
use crate::mib::{ServiceName, ServiceState};
use crate::report::{PerfData, Report, Uom};
use crate::select::Selection;
use crate::snmp::{Agent, Oid};
use crate::status::Status;

pub const NAME: &str = "SFOS-SERVICE";

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(
        long = "include",
        raw(use_delimiter = "true"),
        help = "Only check these services [default: all of them]"
    )]
    pub include: Vec<String>,
    #[structopt(long = "exclude", raw(use_delimiter = "true"), help = "Skip these services")]
    pub exclude: Vec<String>,
    #[structopt(
        long = "status-ok",
        raw(use_delimiter = "true"),
        help = "Service states that are fine [default: running,untouched]"
    )]
    pub status_ok: Vec<String>,
    #[structopt(
        long = "status-warning",
        raw(use_delimiter = "true"),
        help = "Service states that only warrant a warning"
    )]
    pub status_warning: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Sorted by name
    pub services: Vec<ServiceName>,
    pub policy: StatePolicy<ServiceState>,
}

impl Config {
    pub fn from_options(opts: &Options) -> Result<Config, CheckError> {
        let selection: Selection<ServiceName> = Selection::parse(&opts.include, &opts.exclude)?;
        let services = selection.apply(ServiceName::ALL);
        if services.is_empty() {
            return Err(CheckError::Options(
                "no services left to check after --include/--exclude".to_owned(),
            ));
        }
        let policy = state_policy(
            &opts.status_ok,
            &opts.status_warning,
            &[ServiceState::Running, ServiceState::Untouched],
            &[],
        )?;
        debug!("checking services {:?} with {:?}", services, policy);
        Ok(Config { services, policy })
    }
}

pub fn run<A: Agent>(opts: &Options, agent: &mut A) -> Result<Report, CheckError> {
    let config = Config::from_options(opts)?;
    let oids: Vec<Oid> = config.services.iter().map(|svc| svc.oid()).collect();
    let values = agent.get(&oids)?;
    let mut states = Vec::with_capacity(config.services.len());
    for &svc in &config.services {
        states.push((svc, ServiceState::from_code(values.integer(&svc.oid())?)));
    }
    Ok(evaluate(&config, &states))
}

pub fn evaluate(config: &Config, states: &[(ServiceName, Reported<ServiceState>)]) -> Report {
    let mut report = Report::new();
    let mut ok = 0;
    for &(svc, ref state) in states {
        note_unrecognized(svc.label(), state);
        let status = config.policy.evaluate(state);
        if status == Status::Ok {
            ok += 1;
        }
        report.add_item(Classification::new(status, format!("{} is {}", svc, state)));
    }
    report.add(
        Status::Ok,
        format!("all {} services are ok", states.len()),
        vec![],
    );
    report.add_perfdata(
        PerfData::new("services_ok", ok as f64, Uom::None).range(0.0, states.len() as f64),
    );
    report
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::snmp::testing::FakeAgent;

    fn options(argv: &[&str]) -> Options {
        let mut full = vec!["check-sfos-service"];
        full.extend_from_slice(argv);
        Options::from_iter(full.into_iter())
    }

    fn device(states: &[(ServiceName, i64)]) -> FakeAgent {
        states
            .iter()
            .fold(FakeAgent::new(), |agent, &(svc, code)| agent.int(svc.oid(), code))
    }

    #[test]
    fn usage_is_valid() {
        let opts = options(&["--include", "http,dns", "--include", "sshd", "--exclude", "dns"]);
        assert_eq!(opts.include, vec!["http", "dns", "sshd"]);
        assert_eq!(opts.exclude, vec!["dns"]);
        let config = Config::from_options(&opts).unwrap();
        assert_eq!(config.services, vec![ServiceName::Http, ServiceName::Sshd]);
    }

    #[test]
    fn all_running() {
        let mut agent = device(&[(ServiceName::Http, 3), (ServiceName::Dns, 0)]);
        let report = run(&options(&["--include", "http,dns"]), &mut agent).unwrap();
        assert_eq!(
            report.render(NAME, true),
            "SFOS-SERVICE OK - all 2 services are ok\n\
             OK: dns is untouched\n\
             \n\
             OK: http is running\n\
             | 'services_ok'=2;;;0;2"
        );
        assert_eq!(agent.requests, 1);
    }

    #[test]
    fn stopped_is_critical_unless_warned_about() {
        let states = [(ServiceName::Http, 3), (ServiceName::Ips, 1)];

        let mut agent = device(&states);
        let report = run(&options(&["--include", "http,ips"]), &mut agent).unwrap();
        assert_eq!(report.status(), Status::Critical);
        assert_eq!(report.summary(), "ips is stopped");

        let mut agent = device(&states);
        let report = run(
            &options(&["--include", "http,ips", "--status-warning", "stopped"]),
            &mut agent,
        )
        .unwrap();
        assert_eq!(report.status(), Status::Warning);
        assert_eq!(
            report.render(NAME, false),
            "SFOS-SERVICE WARNING - ips is stopped\n| 'services_ok'=1;;;0;2"
        );
    }

    #[test]
    fn unrecognized_codes_are_critical() {
        let mut agent = device(&[(ServiceName::Ntp, 42)]);
        let report = run(&options(&["--include", "ntp"]), &mut agent).unwrap();
        assert_eq!(report.status(), Status::Critical);
        assert_eq!(report.summary(), "ntp is unknown state code 42");
    }

    #[test]
    fn unknown_service_names_fail_before_fetching() {
        let mut agent = device(&[(ServiceName::Http, 3)]);
        let err = run(&options(&["--include", "http,gopher"]), &mut agent).unwrap_err();
        assert!(err.to_string().starts_with("unknown service 'gopher', expected one of: pop3"));
        assert_eq!(agent.requests, 0);
    }

    #[test]
    fn excluding_everything_is_an_error() {
        let mut agent = device(&[(ServiceName::Http, 3)]);
        let opts = options(&["--include", "http", "--exclude", "http"]);
        assert!(run(&opts, &mut agent).is_err());
        assert_eq!(agent.requests, 0);
    }

    #[test]
    fn incomplete_answers_are_errors() {
        let mut agent = device(&[(ServiceName::Http, 3)]);
        assert!(run(&options(&["--include", "http,dns"]), &mut agent).is_err());
    }
}
