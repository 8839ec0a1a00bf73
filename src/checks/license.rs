//! Subscription modules and how long they have left

use chrono::{Local, NaiveDate};
use log::debug;
use structopt::StructOpt;

use crate::checks::{note_unrecognized, state_policy};
use crate::classify::{Reported, StatePolicy};
use crate::error::CheckError;
use crate::expiry::{days_left, parse_expiry, DayLevels, ExpiryState};
use crate::mib::{LicenseName, LicenseState};
use crate::report::{PerfData, Report, Uom};
use crate::select::Selection;
use crate::snmp::{Agent, Oid};
use crate::status::Status;

pub const NAME: &str = "SFOS-LICENSE";

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(
        long = "include",
        raw(use_delimiter = "true"),
        help = "Only check these modules [default: all of them]"
    )]
    pub include: Vec<String>,
    #[structopt(long = "exclude", raw(use_delimiter = "true"), help = "Skip these modules")]
    pub exclude: Vec<String>,
    #[structopt(
        long = "status-ok",
        raw(use_delimiter = "true"),
        help = "License states that are fine [default: subscribed]"
    )]
    pub status_ok: Vec<String>,
    #[structopt(
        long = "status-warning",
        raw(use_delimiter = "true"),
        help = "License states that only warrant a warning [default: evaluating]"
    )]
    pub status_warning: Vec<String>,
    #[structopt(
        long = "no-default-status-warning",
        help = "Start from an empty warning list, so evaluating licenses are critical \
                unless --status-ok or --status-warning name them"
    )]
    pub no_default_status_warning: bool,
    #[structopt(
        long = "unsubscribed-ok",
        help = "Modules that were never bought (none, not-subscribed) are fine"
    )]
    pub unsubscribed_ok: bool,
    #[structopt(
        long = "warning-days",
        default_value = "30",
        help = "Warn when a module expires in fewer days than this"
    )]
    pub warning_days: i64,
    #[structopt(
        long = "critical-days",
        default_value = "15",
        help = "Go critical when a module expires in fewer days than this"
    )]
    pub critical_days: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Sorted by name
    pub modules: Vec<LicenseName>,
    pub policy: StatePolicy<LicenseState>,
    pub unsubscribed_ok: bool,
    pub days: DayLevels,
}

impl Config {
    pub fn from_options(opts: &Options) -> Result<Config, CheckError> {
        let selection: Selection<LicenseName> = Selection::parse(&opts.include, &opts.exclude)?;
        let modules = selection.apply(LicenseName::ALL);
        if modules.is_empty() {
            return Err(CheckError::Options(
                "no license modules left to check after --include/--exclude".to_owned(),
            ));
        }
        let default_warning: &[LicenseState] = if opts.no_default_status_warning {
            &[]
        } else {
            &[LicenseState::Evaluating]
        };
        let policy = state_policy(
            &opts.status_ok,
            &opts.status_warning,
            &[LicenseState::Subscribed],
            default_warning,
        )?;
        let days = DayLevels {
            warning: opts.warning_days,
            critical: opts.critical_days,
        };
        debug!("checking licenses {:?} with {:?}, {:?}", modules, policy, days);
        Ok(Config {
            modules,
            policy,
            unsubscribed_ok: opts.unsubscribed_ok,
            days,
        })
    }
}

/// One module's state and the expiry date exactly as the device sent it
#[derive(Clone, Debug, PartialEq)]
pub struct LicenseReading {
    pub module: LicenseName,
    pub state: Reported<LicenseState>,
    pub expiry: String,
}

pub fn run<A: Agent>(opts: &Options, agent: &mut A) -> Result<Report, CheckError> {
    let config = Config::from_options(opts)?;
    let oids: Vec<Oid> = config
        .modules
        .iter()
        .flat_map(|m| vec![m.status_oid(), m.expiry_oid()])
        .collect();
    let values = agent.get(&oids)?;
    let mut readings = Vec::with_capacity(config.modules.len());
    for &module in &config.modules {
        readings.push(LicenseReading {
            module,
            state: LicenseState::from_code(values.integer(&module.status_oid())?),
            expiry: values.text(&module.expiry_oid())?,
        });
    }
    Ok(evaluate(&config, &readings, Local::now().date_naive()))
}

fn is_unsubscribed(state: &Reported<LicenseState>) -> bool {
    match *state {
        Reported::Known(LicenseState::NoLicense) | Reported::Known(LicenseState::NotSubscribed) => {
            true
        }
        _ => false,
    }
}

fn has_expiry(state: &Reported<LicenseState>) -> bool {
    match *state {
        Reported::Known(LicenseState::Subscribed) | Reported::Known(LicenseState::Evaluating) => {
            true
        }
        _ => false,
    }
}

fn only_problem(status: Status, message: &str) -> String {
    if status == Status::Ok {
        String::new()
    } else {
        message.to_owned()
    }
}

pub fn evaluate(config: &Config, readings: &[LicenseReading], today: NaiveDate) -> Report {
    let mut report = Report::new();
    for reading in readings {
        let module = reading.module;
        note_unrecognized(module.label(), &reading.state);

        let state_message = format!("{} is {}", module, reading.state);
        if config.unsubscribed_ok && is_unsubscribed(&reading.state) {
            report.add(Status::Ok, "", vec![format!("OK: {}", state_message)]);
            continue;
        }
        let status = config.policy.evaluate(&reading.state);
        let mut detail = vec![format!("{}: {}", status, state_message)];
        report.add(status, only_problem(status, &state_message), vec![]);

        if has_expiry(&reading.state) {
            match parse_expiry(&reading.expiry) {
                ExpiryState::Valid(date) => {
                    let left = days_left(today, date);
                    let status = config.days.evaluate(left);
                    let message = if left < 0 {
                        format!("{} expired {} days ago ({})", module, -left, date)
                    } else {
                        format!("{} expires in {} days ({})", module, left, date)
                    };
                    detail.push(format!("{}: {}", status, message));
                    report.add(status, only_problem(status, &message), vec![]);
                    report.add_perfdata(
                        PerfData::new(format!("{}_days_left", module), left as f64, Uom::None)
                            .levels(config.days.warning as f64, config.days.critical as f64),
                    );
                }
                ExpiryState::Unparseable => {
                    let message =
                        format!("{} has an unparseable expiry date '{}'", module, reading.expiry);
                    detail.push(format!("{}: {}", Status::Unknown, message));
                    report.add(Status::Unknown, message, vec![]);
                }
            }
        }
        report.add(Status::Ok, "", detail);
    }
    report.add(
        Status::Ok,
        format!("all {} licenses are ok", readings.len()),
        vec![],
    );
    report
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::snmp::testing::FakeAgent;

    fn options(argv: &[&str]) -> Options {
        let mut full = vec!["check-sfos-license"];
        full.extend_from_slice(argv);
        Options::from_iter(full.into_iter())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn reading(module: LicenseName, code: i64, expiry: &str) -> LicenseReading {
        LicenseReading {
            module,
            state: LicenseState::from_code(code),
            expiry: expiry.to_owned(),
        }
    }

    fn config(argv: &[&str]) -> Config {
        Config::from_options(&options(argv)).unwrap()
    }

    #[test]
    fn usage_is_valid() {
        let opts = options(&[]);
        assert_eq!(opts.warning_days, 30);
        assert_eq!(opts.critical_days, 15);
        assert!(!opts.unsubscribed_ok);
        let config = Config::from_options(&opts).unwrap();
        assert_eq!(config.modules.len(), LicenseName::ALL.len());
        assert_eq!(config.modules[0], LicenseName::BaseFirewall);
        assert_eq!(config.policy.warning, vec![LicenseState::Evaluating]);

        let opts = options(&["--warning-days", "60", "--critical-days", "7", "--unsubscribed-ok"]);
        assert_eq!(opts.warning_days, 60);
        assert_eq!(opts.critical_days, 7);
        assert!(opts.unsubscribed_ok);
    }

    #[test]
    fn days_left_against_bounds() {
        let config = config(&[]);
        let soon = [reading(LicenseName::Sandstorm, 3, "Jan 15 2024")];
        let report = evaluate(&config, &soon, today());
        assert_eq!(report.status(), Status::Critical);
        assert_eq!(
            report.render(NAME, false),
            "SFOS-LICENSE CRITICAL - sandstorm expires in 14 days (2024-01-15)\n\
             | 'sandstorm_days_left'=14;30;15;;"
        );

        let later = [reading(LicenseName::Sandstorm, 3, "Jan 20 2024")];
        assert_eq!(evaluate(&config, &later, today()).status(), Status::Warning);

        let fine = [reading(LicenseName::Sandstorm, 3, "Dec 31 2024")];
        let report = evaluate(&config, &fine, today());
        assert_eq!(
            report.render(NAME, false).lines().next(),
            Some("SFOS-LICENSE OK - all 1 licenses are ok")
        );
    }

    #[test]
    fn expired_dates_count_down_past_zero() {
        let config = config(&[]);
        let gone = [reading(LicenseName::WebProtection, 3, "Dec 25 2023")];
        let report = evaluate(&config, &gone, today());
        assert_eq!(report.status(), Status::Critical);
        assert_eq!(report.summary(), "web-protection expired 7 days ago (2023-12-25)");
    }

    #[test]
    fn unparseable_dates_only_affect_their_module() {
        let config = config(&[]);
        let readings = [
            reading(LicenseName::BaseFirewall, 3, "Dec 31 2024"),
            reading(LicenseName::Sandstorm, 3, "someday"),
            reading(LicenseName::WebProtection, 3, "Jan 20 2024"),
        ];
        let report = evaluate(&config, &readings, today());
        assert_eq!(report.status(), Status::Unknown);
        assert_eq!(
            report.summary(),
            "web-protection expires in 19 days (2024-01-20), \
             sandstorm has an unparseable expiry date 'someday'"
        );
        let rendered = report.render(NAME, true);
        assert!(rendered.contains("'base-firewall_days_left'=365;30;15;;"));
        assert!(rendered.contains("'web-protection_days_left'=19;30;15;;"));
        assert!(!rendered.contains("sandstorm_days_left"));
    }

    #[test]
    fn states_are_classified() {
        let config = config(&[]);
        let readings = [
            reading(LicenseName::BaseFirewall, 1, "Dec 31 2024"),
            reading(LicenseName::MailProtection, 4, "Dec 1 2023"),
            reading(LicenseName::Sandstorm, 2, ""),
        ];
        let report = evaluate(&config, &readings, today());
        assert_eq!(report.status(), Status::Critical);
        assert_eq!(
            report.summary(),
            "base-firewall is evaluating, mail-protection is expired, sandstorm is not-subscribed"
        );
    }

    #[test]
    fn evaluating_can_be_made_critical() {
        let readings = [reading(LicenseName::BaseFirewall, 1, "Dec 31 2024")];

        let report = evaluate(&config(&[]), &readings, today());
        assert_eq!(report.status(), Status::Warning);

        let config = config(&["--no-default-status-warning"]);
        assert!(config.policy.warning.is_empty());
        let report = evaluate(&config, &readings, today());
        assert_eq!(report.status(), Status::Critical);
        assert_eq!(report.summary(), "base-firewall is evaluating");

        let config = Config::from_options(&options(&[
            "--no-default-status-warning",
            "--status-warning",
            "expired",
        ]))
        .unwrap();
        assert_eq!(config.policy.warning, vec![LicenseState::Expired]);
    }

    #[test]
    fn unsubscribed_modules_can_be_ignored() {
        let config = config(&["--unsubscribed-ok"]);
        let readings = [
            reading(LicenseName::Sandstorm, 2, ""),
            reading(LicenseName::EnhancedSupport, 0, "garbage"),
        ];
        let report = evaluate(&config, &readings, today());
        assert_eq!(report.status(), Status::Ok);
        assert_eq!(
            report.render(NAME, true),
            "SFOS-LICENSE OK - all 2 licenses are ok\n\
             OK: sandstorm is not-subscribed\n\
             \n\
             OK: enhanced-support is none"
        );
    }

    #[test]
    fn fetches_state_and_expiry_in_one_request() {
        let mut agent = FakeAgent::new()
            .int(LicenseName::Sandstorm.status_oid(), 3)
            .text(LicenseName::Sandstorm.expiry_oid(), "Dec 31 2999");
        let report = run(&options(&["--include", "sandstorm"]), &mut agent).unwrap();
        assert_eq!(report.status(), Status::Ok);
        assert_eq!(agent.requests, 1);
    }

    #[test]
    fn unknown_modules_fail_before_fetching() {
        let mut agent = FakeAgent::new();
        let err = run(&options(&["--exclude", "antivirus"]), &mut agent).unwrap_err();
        assert!(err.to_string().starts_with("unknown license 'antivirus'"));
        assert_eq!(agent.requests, 0);
    }
}
