//! High-availability cluster state

use log::debug;
use structopt::StructOpt;

use crate::checks::{note_unrecognized, state_policy};
use crate::classify::{Classification, Reported, StatePolicy};
use crate::error::CheckError;
use crate::mib::{self, HaState, HaStatus};
use crate::report::Report;
use crate::snmp::{Agent, Values};
use crate::status::Status;

pub const NAME: &str = "SFOS-HA";

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(long = "disabled-ok", help = "Don't alert when HA is not enabled at all")]
    pub disabled_ok: bool,
    #[structopt(
        long = "status-ok",
        raw(use_delimiter = "true"),
        help = "Node states that are fine [default: primary,auxiliary]\n\
                Choices: not-applicable auxiliary standalone primary faulty ready"
    )]
    pub status_ok: Vec<String>,
    #[structopt(
        long = "status-warning",
        raw(use_delimiter = "true"),
        help = "Node states that only warrant a warning"
    )]
    pub status_warning: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub disabled_ok: bool,
    pub policy: StatePolicy<HaState>,
}

impl Config {
    pub fn from_options(opts: &Options) -> Result<Config, CheckError> {
        let policy = state_policy(
            &opts.status_ok,
            &opts.status_warning,
            &[HaState::Primary, HaState::Auxiliary],
            &[],
        )?;
        debug!("ha policy: {:?}", policy);
        Ok(Config {
            disabled_ok: opts.disabled_ok,
            policy,
        })
    }
}

/// What the device says about its cluster
#[derive(Clone, Debug, PartialEq)]
pub struct HaReading {
    pub status: Reported<HaStatus>,
    pub local: Reported<HaState>,
    pub peer: Reported<HaState>,
    pub mode: String,
}

impl HaReading {
    fn from_values(values: &Values) -> Result<HaReading, CheckError> {
        Ok(HaReading {
            status: HaStatus::from_code(values.integer(&mib::ha_status())?),
            local: HaState::from_code(values.integer(&mib::ha_current_state())?),
            peer: HaState::from_code(values.integer(&mib::ha_peer_state())?),
            mode: values.text(&mib::ha_config_mode())?,
        })
    }
}

pub fn run<A: Agent>(opts: &Options, agent: &mut A) -> Result<Report, CheckError> {
    let config = Config::from_options(opts)?;
    let values = agent.get(&[
        mib::ha_status(),
        mib::ha_current_state(),
        mib::ha_peer_state(),
        mib::ha_config_mode(),
    ])?;
    let reading = HaReading::from_values(&values)?;
    Ok(evaluate(&config, &reading))
}

pub fn evaluate(config: &Config, reading: &HaReading) -> Report {
    let mut report = Report::new();
    match reading.status {
        Reported::Known(HaStatus::Disabled) => {
            let status = if config.disabled_ok {
                Status::Ok
            } else {
                Status::Critical
            };
            report.add_classification(Classification::new(status, "HA is disabled"));
        }
        Reported::Known(HaStatus::Enabled) => {
            let nodes = [("local", &reading.local), ("peer", &reading.peer)];
            let mut lines = vec![format!("HA is enabled, mode {}", reading.mode)];
            for &(node, state) in &nodes {
                note_unrecognized(node, state);
                let status = config.policy.evaluate(state);
                let message = format!("{} node is {}", node, state);
                lines.push(format!("{}: {}", status, message));
                if status != Status::Ok {
                    report.add(status, message, vec![]);
                }
            }
            report.add(
                Status::Ok,
                format!(
                    "HA {}, local node {}, peer node {}",
                    reading.mode, reading.local, reading.peer
                ),
                lines,
            );
        }
        Reported::Unrecognized(code) => {
            note_unrecognized("HA status", &reading.status);
            report.add_classification(Classification::new(
                Status::Unknown,
                format!("unknown HA status code {}", code),
            ));
        }
    }
    report
}
