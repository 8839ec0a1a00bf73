//! Collect classifications and render the plugin output
//!
//! The output has up to three parts:
//!
//! ```plain
//! SFOS-SERVICE CRITICAL - service ipsec is stopped
//! service apache is running
//!
//! service ipsec is stopped
//! | 'services_ok'=20;;;0;21
//! ```
//!
//! The first line is always there. The detail block is only shown in verbose
//! mode, one block per item in the order the items were added. The last
//! line carries the performance data, if there is any.

use std::cmp::max;
use std::fmt;

use itertools::Itertools;
use log::debug;

use crate::classify::Classification;
use crate::error::CheckError;
use crate::status::Status;

/// Everything a check has found out so far
///
/// The overall status only ever goes up: adding an `Ok` result after a
/// `Critical` one leaves the report `Critical`.
#[derive(Debug, Default)]
pub struct Report {
    status: Status,
    summaries: Vec<(Status, String)>,
    details: Vec<Vec<String>>,
    perfdata: Vec<PerfData>,
}

impl Report {
    pub fn new() -> Report {
        Report::default()
    }

    /// Record one result
    ///
    /// An empty `summary` contributes nothing to the first line, which is
    /// how multi-item checks keep healthy items out of it. An empty `detail`
    /// adds no block.
    pub fn add<S: Into<String>>(&mut self, status: Status, summary: S, detail: Vec<String>) {
        self.status = max(self.status, status);
        let summary = summary.into();
        if !summary.is_empty() {
            self.summaries.push((status, summary));
        }
        if !detail.is_empty() {
            self.details.push(detail);
        }
    }

    /// Record a classification, using its message for both the summary and
    /// the detail block
    pub fn add_classification(&mut self, result: Classification) {
        let detail = vec![result.message.clone()];
        self.add(result.status, result.message, detail);
    }

    /// Record one item of a multi-item check
    ///
    /// Healthy items stay out of the first line and only show up in the
    /// detail block, prefixed with their status.
    pub fn add_item(&mut self, result: Classification) {
        let summary = if result.status == Status::Ok {
            String::new()
        } else {
            result.message.clone()
        };
        let detail = vec![format!("{}: {}", result.status, result.message)];
        self.add(result.status, summary, detail);
    }

    pub fn add_perfdata(&mut self, perfdata: PerfData) {
        self.perfdata.push(perfdata);
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The text after `<NAME> <STATUS> - `
    ///
    /// If anything is wrong, this is every warning, then every critical,
    /// then every unknown summary, each group in the order it was added.
    /// Otherwise it is every ok summary.
    pub fn summary(&self) -> String {
        let problems = [Status::Warning, Status::Critical, Status::Unknown]
            .iter()
            .flat_map(|wanted| {
                self.summaries
                    .iter()
                    .filter(move |&&(status, _)| status == *wanted)
            })
            .map(|&(_, ref text)| text.as_str())
            .collect::<Vec<_>>();
        if problems.is_empty() {
            self.summaries
                .iter()
                .map(|&(_, ref text)| text.as_str())
                .join(", ")
        } else {
            problems.join(", ")
        }
    }

    pub fn render(&self, name: &str, verbose: bool) -> String {
        let summary = self.summary();
        let mut out = if summary.is_empty() {
            format!("{} {}", name, self.status)
        } else {
            format!("{} {} - {}", name, self.status, summary)
        };
        if verbose && !self.details.is_empty() {
            out.push('\n');
            out.push_str(&self.details.iter().map(|block| block.join("\n")).join("\n\n"));
        }
        if !self.perfdata.is_empty() {
            out.push_str("\n| ");
            out.push_str(&self.perfdata.iter().join(" "));
        }
        out
    }

    /// Print the report and exit with its status
    pub fn exit(self, name: &str, verbose: bool) -> ! {
        println!("{}", self.render(name, verbose));
        self.status.exit()
    }
}

/// Report the outcome of a whole check run and exit
///
/// A check that failed outright shows only its error, never a partial
/// report.
pub fn finish(name: &str, verbose: bool, result: Result<Report, CheckError>) -> ! {
    match result {
        Ok(report) => report.exit(name, verbose),
        Err(err) => {
            debug!("{} failed: {:?}", name, err);
            failure(err).exit(name, verbose)
        }
    }
}

/// The report for a run that could not get as far as classifying anything
pub fn failure(err: CheckError) -> Report {
    let mut report = Report::new();
    report.add(Status::Unknown, err.to_string(), vec![]);
    report
}

/// The unit suffix of a performance-data value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Uom {
    None,
    Percent,
    Megabytes,
}

impl fmt::Display for Uom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let suffix = match *self {
            Uom::None => "",
            Uom::Percent => "%",
            Uom::Megabytes => "MB",
        };
        write!(f, "{}", suffix)
    }
}

/// One `label=value[uom];[warn];[crit];[min];[max]` token
#[derive(Clone, Debug, PartialEq)]
pub struct PerfData {
    pub label: String,
    pub value: f64,
    pub uom: Uom,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PerfData {
    pub fn new<L: Into<String>>(label: L, value: f64, uom: Uom) -> PerfData {
        PerfData {
            label: label.into(),
            value,
            uom,
            warning: None,
            critical: None,
            min: None,
            max: None,
        }
    }

    pub fn levels(mut self, warning: f64, critical: f64) -> PerfData {
        self.warning = Some(warning);
        self.critical = Some(critical);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> PerfData {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Values are shown as whole numbers
fn number(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{:.0}", v))
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}'={}{};{};{};{};{}",
            self.label.replace('\'', "''"),
            number(Some(self.value)),
            self.uom,
            number(self.warning),
            number(self.critical),
            number(self.min),
            number(self.max)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::snmp::FetchError;
    use crate::threshold::ThresholdError;

    #[test]
    fn status_never_goes_down() {
        let mut report = Report::new();
        report.add(Status::Critical, "disk is full", vec![]);
        report.add(Status::Ok, "memory is fine", vec![]);
        report.add(Status::Warning, "swap is busy", vec![]);
        assert_eq!(report.status(), Status::Critical);
    }

    #[test]
    fn summary_orders_problems_by_status() {
        let mut report = Report::new();
        report.add(Status::Critical, "a is dead", vec![]);
        report.add(Status::Ok, "b is fine", vec![]);
        report.add(Status::Unknown, "c is unreadable", vec![]);
        report.add(Status::Warning, "d is slow", vec![]);
        report.add(Status::Critical, "e is dead", vec![]);
        assert_eq!(report.status(), Status::Unknown);
        assert_eq!(
            report.summary(),
            "d is slow, a is dead, e is dead, c is unreadable"
        );
    }

    #[test]
    fn ok_summary_when_nothing_is_wrong() {
        let mut report = Report::new();
        report.add(Status::Ok, "", vec!["a is fine".to_owned()]);
        report.add(Status::Ok, "all 1 items are ok", vec![]);
        assert_eq!(report.render("CHECK", false), "CHECK OK - all 1 items are ok");
    }

    #[test]
    fn renders_all_three_parts() {
        let mut report = Report::new();
        report.add(
            Status::Warning,
            "disk is 81% used",
            vec!["disk: 810MB of 1000MB used".to_owned(), "mode: used".to_owned()],
        );
        report.add(Status::Ok, "", vec!["swap: not configured".to_owned()]);
        report.add_perfdata(
            PerfData::new("disk_used", 810.0, Uom::Megabytes)
                .levels(800.0, 900.0)
                .range(0.0, 1000.0),
        );
        report.add_perfdata(PerfData::new("tunnels", 3.0, Uom::None));
        assert_eq!(
            report.render("SFOS-DISK", true),
            "SFOS-DISK WARNING - disk is 81% used\n\
             disk: 810MB of 1000MB used\n\
             mode: used\n\
             \n\
             swap: not configured\n\
             | 'disk_used'=810MB;800;900;0;1000 'tunnels'=3;;;;"
        );
        assert_eq!(
            report.render("SFOS-DISK", false),
            "SFOS-DISK WARNING - disk is 81% used\n\
             | 'disk_used'=810MB;800;900;0;1000 'tunnels'=3;;;;"
        );
    }

    #[test]
    fn empty_report_is_just_the_status() {
        assert_eq!(Report::new().render("SFOS-INFO", true), "SFOS-INFO OK");
    }

    #[test]
    fn classifications_fill_summary_and_detail() {
        let mut report = Report::new();
        report.add_classification(Classification::new(Status::Critical, "ha is disabled"));
        assert_eq!(
            report.render("SFOS-HA", true),
            "SFOS-HA CRITICAL - ha is disabled\nha is disabled"
        );
    }

    #[test]
    fn failures_are_unknown_with_only_the_error() {
        let err = CheckError::from(ThresholdError::Invalid("x".to_owned()));
        let report = failure(err);
        assert_eq!(report.status(), Status::Unknown);
        assert_eq!(
            report.render("SFOS-DISK", true),
            "SFOS-DISK UNKNOWN - invalid threshold 'x', expected a number like '80' or '80%'"
        );
    }

    #[test]
    fn fetch_failures_lead_with_a_fixed_message() {
        let report = failure(FetchError::Timeout.into());
        assert_eq!(
            report.render("SFOS-HA", false),
            "SFOS-HA UNKNOWN - SNMP fetch failed: SNMP request timed out"
        );
        assert_eq!(report.status().code(), 3);
    }

    #[test]
    fn perfdata_rounds_and_quotes() {
        let pd = PerfData::new("vpn 'hq'", 12.6, Uom::Percent).levels(80.0, 90.0);
        assert_eq!(pd.to_string(), "'vpn ''hq'''=13%;80;90;;");
    }
}
