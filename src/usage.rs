//! The pipeline shared by every capacity metric (disk, memory, swap)
//!
//! The device reports a total capacity in MB and the percent of it in use.
//! Operator thresholds are converted against that capacity, the used or free
//! percentage is classified, and the result lands in the report together
//! with its performance data.

use crate::classify::{Direction, Levels};
use crate::mib::CapacityMetric;
use crate::report::{PerfData, Report, Uom};
use crate::snmp::{FetchError, Oid, Values};
use crate::status::Status;
use crate::threshold::{UsageMode, UsageThresholds};

/// One capacity metric as the device reported it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapacityReading {
    pub label: &'static str,
    /// Total size in MB
    pub capacity: f64,
    pub percent_used: f64,
}

impl CapacityReading {
    pub fn oids(metric: &CapacityMetric) -> Vec<Oid> {
        vec![metric.capacity_oid(), metric.percent_oid()]
    }

    pub fn from_values(
        metric: &CapacityMetric,
        values: &Values,
    ) -> Result<CapacityReading, FetchError> {
        Ok(CapacityReading {
            label: metric.label,
            capacity: values.integer(&metric.capacity_oid())? as f64,
            percent_used: values.integer(&metric.percent_oid())? as f64,
        })
    }

    /// The percentage the thresholds are compared against
    pub fn observed_percent(&self, mode: UsageMode) -> f64 {
        match mode {
            UsageMode::Used => self.percent_used,
            UsageMode::Free => 100.0 - self.percent_used,
        }
    }
}

/// Classify one reading and add it to the report
///
/// A reading with no capacity can't be judged against percentages, so it is
/// reported unknown on its own without affecting any other reading.
pub fn check_usage(reading: &CapacityReading, thresholds: &UsageThresholds, report: &mut Report) {
    let mode = thresholds.mode;
    let converted = thresholds
        .warning
        .convert(reading.capacity, reading.label)
        .and_then(|w| {
            thresholds
                .critical
                .convert(reading.capacity, reading.label)
                .map(|c| (w, c))
        });
    let (warning, critical) = match converted {
        Ok(pair) => pair,
        Err(e) => {
            report.add(Status::Unknown, e.to_string(), vec![e.to_string()]);
            return;
        }
    };

    let direction = match mode {
        UsageMode::Used => Direction::Above,
        UsageMode::Free => Direction::Below,
    };
    let observed = reading.observed_percent(mode);
    let status = Levels::new(warning.percent, critical.percent, direction).evaluate(observed);
    let amount = reading.capacity * observed / 100.0;

    let summary = format!(
        "{} {} {:.0}% of {:.0}MB",
        reading.label,
        mode.as_str(),
        observed,
        reading.capacity
    );
    let at = match direction {
        Direction::Above => "at",
        Direction::Below => "below",
    };
    let detail = vec![
        format!(
            "{}: {:.0}MB {} of {:.0}MB ({:.0}%)",
            reading.label,
            amount,
            mode.as_str(),
            reading.capacity,
            observed
        ),
        format!(
            "{}: warning {} {:.0}% ({:.0}MB), critical {} {:.0}% ({:.0}MB)",
            reading.label,
            at,
            warning.percent,
            warning.absolute,
            at,
            critical.percent,
            critical.absolute
        ),
    ];
    report.add(status, summary, detail);

    let label = format!("{}_{}", reading.label, mode.as_str());
    report.add_perfdata(
        PerfData::new(label.clone(), amount, Uom::Megabytes)
            .levels(warning.absolute, critical.absolute)
            .range(0.0, reading.capacity),
    );
    report.add_perfdata(
        PerfData::new(format!("{}_pct", label), observed, Uom::Percent)
            .levels(warning.percent, critical.percent)
            .range(0.0, 100.0),
    );
}
