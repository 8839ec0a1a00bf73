//! What the appliance is and how long it has been up
//!
//! Purely informational: once the device has answered this is always OK.

use crate::error::CheckError;
use crate::mib::{self, DeviceField};
use crate::report::{PerfData, Report, Uom};
use crate::snmp::{Agent, Oid};
use crate::status::Status;

pub const NAME: &str = "SFOS-INFO";

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    /// In `DeviceField::ALL` order
    pub fields: Vec<(DeviceField, String)>,
    /// Hundredths of a second
    pub uptime_ticks: i64,
}

impl DeviceInfo {
    pub fn field(&self, wanted: DeviceField) -> &str {
        self.fields
            .iter()
            .find(|&&(field, _)| field == wanted)
            .map_or("", |&(_, ref value)| value.as_str())
    }

    pub fn uptime_seconds(&self) -> i64 {
        self.uptime_ticks / 100
    }
}

pub fn run<A: Agent>(agent: &mut A) -> Result<Report, CheckError> {
    let mut oids: Vec<Oid> = DeviceField::ALL.iter().map(|f| f.oid()).collect();
    oids.push(mib::uptime());
    let values = agent.get(&oids)?;
    let mut fields = Vec::with_capacity(DeviceField::ALL.len());
    for &field in DeviceField::ALL {
        fields.push((field, values.text(&field.oid())?));
    }
    let info = DeviceInfo {
        fields,
        uptime_ticks: values.integer(&mib::uptime())?,
    };
    Ok(evaluate(&info))
}

pub fn evaluate(info: &DeviceInfo) -> Report {
    let seconds = info.uptime_seconds();
    let summary = format!(
        "{} '{}' running {}, up {} days",
        info.field(DeviceField::Model),
        info.field(DeviceField::Name),
        info.field(DeviceField::Firmware),
        seconds / 86_400
    );
    let mut detail: Vec<String> = info
        .fields
        .iter()
        .map(|&(field, ref value)| format!("{}: {}", field, value))
        .collect();
    detail.push(format!("uptime: {}s", seconds));

    let mut report = Report::new();
    report.add(Status::Ok, summary, detail);
    report.add_perfdata(PerfData::new("uptime", seconds as f64, Uom::None));
    report
}
