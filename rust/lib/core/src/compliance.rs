//! Safety thresholds.
//!
//! The limits are a fixed policy, not configuration.

use crate::record::EquipmentRecord;

/// A temperature strictly above this is a violation.
pub const TEMPERATURE_LIMIT: f64 = 80.0;

/// A pressure strictly above this is a violation.
pub const PRESSURE_LIMIT: f64 = 150.0;

/// Message shown to the user when the record list is in violation.
pub const ALERT_MESSAGE: &str = "Safety threshold crossed!";

/// Which limit(s) a record exceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breach {
    Temperature,
    Pressure,
    Both,
}

impl Breach {
    pub fn describe(&self) -> &'static str {
        match self {
            Breach::Temperature => "temperature",
            Breach::Pressure => "pressure",
            Breach::Both => "temperature+pressure",
        }
    }
}

/// Classify a single record. `NaN` readings never breach.
pub fn breach(record: &EquipmentRecord) -> Option<Breach> {
    let hot = record.temperature > TEMPERATURE_LIMIT;
    let high = record.pressure > PRESSURE_LIMIT;
    match (hot, high) {
        (true, true) => Some(Breach::Both),
        (true, false) => Some(Breach::Temperature),
        (false, true) => Some(Breach::Pressure),
        (false, false) => None,
    }
}

pub fn is_violation(record: &EquipmentRecord) -> bool {
    breach(record).is_some()
}

/// True iff at least one record breaches a limit. False for an empty list.
pub fn has_violation(records: &[EquipmentRecord]) -> bool {
    records.iter().any(is_violation)
}

/// Every breaching record with its position in `records`.
pub fn violations(records: &[EquipmentRecord]) -> Vec<(usize, &EquipmentRecord, Breach)> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| breach(r).map(|b| (i, r, b)))
        .collect()
}
