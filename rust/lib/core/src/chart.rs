//! Bar-chart projection of the record list.
//!
//! A direct 1:1 mapping: one label and one value per series for each record,
//! in store order. No sorting, binning or aggregation.

use std::fmt;

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::record::EquipmentRecord;
use crate::time::format_label_in;

pub const CHART_TITLE: &str = "Equipment Monitoring";
pub const TEMPERATURE_SERIES: &str = "Temperature";
pub const PRESSURE_SERIES: &str = "Pressure";

/// Shown instead of a chart when there are no records.
pub const EMPTY_MESSAGE: &str = "No data available";

/// Labels plus two index-aligned numeric series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temperatures: Vec<f64>,
    pub pressures: Vec<f64>,
}

/// One named series, borrowed from a [`ChartSeries`].
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    pub name: &'static str,
    pub values: &'a [f64],
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Temperature first, then pressure.
    pub fn datasets(&self) -> [Dataset<'_>; 2] {
        [
            Dataset { name: TEMPERATURE_SERIES, values: &self.temperatures },
            Dataset { name: PRESSURE_SERIES, values: &self.pressures },
        ]
    }

    /// Largest value across both series, or 0 when empty.
    pub fn max_value(&self) -> f64 {
        self.temperatures
            .iter()
            .chain(self.pressures.iter())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }
}

/// Project records with labels in the local time zone.
pub fn project(records: &[EquipmentRecord]) -> ChartSeries {
    project_in(records, &Local)
}

/// Project records with labels rendered in `tz`.
pub fn project_in<Tz>(records: &[EquipmentRecord], tz: &Tz) -> ChartSeries
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut series = ChartSeries {
        labels: Vec::with_capacity(records.len()),
        temperatures: Vec::with_capacity(records.len()),
        pressures: Vec::with_capacity(records.len()),
    };
    for r in records {
        series.labels.push(format_label_in(&r.timestamp, tz));
        series.temperatures.push(r.temperature);
        series.pressures.push(r.pressure);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EquipmentFields;
    use crate::time::INVALID_DATE;
    use chrono::Utc;

    fn rec(id: &str, t: f64, p: f64, ts: &str) -> EquipmentRecord {
        EquipmentRecord::stored(id, EquipmentFields::new(t, p, ts))
    }

    #[test]
    fn empty_projection() {
        let s = project_in(&[], &Utc);
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.max_value(), 0.0);
    }

    #[test]
    fn series_are_aligned_and_ordered() {
        // Deliberately out of time order: the projection must not sort.
        let records = vec![
            rec("b", 75.0, 140.0, "2024-01-15T12:00:00Z"),
            rec("a", 60.0, 110.0, "2024-01-15T08:00:00Z"),
            rec("c", 90.0, 155.0, "2024-01-15T10:00:00Z"),
        ];
        let s = project_in(&records, &Utc);

        assert_eq!(s.len(), 3);
        assert_eq!(s.temperatures.len(), 3);
        assert_eq!(s.pressures.len(), 3);
        assert_eq!(s.temperatures, vec![75.0, 60.0, 90.0]);
        assert_eq!(s.pressures, vec![140.0, 110.0, 155.0]);
        assert_eq!(
            s.labels,
            vec![
                "1/15/2024, 12:00:00 PM".to_string(),
                "1/15/2024, 8:00:00 AM".to_string(),
                "1/15/2024, 10:00:00 AM".to_string(),
            ]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let r = rec("a", 1.0, 2.0, "2024-01-15T12:00:00Z");
        let s = project_in(&[r.clone(), r], &Utc);
        assert_eq!(s.len(), 2);
        assert_eq!(s.labels[0], s.labels[1]);
    }

    #[test]
    fn bad_timestamp_still_gets_a_slot() {
        let records = vec![rec("a", 1.0, 2.0, "not a date"), rec("b", 3.0, 4.0, "2024-01-15")];
        let s = project_in(&records, &Utc);
        assert_eq!(s.labels[0], INVALID_DATE);
        assert_eq!(s.temperatures, vec![1.0, 3.0]);
    }

    #[test]
    fn projection_does_not_touch_canonical_timestamp() {
        let records = vec![rec("a", 1.0, 2.0, "2024-01-15T12:00:00Z")];
        let _ = project_in(&records, &Utc);
        assert_eq!(records[0].timestamp, "2024-01-15T12:00:00Z");
    }

    #[test]
    fn datasets_and_max() {
        let records = vec![rec("a", 70.0, 120.0, "2024-01-15"), rec("b", 95.0, 110.0, "2024-01-16")];
        let s = project_in(&records, &Utc);
        let [temp, pres] = s.datasets();
        assert_eq!(temp.name, TEMPERATURE_SERIES);
        assert_eq!(temp.values, &[70.0, 95.0]);
        assert_eq!(pres.name, PRESSURE_SERIES);
        assert_eq!(s.max_value(), 120.0);
    }
}
