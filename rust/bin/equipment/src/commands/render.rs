//! Text rendering for records, breaches and the chart.

use std::fmt::Write;

use equipment_core::chart::{CHART_TITLE, EMPTY_MESSAGE};
use equipment_core::{breach, format_label, ChartSeries, EquipmentRecord};

/// Bar width for the largest value on the chart.
const BAR_WIDTH: usize = 40;

pub fn records_table(records: &[EquipmentRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:8} {:>12} {:>10} {:26} {}",
        "ID", "TEMPERATURE", "PRESSURE", "TIMESTAMP", "STATUS"
    );
    for r in records {
        let id = r.id.as_ref().map(|id| id.as_str()).unwrap_or("-");
        let status = breach(r).map(|b| b.describe()).unwrap_or("ok");
        let _ = writeln!(
            out,
            "{:8} {:>12} {:>10} {:26} {}",
            id,
            r.temperature,
            r.pressure,
            format_label(&r.timestamp),
            status
        );
    }
    out
}

/// Horizontal bars, one group per label, scaled to the largest value.
pub fn chart(series: &ChartSeries) -> String {
    let mut out = format!("{}\n", CHART_TITLE);
    if series.is_empty() {
        let _ = writeln!(out, "  {}", EMPTY_MESSAGE);
        return out;
    }

    let max = series.max_value();
    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let name_width = series
        .datasets()
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(0);

    for (i, label) in series.labels.iter().enumerate() {
        for (n, dataset) in series.datasets().iter().enumerate() {
            let value = dataset.values[i];
            let shown = if n == 0 { label.as_str() } else { "" };
            let _ = writeln!(
                out,
                "{:lw$}  {:nw$} |{} {}",
                shown,
                dataset.name,
                bar(value, max),
                value,
                lw = label_width,
                nw = name_width,
            );
        }
    }
    out
}

fn bar(value: f64, max: f64) -> String {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.clamp(1, BAR_WIDTH))
}
