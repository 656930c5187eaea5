//! Equipment telemetry domain: records, safety thresholds and the chart
//! projection. Everything here is pure; I/O lives in `equipment-client`.

pub mod chart;
pub mod compliance;
pub mod record;
pub mod time;

pub use chart::{project, project_in, ChartSeries, Dataset};
pub use compliance::{breach, has_violation, violations, Breach, ALERT_MESSAGE, PRESSURE_LIMIT, TEMPERATURE_LIMIT};
pub use record::{EquipmentFields, EquipmentRecord, RecordId};
pub use time::{format_label, format_label_in, is_valid_timestamp, now_iso8601};
