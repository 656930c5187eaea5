//! Timestamp helpers.
//!
//! Records carry their timestamp as an ISO 8601 string. These functions turn
//! it into a display label without touching the stored value.

use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Label used when a timestamp cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// `1/15/2024, 2:30:05 PM`
const LABEL_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Current time as an ISO 8601 string with millisecond precision (`...Z`).
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO 8601 timestamp into `tz`.
///
/// - With an offset (RFC 3339): converted into `tz`.
/// - Date and time without offset: read as wall-clock time in `tz`. A time
///   skipped by a forward DST jump moves forward by the hour that was
///   skipped; a repeated time takes the earlier instant.
/// - Date only: UTC midnight, converted into `tz`.
pub fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return wall_clock(naive, tz);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).with_timezone(tz));
    }

    None
}

fn wall_clock<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

/// True if `raw` parses as one of the accepted ISO 8601 shapes.
pub fn is_valid_timestamp(raw: &str) -> bool {
    parse_in(raw, &Utc).is_some()
}

/// Render a timestamp as a display label in `tz`.
pub fn format_label_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match parse_in(raw, tz) {
        Some(dt) => dt.format(LABEL_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Render a timestamp as a display label in the local time zone.
pub fn format_label(raw: &str) -> String {
    format_label_in(raw, &Local)
}
