use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use tracing::warn;

/// Date-time patterns seen across the city CSV exports, tried in order.
const FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a start/end time field into a naive local timestamp.
///
/// Returns `None` when the string matches none of the known formats; the
/// caller decides whether that is fatal (start times) or tolerable (end
/// times).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    // Date-only fields map to midnight.
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    warn!("could not parse timestamp string \"{}\"", trimmed);
    None
}

/// Full weekday name of a timestamp, matching the day-filter vocabulary
/// after title-casing ("Monday", "Tuesday", ...).
pub fn weekday_name(ts: &NaiveDateTime) -> &'static str {
    match ts.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
