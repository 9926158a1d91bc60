use crate::constants::CANONICAL_DATETIME_FORMAT;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

// `%.f` also matches a missing fractional part
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a calendar date or date-time in any of the accepted layouts.
///
/// Values carrying a UTC offset (RFC 3339) are converted to UTC wall time.
/// Bare dates resolve to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Rewrites a parseable value as `YYYY-MM-DD HH:MM:SS`, dropping fractional seconds.
pub fn normalize_datetime(raw: &str) -> Option<String> {
    parse_datetime(raw).map(|dt| dt.format(CANONICAL_DATETIME_FORMAT).to_string())
}
