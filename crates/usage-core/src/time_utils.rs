use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

/// Offset-aware layouts tried after RFC 3339, covering exports that use a
/// space separator (`2024-01-01 12:00:00+00:00`).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Naive layouts; values without an offset are interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse a raw JSON value into a UTC [`DateTime`].
///
/// * `null`      → `None`
/// * JSON string → see [`parse_timestamp_str`]
/// * JSON number → Unix timestamp (integer or float seconds)
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                DateTime::from_timestamp(secs, 0)
            } else if let Some(f) = n.as_f64() {
                let secs = f.floor();
                let nanos = ((f - secs) * 1_000_000_000.0) as u32;
                DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Parse an ISO 8601 timestamp string into UTC.
///
/// Accepts RFC 3339 (including the `Z` suffix), fixed offsets with a space
/// separator, naive date-times and bare dates. Anything without an offset is
/// taken to be UTC; a bare date means midnight UTC.
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Some(date) = parse_date_only(s) {
        return Some(start_of_day(date));
    }

    debug!("could not parse timestamp string \"{}\"", s);
    None
}

/// Parse a `YYYY-MM-DD` string. Returns `None` for anything longer.
pub fn parse_date_only(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

// ── Day boundaries ────────────────────────────────────────────────────────────

/// 00:00:00 UTC on `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// The last representable instant of `date` in UTC (23:59:59.999999999).
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|naive| Utc.from_utc_datetime(&naive))
}
