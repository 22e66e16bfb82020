//! Strict validation of raw usage records.
//!
//! A raw record is a map of canonical field name to an untyped JSON value.
//! [`validate_record`] coerces it into a [`UsageEvent`] or reports the first
//! [`SchemaError`]. Extra fields are rejected; missing or NaN counters are
//! normalised to zero.

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::models::{TableRow, UsageEvent};
use crate::time_utils;

/// Untyped record keyed by canonical field names.
pub type RawRecord = Map<String, Value>;

/// Canonical field names, in column order.
pub const FIELD_NAMES: &[&str] = UsageEvent::COLUMNS;

/// Text spellings treated as a missing value in numeric columns.
const NA_TOKENS: &[&str] = &[
    "", "nan", "-nan", "na", "n/a", "null", "none", "<na>", "#n/a", "#na",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Construct a [`UsageEvent`] from a raw record, enforcing the strict schema.
pub fn validate_record(record: &RawRecord) -> Result<UsageEvent, SchemaError> {
    if let Some(extra) = record.keys().find(|k| !FIELD_NAMES.contains(&k.as_str())) {
        return Err(SchemaError::UnexpectedField(extra.clone()));
    }

    let date_value = required(record, "date")?;
    let date = time_utils::parse_timestamp(date_value).ok_or_else(|| {
        SchemaError::InvalidValue {
            field: "date",
            value: display_value(date_value),
            reason: "not a valid timestamp",
        }
    })?;

    Ok(UsageEvent {
        date,
        user: text(record, "user")?,
        kind: text(record, "kind")?,
        model: text(record, "model")?,
        max_mode: text(record, "max_mode")?,
        input_with_cache: counter(record, "input_with_cache")?,
        input_without_cache: counter(record, "input_without_cache")?,
        cache_read: counter(record, "cache_read")?,
        output_tokens: counter(record, "output_tokens")?,
        total_tokens: counter(record, "total_tokens")?,
        requests: counter(record, "requests")?,
    })
}

/// Coerce one raw numeric value to a non-negative integer.
///
/// `null`, NaN and the usual missing-value spellings become `0`. Integral
/// floats such as `1.0` are accepted; negative or fractional values are not.
pub fn coerce_counter(field: &'static str, value: &Value) -> Result<u64, SchemaError> {
    let invalid = |reason| SchemaError::InvalidValue {
        field,
        value: display_value(value),
        reason,
    };

    match value {
        Value::Null => Ok(0),
        Value::Number(n) => match n.as_u64() {
            Some(v) => Ok(v),
            None => float_to_counter(n.as_f64().unwrap_or(f64::NAN)).map_err(invalid),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if NA_TOKENS.contains(&trimmed.to_ascii_lowercase().as_str()) {
                return Ok(0);
            }
            if let Ok(v) = trimmed.parse::<u64>() {
                return Ok(v);
            }
            match trimmed.parse::<f64>() {
                Ok(f) => float_to_counter(f).map_err(invalid),
                Err(_) => Err(invalid("not a number")),
            }
        }
        _ => Err(invalid("expected a number")),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn required<'a>(record: &'a RawRecord, field: &'static str) -> Result<&'a Value, SchemaError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(SchemaError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn text(record: &RawRecord, field: &'static str) -> Result<String, SchemaError> {
    match required(record, field)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(SchemaError::InvalidValue {
            field,
            value: display_value(other),
            reason: "expected a string",
        }),
    }
}

fn counter(record: &RawRecord, field: &'static str) -> Result<u64, SchemaError> {
    record
        .get(field)
        .map_or(Ok(0), |value| coerce_counter(field, value))
}

fn float_to_counter(f: f64) -> Result<u64, &'static str> {
    if f.is_nan() {
        Ok(0)
    } else if f.is_infinite() {
        Err("not a finite number")
    } else if f < 0.0 {
        Err("must not be negative")
    } else if f.fract() != 0.0 {
        Err("must be a whole number")
    } else if f >= u64::MAX as f64 {
        Err("out of range")
    } else {
        Ok(f as u64)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn full_record() -> RawRecord {
        let value = json!({
            "date": "2024-01-01T12:00:00Z",
            "user": "alice",
            "kind": "chat",
            "model": "gpt-4",
            "max_mode": "No",
            "input_with_cache": "10",
            "input_without_cache": 5,
            "cache_read": "2.0",
            "output_tokens": 15,
            "total_tokens": 32,
            "requests": "1.0",
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_validate_full_record() {
        let event = validate_record(&full_record()).unwrap();
        assert_eq!(event.date, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        assert_eq!(event.user, "alice");
        assert_eq!(event.kind, "chat");
        assert_eq!(event.model, "gpt-4");
        assert_eq!(event.max_mode, "No");
        assert_eq!(event.input_with_cache, 10);
        assert_eq!(event.input_without_cache, 5);
        assert_eq!(event.cache_read, 2);
        assert_eq!(event.output_tokens, 15);
        assert_eq!(event.total_tokens, 32);
        assert_eq!(event.requests, 1);
    }

    #[test]
    fn test_missing_requests_coerces_to_zero() {
        let mut record = full_record();
        record.insert("requests".to_string(), Value::Null);
        assert_eq!(validate_record(&record).unwrap().requests, 0);

        record.insert("requests".to_string(), json!("NaN"));
        assert_eq!(validate_record(&record).unwrap().requests, 0);

        record.remove("requests");
        assert_eq!(validate_record(&record).unwrap().requests, 0);
    }

    #[test]
    fn test_extra_field_rejected() {
        let mut record = full_record();
        record.insert("cost".to_string(), json!(0.5));
        assert_eq!(
            validate_record(&record).unwrap_err(),
            SchemaError::UnexpectedField("cost".to_string())
        );
    }

    #[test]
    fn test_missing_text_field_rejected() {
        let mut record = full_record();
        record.remove("user");
        assert_eq!(
            validate_record(&record).unwrap_err(),
            SchemaError::MissingField("user")
        );

        let mut record = full_record();
        record.insert("model".to_string(), Value::Null);
        assert_eq!(
            validate_record(&record).unwrap_err(),
            SchemaError::MissingField("model")
        );
    }

    #[test]
    fn test_missing_date_rejected() {
        let mut record = full_record();
        record.remove("date");
        assert_eq!(
            validate_record(&record).unwrap_err(),
            SchemaError::MissingField("date")
        );
    }

    #[test]
    fn test_unparsable_date_rejected() {
        let mut record = full_record();
        record.insert("date".to_string(), json!("last tuesday"));
        assert!(matches!(
            validate_record(&record).unwrap_err(),
            SchemaError::InvalidValue { field: "date", .. }
        ));
    }

    #[test]
    fn test_non_string_text_field_rejected() {
        let mut record = full_record();
        record.insert("kind".to_string(), json!(42));
        assert!(matches!(
            validate_record(&record).unwrap_err(),
            SchemaError::InvalidValue { field: "kind", .. }
        ));
    }

    #[test]
    fn test_non_numeric_text_is_schema_error() {
        let mut record = full_record();
        record.insert("total_tokens".to_string(), json!("lots"));
        assert_eq!(
            validate_record(&record).unwrap_err(),
            SchemaError::InvalidValue {
                field: "total_tokens",
                value: "lots".to_string(),
                reason: "not a number",
            }
        );
    }

    #[test]
    fn test_coerce_counter_rules() {
        assert_eq!(coerce_counter("requests", &json!(3)).unwrap(), 3);
        assert_eq!(coerce_counter("requests", &json!(3.0)).unwrap(), 3);
        assert_eq!(coerce_counter("requests", &json!(" 7 ")).unwrap(), 7);
        assert_eq!(coerce_counter("requests", &json!("")).unwrap(), 0);
        assert_eq!(coerce_counter("requests", &json!("N/A")).unwrap(), 0);
        assert!(coerce_counter("requests", &json!(-1)).is_err());
        assert!(coerce_counter("requests", &json!("-1")).is_err());
        assert!(coerce_counter("requests", &json!(1.5)).is_err());
        assert!(coerce_counter("requests", &json!("inf")).is_err());
        assert!(coerce_counter("requests", &json!(true)).is_err());
    }
}
