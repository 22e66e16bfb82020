use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

// ── TableRow / Table ──────────────────────────────────────────────────────────

/// A row type with a fixed, ordered set of named columns.
///
/// The column names match the serialized field names of the row, in
/// declaration order.
pub trait TableRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Ordered rows of a single [`TableRow`] type.
///
/// The column set is carried by the row type, so an empty table still reports
/// its full schema. Serializes as a JSON array of objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R: TableRow> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Column names in output order.
    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: TableRow> Default for Table<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Serialize> Serialize for Table<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

// ── UsageEvent ────────────────────────────────────────────────────────────────

/// One recorded LLM interaction from the usage export.
///
/// Built by [`crate::schema::validate_record`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageEvent {
    /// When the interaction happened, normalised to UTC.
    pub date: DateTime<Utc>,
    pub user: String,
    /// Event kind as reported by the export (e.g. "Included in Pro").
    pub kind: String,
    pub model: String,
    pub max_mode: String,
    /// Input tokens including cache writes.
    pub input_with_cache: u64,
    /// Input tokens excluding cache writes.
    pub input_without_cache: u64,
    pub cache_read: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    /// Billable requests; zero for requests that errored before completion.
    pub requests: u64,
}

impl TableRow for UsageEvent {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "user",
        "kind",
        "model",
        "max_mode",
        "input_with_cache",
        "input_without_cache",
        "cache_read",
        "output_tokens",
        "total_tokens",
        "requests",
    ];
}

// ── Aggregate rows ────────────────────────────────────────────────────────────

/// Requests summed over one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRequests {
    pub date: NaiveDate,
    pub requests_count: u64,
}

impl TableRow for DailyRequests {
    const COLUMNS: &'static [&'static str] = &["date", "requests_count"];
}

/// Total tokens consumed by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTokens {
    pub user: String,
    pub total_tokens: u64,
}

impl TableRow for UserTokens {
    const COLUMNS: &'static [&'static str] = &["user", "total_tokens"];
}

/// Total tokens consumed through one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTokens {
    pub model: String,
    pub total_tokens: u64,
}

impl TableRow for ModelTokens {
    const COLUMNS: &'static [&'static str] = &["model", "total_tokens"];
}

// ── RawDataQuery ──────────────────────────────────────────────────────────────

/// Unparsed filter parameters as received from the HTTP query string or CLI.
///
/// Unknown parameters (such as a cache-busting `_`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> UsageEvent {
        UsageEvent {
            date: Utc.with_ymd_and_hms(2025, 9, 25, 19, 8, 55).unwrap(),
            user: "user@example.com".to_string(),
            kind: "chat".to_string(),
            model: "gpt-test".to_string(),
            max_mode: "auto".to_string(),
            input_with_cache: 10,
            input_without_cache: 5,
            cache_read: 2,
            output_tokens: 15,
            total_tokens: 25,
            requests: 1,
        }
    }

    #[test]
    fn test_event_columns_match_serialized_order() {
        let text = serde_json::to_string(&sample_event()).unwrap();
        let mut last = 0;
        for column in UsageEvent::COLUMNS {
            let pos = text.find(&format!("\"{}\":", column)).unwrap();
            assert!(pos >= last, "column {} out of order", column);
            last = pos;
        }
    }

    #[test]
    fn test_event_date_serializes_as_iso8601() {
        let value = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(value["date"], "2025-09-25T19:08:55Z");
        assert_eq!(value["requests"], 1);
    }

    #[test]
    fn test_event_rejects_unknown_fields() {
        let mut value = serde_json::to_value(sample_event()).unwrap();
        value["extra"] = serde_json::json!("x");
        assert!(serde_json::from_value::<UsageEvent>(value).is_err());
    }

    #[test]
    fn test_empty_table_keeps_columns() {
        let table: Table<DailyRequests> = Table::empty();
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["date", "requests_count"]);
        assert_eq!(serde_json::to_string(&table).unwrap(), "[]");
    }

    #[test]
    fn test_table_serializes_rows_as_records() {
        let table = Table::new(vec![
            UserTokens {
                user: "alice".to_string(),
                total_tokens: 100,
            },
            UserTokens {
                user: "bob".to_string(),
                total_tokens: 50,
            },
        ]);
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"user": "alice", "total_tokens": 100},
                {"user": "bob", "total_tokens": 50},
            ])
        );
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"[{"user":"alice","total_tokens":100},{"user":"bob","total_tokens":50}]"#
        );
    }

    #[test]
    fn test_daily_requests_date_is_plain_date() {
        let row = DailyRequests {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            requests_count: 3,
        };
        assert_eq!(
            serde_json::to_value(row).unwrap(),
            serde_json::json!({"date": "2024-01-01", "requests_count": 3})
        );
    }

    #[test]
    fn test_raw_data_query_ignores_unknown_params() {
        let query: RawDataQuery =
            serde_json::from_value(serde_json::json!({"user": "alice", "_": "1700000000"}))
                .unwrap();
        assert_eq!(query.user.as_deref(), Some("alice"));
        assert!(query.start_date.is_none());
    }
}
