//! Raw, filtered view over usage events.
//!
//! Date bounds are parsed to UTC timestamps up front and compared numerically
//! against each event; string comparison is never used. Both bounds are
//! inclusive. A date-only `end_date` covers the whole of that UTC day.

use chrono::{DateTime, Utc};
use usage_core::error::{Result, UsageError};
use usage_core::models::{RawDataQuery, Table, UsageEvent};
use usage_core::time_utils::{end_of_day, parse_date_only, parse_timestamp_str, start_of_day};

// ── RawDataFilter ─────────────────────────────────────────────────────────────

/// Parsed filter predicates. Every `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDataFilter {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub user: Option<String>,
    pub model: Option<String>,
}

impl RawDataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Parse boundary parameters. Empty strings are treated as absent.
    pub fn from_query(query: &RawDataQuery) -> Result<Self> {
        let since = non_empty(&query.start_date)
            .map(|s| parse_bound("start_date", s, false))
            .transpose()?;
        let until = non_empty(&query.end_date)
            .map(|s| parse_bound("end_date", s, true))
            .transpose()?;

        Ok(Self {
            since,
            until,
            user: non_empty(&query.user).map(str::to_string),
            model: non_empty(&query.model).map(str::to_string),
        })
    }

    /// `true` when `event` satisfies every configured predicate.
    pub fn matches(&self, event: &UsageEvent) -> bool {
        self.since.map_or(true, |since| event.date >= since)
            && self.until.map_or(true, |until| event.date <= until)
            && self.user.as_ref().map_or(true, |user| &event.user == user)
            && self.model.as_ref().map_or(true, |model| &event.model == model)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Events matching `filter`, newest first.
///
/// Events sharing a timestamp keep their source order.
pub fn get_raw_data(events: &[UsageEvent], filter: &RawDataFilter) -> Table<UsageEvent> {
    let mut rows: Vec<UsageEvent> = events
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    Table::new(rows)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bound(param: &'static str, value: &str, is_end: bool) -> Result<DateTime<Utc>> {
    let bound = match parse_date_only(value) {
        Some(date) if is_end => end_of_day(date),
        Some(date) => Some(start_of_day(date)),
        None => parse_timestamp_str(value),
    };
    bound.ok_or_else(|| UsageError::InvalidFilter {
        param,
        value: value.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
