//! Grouped summaries over usage events.

use std::collections::BTreeMap;

use usage_core::models::{DailyRequests, ModelTokens, Table, UsageEvent, UserTokens};

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that groups usage events by day, user or model.
///
/// Every summary is sorted ascending by its key and keeps its column set when
/// the input is empty.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Requests summed per UTC calendar day.
    pub fn events_per_day(events: &[UsageEvent]) -> Table<DailyRequests> {
        let totals = Self::sum_by(events, |e| e.date.date_naive(), |e| e.requests);
        Table::new(
            totals
                .into_iter()
                .map(|(date, requests_count)| DailyRequests {
                    date,
                    requests_count,
                })
                .collect(),
        )
    }

    /// Total tokens summed per user.
    pub fn tokens_per_user(events: &[UsageEvent]) -> Table<UserTokens> {
        let totals = Self::sum_by(events, |e| e.user.clone(), |e| e.total_tokens);
        Table::new(
            totals
                .into_iter()
                .map(|(user, total_tokens)| UserTokens { user, total_tokens })
                .collect(),
        )
    }

    /// Total tokens summed per model.
    pub fn tokens_by_model(events: &[UsageEvent]) -> Table<ModelTokens> {
        let totals = Self::sum_by(events, |e| e.model.clone(), |e| e.total_tokens);
        Table::new(
            totals
                .into_iter()
                .map(|(model, total_tokens)| ModelTokens {
                    model,
                    total_tokens,
                })
                .collect(),
        )
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic grouping driver. `BTreeMap` keeps the keys sorted; sums
    /// saturate at `u64::MAX`.
    fn sum_by<K: Ord>(
        events: &[UsageEvent],
        key_fn: impl Fn(&UsageEvent) -> K,
        value_fn: impl Fn(&UsageEvent) -> u64,
    ) -> BTreeMap<K, u64> {
        let mut map: BTreeMap<K, u64> = BTreeMap::new();
        for event in events {
            let total = map.entry(key_fn(event)).or_default();
            *total = total.saturating_add(value_fn(event));
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
