//! Query service tying a usage source to the aggregator and filter.
//!
//! Every query reloads the source from scratch; nothing is cached between
//! calls, so the service holds no mutable state and can be shared freely.

use std::sync::Arc;

use tracing::debug;
use usage_core::error::Result;
use usage_core::models::{DailyRequests, ModelTokens, RawDataQuery, Table, UsageEvent, UserTokens};

use crate::aggregator::UsageAggregator;
use crate::filter::{get_raw_data, RawDataFilter};
use crate::reader::CsvUsageRepository;

// ── UsageSource ───────────────────────────────────────────────────────────────

/// Anything that can produce the full, current list of usage events.
pub trait UsageSource: Send + Sync {
    fn load_events(&self) -> Result<Vec<UsageEvent>>;
}

impl UsageSource for CsvUsageRepository {
    fn load_events(&self) -> Result<Vec<UsageEvent>> {
        self.get_events()
    }
}

// ── UsageAnalyticsService ─────────────────────────────────────────────────────

/// Aggregated and filtered views over a [`UsageSource`].
#[derive(Clone)]
pub struct UsageAnalyticsService {
    source: Arc<dyn UsageSource>,
}

impl UsageAnalyticsService {
    pub fn new(source: impl UsageSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Requests per UTC day, ascending by date.
    pub fn events_per_day(&self) -> Result<Table<DailyRequests>> {
        let events = self.load()?;
        Ok(UsageAggregator::events_per_day(&events))
    }

    /// Total tokens per user, ascending by user.
    pub fn tokens_per_user(&self) -> Result<Table<UserTokens>> {
        let events = self.load()?;
        Ok(UsageAggregator::tokens_per_user(&events))
    }

    /// Total tokens per model, ascending by model.
    pub fn tokens_by_model(&self) -> Result<Table<ModelTokens>> {
        let events = self.load()?;
        Ok(UsageAggregator::tokens_by_model(&events))
    }

    /// Filtered raw events, newest first.
    ///
    /// The query is validated before the source is touched.
    pub fn raw_data(&self, query: &RawDataQuery) -> Result<Table<UsageEvent>> {
        let filter = RawDataFilter::from_query(query)?;
        let events = self.load()?;
        Ok(get_raw_data(&events, &filter))
    }

    fn load(&self) -> Result<Vec<UsageEvent>> {
        let events = self.source.load_events()?;
        debug!(events = events.len(), "usage source reloaded");
        Ok(events)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
