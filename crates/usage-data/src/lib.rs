//! Data pipeline for usage analytics.
//!
//! Loads the usage CSV export into validated events, aggregates them by day,
//! user and model, and produces the filtered raw listing.

pub mod aggregator;
pub mod analytics;
pub mod filter;
pub mod reader;

pub use usage_core as core;
