//! Core types for usage analytics.
//!
//! Holds the canonical usage event and its strict validator, the tabular row
//! types produced by aggregation, timestamp helpers, settings, and the shared
//! error taxonomy.

pub mod error;
pub mod models;
pub mod schema;
pub mod settings;
pub mod time_utils;

pub use error::{Result, SchemaError, UsageError};
