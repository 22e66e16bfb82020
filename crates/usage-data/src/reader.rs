//! CSV loading for usage exports.
//!
//! Reads the export at a configured path, maps its human-readable headers to
//! canonical field names, and validates every row into a [`UsageEvent`].
//! Loading is all-or-nothing: the first bad row fails the whole load.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};
use usage_core::error::{Result, UsageError};
use usage_core::models::UsageEvent;
use usage_core::schema::{validate_record, RawRecord};

/// Source header → canonical field name, one entry per [`UsageEvent`] field.
pub const COLUMN_MAPPING: [(&str, &str); 11] = [
    ("Date", "date"),
    ("User", "user"),
    ("Kind", "kind"),
    ("Model", "model"),
    ("Max Mode", "max_mode"),
    ("Input (w/ Cache Write)", "input_with_cache"),
    ("Input (w/o Cache Write)", "input_without_cache"),
    ("Cache Read", "cache_read"),
    ("Output Tokens", "output_tokens"),
    ("Total Tokens", "total_tokens"),
    ("Requests", "requests"),
];

// ── CsvUsageRepository ────────────────────────────────────────────────────────

/// Loads usage events from a CSV file, re-reading it on every call.
#[derive(Debug, Clone)]
pub struct CsvUsageRepository {
    csv_path: PathBuf,
}

impl CsvUsageRepository {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.csv_path
    }

    /// Load every event from the configured file, in row order.
    pub fn get_events(&self) -> Result<Vec<UsageEvent>> {
        load_usage_events(&self.csv_path)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Open `path` and load its rows as validated [`UsageEvent`]s.
pub fn load_usage_events(path: &Path) -> Result<Vec<UsageEvent>> {
    let file = File::open(path).map_err(|source| UsageError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let events = read_usage_events(file, path)?;
    info!("Loaded {} usage events from {}", events.len(), path.display());
    Ok(events)
}

/// Load validated events from any CSV byte stream.
///
/// `origin` is only used to label errors.
pub fn read_usage_events<R: Read>(source: R, origin: &Path) -> Result<Vec<UsageEvent>> {
    let source_error = |err: csv::Error| UsageError::SourceRead {
        path: origin.to_path_buf(),
        source: io::Error::from(err),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers().map_err(source_error)?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(UsageError::SourceRead {
            path: origin.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, "no columns to parse"),
        });
    }

    let positions = resolve_columns(&headers, origin)?;

    let mut events = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(source_error)?;
        let raw = to_raw_record(&record, &positions);
        let event = validate_record(&raw).map_err(|source| UsageError::Schema {
            // header is line 1
            line: record
                .position()
                .map_or(index as u64 + 2, |pos| pos.line()),
            source,
        })?;
        events.push(event);
    }

    debug!("Parsed {} rows from {}", events.len(), origin.display());
    Ok(events)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Locate each mapped header, reporting every absent one at once.
///
/// Returns `(canonical name, column index)` pairs in mapping order.
fn resolve_columns(
    headers: &csv::StringRecord,
    origin: &Path,
) -> Result<Vec<(&'static str, usize)>> {
    let mut positions = Vec::with_capacity(COLUMN_MAPPING.len());
    let mut missing = Vec::new();

    for (source_name, field) in COLUMN_MAPPING {
        match headers.iter().position(|h| h == source_name) {
            Some(index) => positions.push((field, index)),
            None => missing.push(source_name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(UsageError::MissingColumns {
            path: origin.to_path_buf(),
            columns: missing,
        });
    }

    let ignored: Vec<&str> = headers
        .iter()
        .filter(|h| !COLUMN_MAPPING.iter().any(|(name, _)| name == h))
        .collect();
    if !ignored.is_empty() {
        debug!("Ignoring unmapped columns in {}: {:?}", origin.display(), ignored);
    }

    Ok(positions)
}

/// Build the canonical raw record for one CSV row. Empty cells become `null`.
fn to_raw_record(record: &csv::StringRecord, positions: &[(&'static str, usize)]) -> RawRecord {
    positions
        .iter()
        .map(|&(field, index)| {
            let value = match record.get(index) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            (field.to_string(), value)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
