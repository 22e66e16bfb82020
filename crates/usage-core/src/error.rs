use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single raw record fails strict validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The record carries a field outside the canonical schema.
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    /// A required field is absent or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but its value cannot be coerced to the canonical type.
    #[error("Invalid value {value:?} for field {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// All errors produced by the usage analytics pipeline.
#[derive(Error, Debug)]
pub enum UsageError {
    /// The usage source could not be opened or parsed as CSV.
    #[error("Failed to read usage source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source is tabular but lacks one or more required columns.
    #[error("CSV file {path} is missing required columns: {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// A row failed strict validation after coercion.
    #[error("Invalid usage record on line {line}: {source}")]
    Schema {
        line: u64,
        #[source]
        source: SchemaError,
    },

    /// A filter parameter could not be parsed.
    #[error("Invalid value {value:?} for filter parameter {param}")]
    InvalidFilter { param: &'static str, value: String },
}

/// Convenience alias used throughout the usage crates.
pub type Result<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_source_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = UsageError::SourceRead {
            path: PathBuf::from("/data/usage.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read usage source"));
        assert!(msg.contains("/data/usage.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_columns_lists_all() {
        let err = UsageError::MissingColumns {
            path: PathBuf::from("usage.csv"),
            columns: vec!["Model".to_string(), "Requests".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "CSV file usage.csv is missing required columns: Model, Requests"
        );
    }

    #[test]
    fn test_error_display_schema() {
        let err = UsageError::Schema {
            line: 3,
            source: SchemaError::MissingField("user"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid usage record on line 3: Missing required field: user"
        );
    }

    #[test]
    fn test_schema_error_invalid_value() {
        let err = SchemaError::InvalidValue {
            field: "requests",
            value: "abc".to_string(),
            reason: "not a number",
        };
        assert_eq!(
            err.to_string(),
            "Invalid value \"abc\" for field requests: not a number"
        );
    }

    #[test]
    fn test_error_display_invalid_filter() {
        let err = UsageError::InvalidFilter {
            param: "start_date",
            value: "yesterday".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value \"yesterday\" for filter parameter start_date"
        );
    }
}
