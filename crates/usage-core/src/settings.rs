use clap::Parser;
use std::path::PathBuf;

use crate::models::RawDataQuery;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Usage analytics API over a usage CSV export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "usage-analytics",
    about = "Usage analytics API over a usage CSV export",
    version
)]
pub struct Settings {
    /// Path to the usage CSV export
    #[arg(long, env = "USAGE_CSV_PATH", default_value = "data/usage.csv")]
    pub csv_path: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(long, env = "USAGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the HTTP server
    #[arg(long, env = "USAGE_PORT", default_value = "8000")]
    pub port: u16,

    /// Serve the HTTP API, or print a single view as JSON and exit
    #[arg(long, default_value = "serve", value_parser = ["serve", "events_per_day", "tokens_per_user", "tokens_by_model", "raw_data"])]
    pub view: String,

    /// Inclusive lower bound for the raw_data view (ISO 8601 date or timestamp)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Inclusive upper bound for the raw_data view (ISO 8601 date or timestamp)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Only include events for this user (raw_data view)
    #[arg(long)]
    pub user: Option<String>,

    /// Only include events for this model (raw_data view)
    #[arg(long)]
    pub model: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and environment.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`load`](Self::load) but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Filter parameters for the `raw_data` view.
    pub fn raw_data_query(&self) -> RawDataQuery {
        RawDataQuery {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            user: self.user.clone(),
            model: self.model.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
