mod api;
mod bootstrap;

use anyhow::{Context, Result};
use serde::Serialize;
use usage_core::settings::Settings;
use usage_data::analytics::UsageAnalyticsService;
use usage_data::reader::CsvUsageRepository;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Usage Analytics v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Source: {}, View: {}",
        settings.csv_path.display(),
        settings.view
    );

    let service = UsageAnalyticsService::new(CsvUsageRepository::new(&settings.csv_path));

    match settings.view.as_str() {
        "serve" => serve(&settings, service).await?,
        "events_per_day" => print_json(&service.events_per_day()?)?,
        "tokens_per_user" => print_json(&service.tokens_per_user()?)?,
        "tokens_by_model" => print_json(&service.tokens_by_model()?)?,
        "raw_data" => print_json(&service.raw_data(&settings.raw_data_query())?)?,
        unknown => anyhow::bail!("Unknown view mode: {}", unknown),
    }

    Ok(())
}

async fn serve(settings: &Settings, service: UsageAnalyticsService) -> Result<()> {
    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    tracing::info!("Listening on http://{}", address);

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received; shutting down");
            }
        })
        .await?;

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
