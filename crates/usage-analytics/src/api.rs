//! HTTP endpoints for the dashboard.
//!
//! GET /health                    - liveness probe
//! GET /analytics/events_per_day  - requests per UTC day
//! GET /analytics/tokens_per_user - total tokens per user
//! GET /analytics/tokens_by_model - total tokens per model
//! GET /analytics/raw_data        - filtered events, newest first

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tokio::task::JoinError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};
use usage_core::error::{Result as UsageResult, UsageError};
use usage_core::models::{DailyRequests, ModelTokens, RawDataQuery, Table, UsageEvent, UserTokens};
use usage_data::analytics::UsageAnalyticsService;

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body, shaped like `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Failure of an analytics request, rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    Usage(UsageError),
    /// The blocking query task panicked or was cancelled.
    Task(JoinError),
}

impl From<UsageError> for ApiError {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Task(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Usage(err @ UsageError::InvalidFilter { .. }) => {
                warn!(error = %err, "rejected analytics query");
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Usage(err) => {
                error!(error = %err, "analytics query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Task(err) => {
                error!(error = %err, "analytics query task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Analytics query did not complete".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the full application router around `service`.
pub fn router(service: UsageAnalyticsService) -> Router {
    let analytics = Router::new()
        .route("/events_per_day", get(events_per_day))
        .route("/tokens_per_user", get(tokens_per_user))
        .route("/tokens_by_model", get(tokens_by_model))
        .route("/raw_data", get(raw_data))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .nest("/analytics", analytics)
        .layer(TraceLayer::new_for_http())
        // The dashboard is served from another origin.
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Run a service query on the blocking pool; every query reads the CSV.
async fn run_query<T, F>(service: UsageAnalyticsService, query: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&UsageAnalyticsService) -> UsageResult<T> + Send + 'static,
{
    let rows = tokio::task::spawn_blocking(move || query(&service)).await??;
    Ok(Json(rows))
}

async fn events_per_day(
    State(service): State<UsageAnalyticsService>,
) -> ApiResult<Table<DailyRequests>> {
    run_query(service, |s| s.events_per_day()).await
}

async fn tokens_per_user(
    State(service): State<UsageAnalyticsService>,
) -> ApiResult<Table<UserTokens>> {
    run_query(service, |s| s.tokens_per_user()).await
}

async fn tokens_by_model(
    State(service): State<UsageAnalyticsService>,
) -> ApiResult<Table<ModelTokens>> {
    run_query(service, |s| s.tokens_by_model()).await
}

async fn raw_data(
    State(service): State<UsageAnalyticsService>,
    Query(query): Query<RawDataQuery>,
) -> ApiResult<Table<UsageEvent>> {
    run_query(service, move |s| s.raw_data(&query)).await
}
