//! REST API handlers.
//!
//! Reads come from the monitor's latest published status; writes go
//! through the [`promlive_scrape::MonitorHandle`] and are acknowledged
//! before the response is sent.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use promlive_core::{CoreError, Projection, ScanConfigPatch, TimeRange};
use promlive_scrape::MonitorError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn monitor_error(e: MonitorError) -> Response {
    let status = match &e {
        MonitorError::Core(CoreError::UnknownMetric(_)) => StatusCode::NOT_FOUND,
        MonitorError::Core(CoreError::InvalidConfig(_) | CoreError::InvalidRange(_)) => {
            StatusCode::BAD_REQUEST
        }
        MonitorError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        MonitorError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(&e.to_string(), status).into_response()
}

// ── Projection ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProjectionQuery {
    pub range: Option<String>,
}

#[derive(Serialize)]
struct ProjectionView {
    #[serde(flatten)]
    projection: Projection,
    summary: String,
    range: String,
}

/// GET /api/v1/projection
pub async fn get_projection(
    State(state): State<ApiState>,
    Query(query): Query<ProjectionQuery>,
) -> impl IntoResponse {
    let range = match query.range.as_deref().map(str::parse::<TimeRange>) {
        None => TimeRange::All,
        Some(Ok(range)) => range,
        Some(Err(e)) => return error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response(),
    };

    let mut projection = state.monitor.status().projection;
    projection.points = projection.points_within(range);

    ApiResponse::ok(ProjectionView {
        summary: projection.summary(),
        range: range.to_string(),
        projection,
    })
    .into_response()
}

// ── Metrics and selection ──────────────────────────────────────

#[derive(Serialize)]
struct MetricsView {
    metrics: Vec<String>,
    selected: Option<String>,
}

/// GET /api/v1/metrics
pub async fn list_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let status = state.monitor.status();
    ApiResponse::ok(MetricsView {
        metrics: status.metrics,
        selected: status.selected,
    })
}

/// Selection request body.
#[derive(Deserialize)]
pub struct SelectionRequest {
    pub metric: String,
}

/// PUT /api/v1/selection
pub async fn put_selection(
    State(state): State<ApiState>,
    Json(req): Json<SelectionRequest>,
) -> impl IntoResponse {
    match state.monitor.select(&req.metric).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({ "selected": req.metric })).into_response(),
        Err(e) => monitor_error(e),
    }
}

// ── Config ─────────────────────────────────────────────────────

/// GET /api/v1/config
pub async fn get_config(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.monitor.status().config)
}

/// PUT /api/v1/config
///
/// Body is a partial config; the monitor merges it into its current one.
pub async fn put_config(
    State(state): State<ApiState>,
    Json(patch): Json<ScanConfigPatch>,
) -> impl IntoResponse {
    match state.monitor.update(patch).await {
        Ok(config) => {
            info!(url = %config.url, interval_secs = config.interval_secs, "scan config updated via api");
            ApiResponse::ok(config).into_response()
        }
        Err(e) => monitor_error(e),
    }
}

// ── Reset ──────────────────────────────────────────────────────

/// POST /api/v1/reset
pub async fn reset(State(state): State<ApiState>) -> impl IntoResponse {
    match state.monitor.clear().await {
        Ok(()) => ApiResponse::ok("cleared").into_response(),
        Err(e) => monitor_error(e),
    }
}
