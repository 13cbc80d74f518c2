//! Service state endpoints: health, status

use axum::extract::{OriginalUri, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use super::super::envelope::{ApiErrorResponse, ApiResponse};
use super::ApiState;

// ============================================================================
// Health Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
}

/// GET /health - Liveness probe (not enveloped)
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
    })
}

// ============================================================================
// Status Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub model_version: String,
    pub dataset: DatasetStatus,
    pub insights: InsightStatus,
    pub max_upload_mb: u64,
}

#[derive(Debug, Serialize)]
pub struct DatasetStatus {
    pub source: String,
    pub rows: usize,
    pub has_severity: bool,
}

#[derive(Debug, Serialize)]
pub struct InsightStatus {
    pub available: bool,
    /// Provider backend, when configured
    pub backend: Option<&'static str>,
    pub cached_analyses: usize,
}

/// GET /api/v1/status - Loaded assets and insight availability
pub async fn get_status(State(state): State<ApiState>) -> Response {
    let insights = InsightStatus {
        available: state.insights.is_available(),
        backend: state.insights.backend_name(),
        cached_analyses: state.insights.cached_entries().await,
    };

    ApiResponse::ok(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        model_version: state.predictor.version().to_string(),
        dataset: DatasetStatus {
            source: state.base.source().to_string(),
            rows: state.base.len(),
            has_severity: state.base.has_severity(),
        },
        insights,
        max_upload_mb: state.config.data.max_upload_mb,
    })
}

/// Unmatched /api/v1 path
pub async fn api_not_found(OriginalUri(uri): OriginalUri) -> Response {
    ApiErrorResponse::not_found(format!("No route for {}", uri.path()))
}
