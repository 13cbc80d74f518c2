//! API route definitions
//!
//! Organizes endpoints for the assessment page:
//! - /api/v1/status - Loaded model, dataset and insight availability
//! - /api/v1/dataset - Base dataset summary, random dataset analysis
//! - /api/v1/analysis - Descriptive and predictive analysis
//! - /api/v1/assess - Single-record assessment
//! - /api/v1/predictions/csv - Batch prediction export
//! - /api/v1/insights/:kind - AI analyses

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

/// Create all v1 API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/dataset", get(handlers::get_dataset))
        .route("/dataset/random", post(handlers::post_random_dataset))
        .route("/analysis", get(handlers::get_analysis).post(handlers::post_analysis))
        .route("/assess", post(handlers::post_assess))
        .route("/predictions/csv", post(handlers::post_predictions_csv))
        .route("/insights/:kind", post(handlers::post_insight))
        .fallback(handlers::api_not_found)
        .with_state(state)
}

/// Liveness endpoint at root level
pub fn health_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
