//! Dataset endpoints: base summary, analyses of base, uploaded and random tables

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::super::envelope::{ApiErrorResponse, ApiResponse};
use super::{analysis_response, predict_batch, read_csv_body, ApiState};
use crate::charts::{describe, ColumnStats};
use crate::config::defaults;
use crate::dataset::{generate_random, TableRow};
use crate::model::predictions_to_csv;

// ============================================================================
// Dataset Summary
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub source: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub has_severity: bool,
    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub stats: Vec<ColumnStats>,
    pub preview: Vec<TableRow>,
}

/// GET /api/v1/dataset - Base dataset summary and preview
pub async fn get_dataset(State(state): State<ApiState>) -> Response {
    let base = &state.base;
    ApiResponse::ok(DatasetSummary {
        source: base.source().to_string(),
        rows: base.len(),
        columns: base.headers().to_vec(),
        has_severity: base.has_severity(),
        missing_values: base.missing_values(),
        duplicate_rows: base.duplicate_rows(),
        stats: describe(base),
        preview: base.preview(state.config.data.preview_rows),
    })
}

// ============================================================================
// Analysis
// ============================================================================

/// GET /api/v1/analysis - Analysis of the base dataset
pub async fn get_analysis(State(state): State<ApiState>) -> Response {
    let base = Arc::clone(&state.base);
    analysis_response(state, base).await
}

/// POST /api/v1/analysis - Analysis of an uploaded CSV
pub async fn post_analysis(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match read_csv_body(&state, &headers, body) {
        Ok(Some(table)) => {
            info!(rows = table.len(), "📥 CSV upload accepted");
            analysis_response(state, Arc::new(table)).await
        }
        Ok(None) => ApiErrorResponse::bad_request("Uploaded file is empty"),
        Err(response) => response,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomQuery {
    pub rows: Option<usize>,
    pub seed: Option<u64>,
}

/// POST /api/v1/dataset/random?rows=&seed= - Analysis of a synthetic dataset
pub async fn post_random_dataset(
    State(state): State<ApiState>,
    Query(query): Query<RandomQuery>,
) -> Response {
    let rows = query
        .rows
        .or(Some(state.config.data.random_rows).filter(|&n| n > 0));
    if let Some(n) = rows {
        if n == 0 || n > defaults::MAX_RANDOM_ROWS {
            return ApiErrorResponse::bad_request(format!(
                "rows must be between 1 and {}",
                defaults::MAX_RANDOM_ROWS
            ));
        }
    }

    let table = generate_random(&state.base, rows, query.seed);
    info!(rows = table.len(), seed = ?query.seed, "🎲 Random dataset generated");
    analysis_response(state, Arc::new(table)).await
}

// ============================================================================
// Batch Export
// ============================================================================

/// POST /api/v1/predictions/csv - Batch predictions as a CSV download
///
/// An empty body exports predictions for the base dataset.
pub async fn post_predictions_csv(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let table = match read_csv_body(&state, &headers, body) {
        Ok(Some(table)) => Arc::new(table),
        Ok(None) => Arc::clone(&state.base),
        Err(response) => return response,
    };

    let csv = match predict_batch(state, table, |rows| predictions_to_csv(&rows)).await {
        Ok(csv) => csv,
        Err(response) => return response,
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", defaults::DOWNLOAD_FILENAME),
            ),
        ],
        csv,
    )
        .into_response()
}
