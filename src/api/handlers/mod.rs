//! API route handlers
//!
//! Request handling logic for all API endpoints including:
//! - Service health and status
//! - Base, uploaded and random dataset analysis
//! - Single-record assessment and batch prediction export
//! - On-demand AI analyses

mod assess;
mod dataset;
mod insights;
mod status;

pub use assess::*;
pub use dataset::*;
pub use insights::*;
pub use status::*;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use std::sync::Arc;
use tracing::warn;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::dataset::{parse_csv, Table};
use crate::pipeline::{analyze_dataset, AppContext};
use crate::types::PredictedRow;
use crate::validation::validate_upload_size;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
pub type ApiState = Arc<AppContext>;

/// Name given to CSV bodies in logs and analysis output.
const UPLOAD_SOURCE: &str = "upload.csv";

// ============================================================================
// Shared helpers
// ============================================================================

/// Turn a CSV request body into a table.
///
/// `Ok(None)` means the body was empty and the caller should fall back to
/// the base dataset.
pub(crate) fn read_csv_body(
    state: &AppContext,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Option<Table>, Response> {
    let max_mb = state.config.data.max_upload_mb;
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let declared = headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            let message = declared
                .map(|bytes| validate_upload_size(bytes, max_mb))
                .filter(|check| !check.is_valid)
                .map(|check| check.to_string())
                .unwrap_or_else(|| format!("File is too large; the maximum is {max_mb} MB"));
            return Err(ApiErrorResponse::payload_too_large(message));
        }
        Err(rejection) => return Err(ApiErrorResponse::bad_request(rejection.body_text())),
    };

    let size_check = validate_upload_size(body.len(), max_mb);
    if !size_check.is_valid {
        return Err(ApiErrorResponse::payload_too_large(size_check.to_string()));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let text = std::str::from_utf8(&body)
        .map_err(|_| ApiErrorResponse::bad_request("Uploaded file is not valid UTF-8 text"))?;

    parse_csv(UPLOAD_SOURCE, text).map(Some).map_err(|e| {
        warn!(error = %e, "Rejected CSV upload");
        ApiErrorResponse::bad_request(e.to_string())
    })
}

/// Run the dataset flow off the async runtime and wrap the result.
pub(crate) async fn analysis_response(state: ApiState, table: Arc<Table>) -> Response {
    match tokio::task::spawn_blocking(move || analyze_dataset(&state, &table)).await {
        Ok(analysis) => ApiResponse::ok(analysis),
        Err(e) => {
            warn!(error = %e, "Analysis task failed");
            ApiErrorResponse::internal("Dataset analysis failed")
        }
    }
}

/// Predict every row of `table` on the blocking pool, then `render` the
/// batch there too. Failures are already wrapped as responses.
pub(crate) async fn predict_batch<T, F>(state: ApiState, table: Arc<Table>, render: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(Vec<PredictedRow>) -> T + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || state.predictor.predict_table(&table).map(render));
    match task.await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => {
            warn!(error = %e, "Batch prediction failed");
            Err(ApiErrorResponse::service_unavailable(format!("Prediction unavailable: {e}")))
        }
        Err(e) => {
            warn!(error = %e, "Batch prediction task failed");
            Err(ApiErrorResponse::internal("Batch prediction failed"))
        }
    }
}
