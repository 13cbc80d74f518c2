//! On-demand AI analyses of a dataset

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Serialize;
use std::sync::Arc;

use super::super::envelope::{ApiErrorResponse, ApiResponse};
use super::{predict_batch, read_csv_body, ApiState};
use crate::llm::AnalysisKind;

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub kind: AnalysisKind,
    pub source: String,
    pub text: String,
    pub cached: bool,
}

/// POST /api/v1/insights/:kind - Insights, risk or quality analysis
///
/// The body is an optional CSV; without one the base dataset is analysed.
pub async fn post_insight(
    State(state): State<ApiState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let kind: AnalysisKind = match kind.parse() {
        Ok(kind) => kind,
        Err(msg) => return ApiErrorResponse::not_found(msg),
    };

    let table = match read_csv_body(&state, &headers, body) {
        Ok(Some(table)) => Arc::new(table),
        Ok(None) => Arc::clone(&state.base),
        Err(response) => return response,
    };

    let predictions = match predict_batch(Arc::clone(&state), Arc::clone(&table), |rows| rows).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };

    match state.insights.analyze(kind, &table, &predictions).await {
        Ok(insight) => ApiResponse::ok(InsightResponse {
            kind,
            source: table.source().to_string(),
            text: insight.text,
            cached: insight.cached,
        }),
        Err(e) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}
