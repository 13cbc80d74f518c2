//! Single-record assessment endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use super::super::envelope::{ApiErrorResponse, ApiResponse};
use super::ApiState;
use crate::pipeline::{assess_record, AssessmentError};
use crate::validation::RecordForm;

#[derive(Debug, Default, Deserialize)]
pub struct AssessQuery {
    /// Request an AI narrative alongside the prediction
    #[serde(default)]
    pub insight: bool,
}

/// POST /api/v1/assess - Validate, classify and optionally explain one record
pub async fn post_assess(
    State(state): State<ApiState>,
    Query(query): Query<AssessQuery>,
    form: Result<Json<RecordForm>, JsonRejection>,
) -> Response {
    let Json(form) = match form {
        Ok(form) => form,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    match assess_record(&state, form, query.insight).await {
        Ok(assessment) => ApiResponse::ok(assessment),
        Err(AssessmentError::Invalid(result)) => {
            ApiErrorResponse::unprocessable(result.messages().join("; "), &result.errors)
        }
        Err(e @ AssessmentError::Prediction(_)) => ApiErrorResponse::service_unavailable(e.to_string()),
    }
}
