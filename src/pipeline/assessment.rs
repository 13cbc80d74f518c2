//! Single-record flow: form -> record -> validate -> predict -> charts -> insight.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::AppContext;
use crate::charts::{build_map, build_probability_chart, ChartSpec};
use crate::llm::{InsightText, InsightUnavailable};
use crate::model::ModelInferenceError;
use crate::types::{ClassProbability, EarthquakeRecord, PredictedRow, SeverityPrediction};
use crate::validation::{validate_with, RecordForm, ValidationResult};

/// Result page for one record.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub record: EarthquakeRecord,
    pub validation: ValidationResult,
    pub prediction: SeverityPrediction,
    pub probabilities: Vec<ClassProbability>,
    /// Probability bar chart, then the single-point map
    pub charts: Vec<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<InsightText>,
    /// Why `insight` is absent when one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight_unavailable: Option<InsightNotice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// User-facing note explaining a missing insight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightNotice {
    pub reason: &'static str,
    pub message: String,
}

impl From<&InsightUnavailable> for InsightNotice {
    fn from(e: &InsightUnavailable) -> Self {
        Self {
            reason: e.reason(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    /// Missing or out-of-range fields; nothing was predicted
    #[error("invalid record: {0}")]
    Invalid(ValidationResult),

    #[error("prediction unavailable: {0}")]
    Prediction(#[from] ModelInferenceError),
}

/// Run the single-record flow.
///
/// Validation and inference failures abort. Chart and insight failures only
/// drop the affected piece.
pub async fn assess_record(
    ctx: &AppContext,
    form: RecordForm,
    with_insight: bool,
) -> Result<Assessment, AssessmentError> {
    let record = form.into_record().map_err(AssessmentError::Invalid)?;

    let validation = validate_with(&record, &ctx.config.validation);
    if !validation.is_valid {
        debug!(errors = validation.errors.len(), "Record rejected by validation");
        return Err(AssessmentError::Invalid(validation));
    }

    let prediction = ctx.predictor.predict(&record).map_err(|e| {
        warn!(error = %e, "Severity prediction failed");
        AssessmentError::Prediction(e)
    })?;
    info!(
        magnitude = record.magnitude(),
        depth = record.depth(),
        severity = %prediction.severity(),
        confidence = %format!("{:.3}", prediction.confidence()),
        "Record assessed"
    );

    let mut warnings = Vec::new();
    let mut charts = Vec::with_capacity(2);

    let point = PredictedRow {
        record: record.clone(),
        prediction: prediction.clone(),
        observed: None,
    };
    for chart in [
        build_probability_chart(&prediction),
        build_map(std::slice::from_ref(&point), &ctx.config.charts),
    ] {
        match chart {
            Ok(spec) => charts.push(spec),
            Err(e) => {
                warn!(error = %e, "Chart omitted");
                warnings.push(format!("Chart omitted: {e}"));
            }
        }
    }

    let (insight, insight_unavailable) = if with_insight {
        match ctx.insights.generate_insight(&record, &prediction).await {
            Ok(text) => (Some(text), None),
            Err(e) => (None, Some(InsightNotice::from(&e))),
        }
    } else {
        (None, None)
    };

    Ok(Assessment {
        probabilities: prediction.breakdown(),
        record,
        validation,
        prediction,
        charts,
        insight,
        insight_unavailable,
        warnings,
    })
}
