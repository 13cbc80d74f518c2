//! Severity classifier
//!
//! Wraps the pre-trained model behind the [`SeverityModel`] trait.
//! [`Predictor`] assembles the feature vector from a record, calls the model
//! exactly once, and checks the returned probability vector before handing
//! out a [`SeverityPrediction`]. A missing or mismatched artifact is a
//! startup error; it is never papered over with a default label.

mod artifact;

pub use artifact::{ArtifactMetadata, ModelArtifact, StandardScaler, ARTIFACT_VERSION};

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::defaults::PROBABILITY_SUM_TOLERANCE;
use crate::dataset::{csv_escape, Table};
use crate::types::{EarthquakeRecord, PredictedRow, Severity, SeverityPrediction, NUM_FEATURES};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelInferenceError {
    #[error("Model artifact not available at {}: {reason}", path.display())]
    ArtifactMissing { path: PathBuf, reason: String },

    #[error("Model artifact is malformed: {0}")]
    Malformed(String),

    #[error("Feature shape mismatch: model expects {expected}, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Model produced invalid output: {0}")]
    InvalidOutput(String),
}

// ============================================================================
// Model Trait
// ============================================================================

/// A loaded classifier exposing `predict(features) -> (class_index, probabilities)`.
pub trait SeverityModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<(usize, Vec<f64>), ModelInferenceError>;

    fn n_features(&self) -> usize;
}

/// Standardised multinomial logistic regression evaluated from a [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct LogisticModel {
    artifact: ModelArtifact,
}

impl LogisticModel {
    pub fn new(artifact: ModelArtifact) -> Result<Self, ModelInferenceError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl SeverityModel for LogisticModel {
    fn predict(&self, features: &[f64]) -> Result<(usize, Vec<f64>), ModelInferenceError> {
        if features.len() != self.n_features() {
            return Err(ModelInferenceError::ShapeMismatch {
                expected: self.n_features(),
                found: features.len(),
            });
        }

        let scaler = &self.artifact.scaler;
        let z: Vec<f64> = features
            .iter()
            .zip(scaler.mean.iter().zip(&scaler.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();

        let logits: Vec<f64> = self
            .artifact
            .weights
            .iter()
            .zip(&self.artifact.intercepts)
            .map(|(row, b)| row.iter().zip(&z).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        let probabilities = softmax(&logits);
        let class = argmax(&probabilities);
        Ok((class, probabilities))
    }

    fn n_features(&self) -> usize {
        self.artifact.feature_names.len()
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the lowest index wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

// ============================================================================
// Predictor
// ============================================================================

/// Validated front end over a [`SeverityModel`].
pub struct Predictor {
    model: Box<dyn SeverityModel>,
    version: String,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("version", &self.version)
            .field("n_features", &self.model.n_features())
            .finish()
    }
}

impl Predictor {
    /// Load the JSON artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelInferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ModelInferenceError::ArtifactMissing {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let artifact = ModelArtifact::from_json(&json)?;

        let version = format!("v{}", artifact.version);
        info!(
            path = %path.display(),
            version = %version,
            trained_with = artifact.metadata.trained_with.as_deref().unwrap_or("unknown"),
            "🧠 Severity model loaded"
        );
        Ok(Self {
            model: Box::new(LogisticModel::new(artifact)?),
            version,
        })
    }

    /// Wrap any model implementation.
    pub fn with_model(model: Box<dyn SeverityModel>, version: impl Into<String>) -> Result<Self, ModelInferenceError> {
        if model.n_features() != NUM_FEATURES {
            return Err(ModelInferenceError::ShapeMismatch {
                expected: NUM_FEATURES,
                found: model.n_features(),
            });
        }
        Ok(Self {
            model,
            version: version.into(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Classify one record.
    pub fn predict(&self, record: &EarthquakeRecord) -> Result<SeverityPrediction, ModelInferenceError> {
        let features = record.features();
        let (class, probabilities) = self.model.predict(&features)?;
        check_output(class, &probabilities)
    }

    /// Classify every row of a table. The first failure aborts the batch.
    pub fn predict_table(&self, table: &Table) -> Result<Vec<PredictedRow>, ModelInferenceError> {
        table
            .records()
            .iter()
            .zip(table.observed())
            .map(|(record, observed)| {
                Ok(PredictedRow {
                    record: record.clone(),
                    prediction: self.predict(record)?,
                    observed: *observed,
                })
            })
            .collect()
    }
}

fn check_output(class: usize, probabilities: &[f64]) -> Result<SeverityPrediction, ModelInferenceError> {
    let severity = Severity::from_index(class)
        .ok_or_else(|| ModelInferenceError::InvalidOutput(format!("class index {class} out of range")))?;

    let probs: [f64; Severity::COUNT] = probabilities.try_into().map_err(|_| {
        ModelInferenceError::InvalidOutput(format!(
            "expected {} probabilities, got {}",
            Severity::COUNT,
            probabilities.len()
        ))
    })?;

    if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(ModelInferenceError::InvalidOutput(
            "probabilities must be finite and non-negative".to_string(),
        ));
    }
    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(ModelInferenceError::InvalidOutput(format!(
            "probabilities sum to {sum:.6}"
        )));
    }

    Ok(SeverityPrediction::new(severity, probs))
}

// ============================================================================
// Batch Export
// ============================================================================

/// Render batch predictions as CSV with the predicted tier in `Gravedad`.
pub fn predictions_to_csv(rows: &[PredictedRow]) -> String {
    let with_location = rows.iter().any(|r| r.record.location().is_some());

    let mut out = String::from("Magnitud,Latitud,Longitud,Profundidad");
    if with_location {
        out.push_str(",Localidad");
    }
    out.push_str(",Gravedad,Confianza\n");

    for row in rows {
        let r = &row.record;
        out.push_str(&format!(
            "{},{},{},{}",
            r.magnitude(),
            r.latitude(),
            r.longitude(),
            r.depth()
        ));
        if with_location {
            out.push(',');
            out.push_str(&csv_escape(r.location().unwrap_or("")));
        }
        out.push_str(&format!(
            ",{},{:.4}\n",
            csv_escape(row.prediction.severity().source_label()),
            row.prediction.confidence()
        ));
    }
    out
}
