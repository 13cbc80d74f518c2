//! Serialized classifier artifact.
//!
//! The offline training workflow exports a standardised multinomial
//! logistic regression as JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "feature_names": ["magnitude", "latitude", "longitude", "depth"],
//!   "classes": ["Baja", "Media", "Alta", "Muy Alta"],
//!   "scaler": { "mean": [..4], "scale": [..4] },
//!   "weights": [[..4], [..4], [..4], [..4]],
//!   "intercepts": [..4]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::ModelInferenceError;
use crate::types::{Severity, FEATURE_NAMES, NUM_FEATURES};

/// Highest artifact format this build understands.
pub const ARTIFACT_VERSION: u32 = 1;

/// Standard scaler fitted on the training set: `z = (x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Provenance recorded by the training workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default)]
    pub trained_with: Option<String>,
    #[serde(default)]
    pub trained_at: Option<String>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Format version for forward compatibility.
    pub version: u32,
    /// Input feature names in column order.
    pub feature_names: Vec<String>,
    /// Output class labels in index order.
    pub classes: Vec<String>,
    pub scaler: StandardScaler,
    /// One row of feature weights per class.
    pub weights: Vec<Vec<f64>>,
    /// One intercept per class.
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    /// Parse and check an artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ModelInferenceError> {
        let artifact: Self = serde_json::from_str(json)
            .map_err(|e| ModelInferenceError::Malformed(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check the artifact matches the feature vector this service builds.
    pub fn validate(&self) -> Result<(), ModelInferenceError> {
        if self.version == 0 || self.version > ARTIFACT_VERSION {
            return Err(ModelInferenceError::Malformed(format!(
                "unsupported artifact version {} (expected 1..={ARTIFACT_VERSION})",
                self.version
            )));
        }

        if self.feature_names.len() != NUM_FEATURES {
            return Err(ModelInferenceError::ShapeMismatch {
                expected: NUM_FEATURES,
                found: self.feature_names.len(),
            });
        }
        for (i, (found, expected)) in self.feature_names.iter().zip(FEATURE_NAMES).enumerate() {
            if !found.eq_ignore_ascii_case(expected) {
                return Err(ModelInferenceError::Malformed(format!(
                    "feature {i} is '{found}', expected '{expected}'"
                )));
            }
        }

        if self.classes.len() != Severity::COUNT {
            return Err(ModelInferenceError::Malformed(format!(
                "artifact declares {} classes, expected {}",
                self.classes.len(),
                Severity::COUNT
            )));
        }
        for (i, label) in self.classes.iter().enumerate() {
            if Severity::from_label(label) != Severity::from_index(i) {
                return Err(ModelInferenceError::Malformed(format!(
                    "class {i} is '{label}', expected '{}'",
                    Severity::ALL[i].source_label()
                )));
            }
        }

        check_len("scaler.mean", self.scaler.mean.len(), NUM_FEATURES)?;
        check_len("scaler.scale", self.scaler.scale.len(), NUM_FEATURES)?;
        check_len("weights", self.weights.len(), Severity::COUNT)?;
        for row in &self.weights {
            check_len("weights row", row.len(), NUM_FEATURES)?;
        }
        check_len("intercepts", self.intercepts.len(), Severity::COUNT)?;

        let all_finite = self
            .scaler
            .mean
            .iter()
            .chain(&self.scaler.scale)
            .chain(self.weights.iter().flatten())
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelInferenceError::Malformed(
                "artifact contains non-finite parameters".to_string(),
            ));
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0) {
            return Err(ModelInferenceError::Malformed(
                "scaler.scale contains zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_len(what: &str, found: usize, expected: usize) -> Result<(), ModelInferenceError> {
    if found == expected {
        Ok(())
    } else {
        tracing::debug!(what, found, expected, "Artifact dimension mismatch");
        Err(ModelInferenceError::ShapeMismatch { expected, found })
    }
}
