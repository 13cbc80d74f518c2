//! Prediction output types.

use serde::Serialize;

use super::{EarthquakeRecord, Severity};

/// Probability assigned to one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbability {
    pub severity: Severity,
    pub probability: f64,
}

/// Classifier output for one record.
///
/// Only the prediction component builds these; the probability vector
/// always has one entry per tier and sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityPrediction {
    severity: Severity,
    /// Probability of the predicted tier
    confidence: f64,
    probabilities: [f64; Severity::COUNT],
}

impl SeverityPrediction {
    pub(crate) fn new(severity: Severity, probabilities: [f64; Severity::COUNT]) -> Self {
        Self {
            severity,
            confidence: probabilities[severity.index()],
            probabilities,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Per-class probabilities indexed by [`Severity::index`].
    pub fn probabilities(&self) -> &[f64; Severity::COUNT] {
        &self.probabilities
    }

    pub fn probability_of(&self, severity: Severity) -> f64 {
        self.probabilities[severity.index()]
    }

    /// Probabilities paired with their tiers, in tier order.
    pub fn breakdown(&self) -> Vec<ClassProbability> {
        Severity::ALL
            .iter()
            .map(|&severity| ClassProbability {
                severity,
                probability: self.probabilities[severity.index()],
            })
            .collect()
    }
}

/// A dataset row together with its predicted tier (batch predictions).
#[derive(Debug, Clone, Serialize)]
pub struct PredictedRow {
    pub record: EarthquakeRecord,
    pub prediction: SeverityPrediction,
    /// Label present in the uploaded data, if any (never fed to the model)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Severity>,
}

/// Tally of predicted tiers, always listing all four in tier order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub label: &'static str,
    pub count: usize,
}

/// Count predictions per tier.
pub fn severity_counts(rows: &[PredictedRow]) -> Vec<SeverityCount> {
    let mut counts = [0usize; Severity::COUNT];
    for row in rows {
        counts[row.prediction.severity().index()] += 1;
    }
    Severity::ALL
        .iter()
        .map(|&severity| SeverityCount {
            severity,
            label: severity.display_name(),
            count: counts[severity.index()],
        })
        .collect()
}
