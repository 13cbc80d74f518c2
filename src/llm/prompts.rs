//! Prompt templates
//!
//! Every prompt the service sends is one of the fixed templates below with
//! `{placeholders}` filled in. Dataset analyses embed their summary as
//! pretty-printed JSON.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::summary::{DataSummary, QualitySummary, RiskSummary};
use super::ChatRequest;
use crate::types::{EarthquakeRecord, SeverityPrediction};

// ============================================================================
// System Prompts
// ============================================================================

pub const RECORD_SYSTEM_PROMPT: &str = "You are a seismologist who explains earthquake \
severity assessments to emergency managers in plain, precise language.";

pub const INSIGHTS_SYSTEM_PROMPT: &str = "You are a seismic analysis expert who produces \
clear, actionable insights from earthquake data.";

pub const RISK_SYSTEM_PROMPT: &str = "You are a seismic risk management expert who writes \
clear risk assessments for civil protection authorities.";

pub const QUALITY_SYSTEM_PROMPT: &str = "You are a seismic data quality expert who identifies \
problems in earthquake datasets and recommends improvements.";

// ============================================================================
// User Prompt Templates
// ============================================================================

const RECORD_PROMPT: &str = r#"An earthquake record was classified by a severity model.

### EVENT
Magnitude: {magnitude} | Depth: {depth} km
Epicentre: {latitude}, {longitude}{location}

### MODEL OUTPUT
Predicted severity: {severity} (confidence {confidence}%)
Class probabilities: {probabilities}

### INSTRUCTIONS
1. Explain what this severity tier means for people near the epicentre.
2. Relate magnitude and depth to expected shaking at the surface.
3. Say how much weight the confidence level deserves.
4. Suggest two or three immediate precautions.
Keep the answer under 200 words. No preamble."#;

const INSIGHTS_PROMPT: &str = r#"Analyse the following seismic prediction data and provide actionable insights.

Data:
{summary}

Please provide:
1. **Key findings**: important patterns in magnitude, depth and location
2. **Severity distribution**: analysis of the predicted severity tiers
3. **Geographic characteristics**: insights about the spatial distribution (latitude/longitude)
4. **Recommendations**: suggested actions based on the patterns identified

Keep the answer concise and focused on practical insights for emergency managers."#;

const RISK_PROMPT: &str = r#"Based on the seismic prediction data, write a risk assessment.

Risk data:
{summary}

Please provide:
1. **Overall risk level**: Low/Medium/High, justified by the severity distribution
2. **Critical events**: analysis of the Very High severity earthquakes
3. **Preventive measures**: specific actions recommended by the data
4. **Monitoring**: aspects that should be tracked

Focus on practical recommendations for civil protection authorities."#;

const QUALITY_PROMPT: &str = r#"Analyse the quality of this seismic dataset and suggest improvements.

Quality information:
{summary}

Please identify:
1. **Quality problems**: missing data, duplicates, inconsistencies
2. **Impact on analysis**: how the problems affect the predictions
3. **Improvement recommendations**: actions to improve data quality
4. **Priorities**: which problems to fix first

Be specific and technical."#;

// ============================================================================
// Analysis Kinds
// ============================================================================

/// The dataset-level analyses offered on the analysis page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Insights,
    Risk,
    Quality,
}

impl AnalysisKind {
    pub const ALL: [Self; 3] = [Self::Insights, Self::Risk, Self::Quality];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Risk => "risk",
            Self::Quality => "quality",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Insights => INSIGHTS_SYSTEM_PROMPT,
            Self::Risk => RISK_SYSTEM_PROMPT,
            Self::Quality => QUALITY_SYSTEM_PROMPT,
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Insights => 1000,
            Self::Risk => 800,
            Self::Quality => 600,
        }
    }

    pub fn temperature(self) -> f32 {
        match self {
            Self::Risk => 0.2,
            Self::Insights | Self::Quality => 0.3,
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insights" => Ok(Self::Insights),
            "risk" => Ok(Self::Risk),
            "quality" => Ok(Self::Quality),
            other => Err(format!(
                "unknown analysis '{other}' (expected insights, risk or quality)"
            )),
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Prompt explaining one classified record.
pub fn record_prompt(record: &EarthquakeRecord, prediction: &SeverityPrediction) -> ChatRequest {
    let probabilities = prediction
        .breakdown()
        .iter()
        .map(|c| format!("{} {:.1}%", c.severity, c.probability * 100.0))
        .collect::<Vec<_>>()
        .join(", ");
    let location = record
        .location()
        .map(|l| format!(" ({l})"))
        .unwrap_or_default();

    let user = RECORD_PROMPT
        .replace("{magnitude}", &format!("{:.1}", record.magnitude()))
        .replace("{depth}", &format!("{:.1}", record.depth()))
        .replace("{latitude}", &format!("{:.3}", record.latitude()))
        .replace("{longitude}", &format!("{:.3}", record.longitude()))
        .replace("{location}", &location)
        .replace("{severity}", prediction.severity().display_name())
        .replace("{confidence}", &format!("{:.0}", prediction.confidence() * 100.0))
        .replace("{probabilities}", &probabilities);

    ChatRequest {
        system: RECORD_SYSTEM_PROMPT.to_string(),
        user,
        max_tokens: 500,
        temperature: 0.3,
    }
}

fn analysis_request<T: Serialize>(kind: AnalysisKind, template: &str, summary: &T) -> ChatRequest {
    // Summaries are plain structs of numbers and strings
    let json = serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());
    ChatRequest {
        system: kind.system_prompt().to_string(),
        user: template.replace("{summary}", &json),
        max_tokens: kind.max_tokens(),
        temperature: kind.temperature(),
    }
}

pub fn insights_prompt(summary: &DataSummary) -> ChatRequest {
    analysis_request(AnalysisKind::Insights, INSIGHTS_PROMPT, summary)
}

pub fn risk_prompt(summary: &RiskSummary) -> ChatRequest {
    analysis_request(AnalysisKind::Risk, RISK_PROMPT, summary)
}

pub fn quality_prompt(summary: &QualitySummary) -> ChatRequest {
    analysis_request(AnalysisKind::Quality, QUALITY_PROMPT, summary)
}
