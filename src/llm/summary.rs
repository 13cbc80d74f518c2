//! Structured summaries rendered into the dataset analysis prompts.

use serde::Serialize;
use std::collections::BTreeMap;
use statrs::statistics::Statistics;

use crate::dataset::{NumericColumn, Table};
use crate::types::{severity_counts, PredictedRow, Severity, SeverityCount};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// Overview of a predicted dataset for the insights analysis.
#[derive(Debug, Clone, Serialize)]
pub struct DataSummary {
    pub total_events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude_stats: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_stats: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude_range: Option<Range>,
    /// Predicted tier counts, all four tiers in tier order
    pub severity_distribution: Vec<SeverityCount>,
}

/// Tier counts for the risk assessment. "High risk" is Very High,
/// "medium risk" is High, "low risk" is Medium plus Low.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total_events: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    /// Mean magnitude of the high-risk events (0 when there are none)
    pub avg_magnitude_high_risk: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_magnitude: Option<f64>,
}

/// Structural facts about an uploaded or loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualitySummary {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub data_types: BTreeMap<String, &'static str>,
}

fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    Some(NumericStats {
        min: Statistics::min(values),
        max: Statistics::max(values),
        mean: values.mean(),
        std: if values.len() > 1 { values.std_dev() } else { 0.0 },
    })
}

fn range(values: &[f64]) -> Option<Range> {
    if values.is_empty() {
        return None;
    }
    Some(Range {
        min: Statistics::min(values),
        max: Statistics::max(values),
    })
}

fn column(rows: &[PredictedRow], column: NumericColumn) -> Vec<f64> {
    rows.iter().map(|r| column.value(&r.record)).collect()
}

impl DataSummary {
    pub fn from_predictions(rows: &[PredictedRow]) -> Self {
        Self {
            total_events: rows.len(),
            magnitude_stats: numeric_stats(&column(rows, NumericColumn::Magnitude)),
            depth_stats: numeric_stats(&column(rows, NumericColumn::Depth)),
            latitude_range: range(&column(rows, NumericColumn::Latitude)),
            longitude_range: range(&column(rows, NumericColumn::Longitude)),
            severity_distribution: severity_counts(rows),
        }
    }
}

impl RiskSummary {
    pub fn from_predictions(rows: &[PredictedRow]) -> Self {
        let tier = |s: Severity| rows.iter().filter(move |r| r.prediction.severity() == s);

        let high: Vec<f64> = tier(Severity::VeryHigh).map(|r| r.record.magnitude()).collect();
        let medium = tier(Severity::High).count();
        let low = tier(Severity::Medium).count() + tier(Severity::Low).count();

        Self {
            total_events: rows.len(),
            high_risk_count: high.len(),
            medium_risk_count: medium,
            low_risk_count: low,
            avg_magnitude_high_risk: if high.is_empty() { 0.0 } else { high.as_slice().mean() },
            max_magnitude: rows
                .iter()
                .map(|r| r.record.magnitude())
                .reduce(f64::max),
        }
    }
}

impl QualitySummary {
    pub fn from_table(table: &Table) -> Self {
        let data_types = table
            .headers()
            .iter()
            .map(|h| {
                let kind = if NumericColumn::from_name(h).is_some() {
                    "float64"
                } else if h.eq_ignore_ascii_case("gravedad") || h.eq_ignore_ascii_case("severity") {
                    "category"
                } else {
                    "text"
                };
                (h.clone(), kind)
            })
            .collect();

        Self {
            total_rows: table.len(),
            columns: table.headers().to_vec(),
            missing_values: table.missing_values(),
            duplicate_rows: table.duplicate_rows(),
            data_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_csv;
    use crate::types::{EarthquakeRecord, SeverityPrediction};

    fn row(magnitude: f64, severity: Severity) -> PredictedRow {
        let mut probs = [0.0; Severity::COUNT];
        probs[severity.index()] = 1.0;
        PredictedRow {
            record: EarthquakeRecord::new(magnitude, 10.0, 17.0, -99.0),
            prediction: SeverityPrediction::new(severity, probs),
            observed: None,
        }
    }

    #[test]
    fn test_risk_summary_groups_tiers() {
        let rows = vec![
            row(7.0, Severity::VeryHigh),
            row(8.0, Severity::VeryHigh),
            row(6.0, Severity::High),
            row(5.0, Severity::Medium),
            row(3.0, Severity::Low),
        ];
        let risk = RiskSummary::from_predictions(&rows);
        assert_eq!(risk.total_events, 5);
        assert_eq!(risk.high_risk_count, 2);
        assert_eq!(risk.medium_risk_count, 1);
        assert_eq!(risk.low_risk_count, 2);
        assert!((risk.avg_magnitude_high_risk - 7.5).abs() < 1e-12);
        assert_eq!(risk.max_magnitude, Some(8.0));
    }

    #[test]
    fn test_risk_summary_without_high_risk() {
        let risk = RiskSummary::from_predictions(&[row(3.0, Severity::Low)]);
        assert_eq!(risk.avg_magnitude_high_risk, 0.0);
    }

    #[test]
    fn test_data_summary_lists_all_tiers() {
        let summary = DataSummary::from_predictions(&[row(5.0, Severity::High)]);
        assert_eq!(summary.total_events, 1);
        let tiers: Vec<_> = summary.severity_distribution.iter().map(|c| (c.label, c.count)).collect();
        assert_eq!(tiers, [("Low", 0), ("Medium", 0), ("High", 1), ("Very High", 0)]);
        assert_eq!(summary.magnitude_stats.as_ref().unwrap().std, 0.0);
    }

    #[test]
    fn test_empty_predictions_omit_stats() {
        let summary = DataSummary::from_predictions(&[]);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("magnitude_stats").is_none());
        assert_eq!(json["total_events"], 0);
    }

    #[test]
    fn test_quality_summary_reports_structure() {
        let table = parse_csv(
            "q.csv",
            "Magnitud,Latitud,Longitud,Profundidad,Gravedad,Localidad\n5,1,1,1,Baja,X\n5,1,1,1,Baja,X\n6,2,2,2,,\n",
        )
        .unwrap();
        let quality = QualitySummary::from_table(&table);
        assert_eq!(quality.total_rows, 3);
        assert_eq!(quality.duplicate_rows, 1);
        assert_eq!(quality.missing_values, 2);
        assert_eq!(quality.data_types["Magnitud"], "float64");
        assert_eq!(quality.data_types["Gravedad"], "category");
        assert_eq!(quality.data_types["Localidad"], "text");
    }
}
