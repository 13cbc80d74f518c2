//! Chart specifications
//!
//! Pure transformations from tables and predictions into serializable chart
//! specs. The service never draws anything itself; the bundled page turns
//! each [`ChartSpec`] into a plot. Builders only fail on input they cannot
//! describe (empty data, non-finite values, bad parameters).

pub mod stats;

pub use stats::{correlation_matrix, describe, ColumnStats, CorrelationMatrix};

use serde::Serialize;

use crate::config::ChartConfig;
use crate::dataset::{NumericColumn, Table};
use crate::types::{severity_counts, PredictedRow, Severity, SeverityPrediction};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("No data to plot for {0}")]
    EmptyData(String),

    #[error("{chart} needs at least {needed} rows, got {found}")]
    InsufficientData {
        chart: &'static str,
        needed: usize,
        found: usize,
    },

    #[error("Non-finite value in {0}")]
    NonFinite(String),

    #[error("Invalid chart parameter: {0}")]
    InvalidParameter(String),
}

// ============================================================================
// Chart Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    SeverityMap(MapChart),
    Bar(BarChart),
    Histogram(HistogramChart),
    BoxPlot(BoxPlotChart),
    Heatmap(HeatmapChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            Self::SeverityMap(c) => &c.title,
            Self::Bar(c) => &c.title,
            Self::Histogram(c) => &c.title,
            Self::BoxPlot(c) => &c.title,
            Self::Heatmap(c) => &c.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub magnitude: f64,
    pub depth: f64,
    pub severity: Severity,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapChart {
    pub title: String,
    pub center: GeoPoint,
    pub zoom: u8,
    pub style: String,
    pub points: Vec<MapPoint>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramChart {
    pub title: String,
    pub column: NumericColumn,
    pub x_label: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxPlotChart {
    pub title: String,
    pub column: NumericColumn,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Tukey whiskers: furthest values within 1.5 IQR of the box
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub p_values: Vec<Vec<f64>>,
}

// ============================================================================
// Builders
// ============================================================================

/// Geographic scatter of classified events, coloured by tier.
pub fn build_map(rows: &[PredictedRow], config: &ChartConfig) -> Result<ChartSpec, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyData("severity map".to_string()));
    }

    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let r = &row.record;
        if !(r.latitude().is_finite() && r.longitude().is_finite() && r.magnitude().is_finite()) {
            return Err(RenderError::NonFinite("severity map coordinates".to_string()));
        }
        let severity = row.prediction.severity();
        points.push(MapPoint {
            lat: r.latitude(),
            lon: r.longitude(),
            magnitude: r.magnitude(),
            depth: r.depth(),
            severity,
            color: severity.color(),
            label: r.location().map(str::to_string),
        });
    }

    let n = points.len() as f64;
    let center = GeoPoint {
        lat: points.iter().map(|p| p.lat).sum::<f64>() / n,
        lon: points.iter().map(|p| p.lon).sum::<f64>() / n,
    };

    Ok(ChartSpec::SeverityMap(MapChart {
        title: "Earthquake severity map".to_string(),
        center,
        zoom: config.map_zoom,
        style: config.map_style.clone(),
        points,
        legend: legend(),
    }))
}

fn legend() -> Vec<LegendEntry> {
    Severity::ALL
        .iter()
        .map(|s| LegendEntry {
            label: s.display_name(),
            color: s.color(),
        })
        .collect()
}

/// Bar chart of predicted tiers, always listing all four in tier order.
pub fn build_distribution_chart(rows: &[PredictedRow]) -> Result<ChartSpec, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyData("severity distribution".to_string()));
    }

    let bars = severity_counts(rows)
        .into_iter()
        .map(|c| Bar {
            label: c.label.to_string(),
            value: c.count as f64,
            color: Some(c.severity.color()),
        })
        .collect();

    Ok(ChartSpec::Bar(BarChart {
        title: "Predicted severity distribution".to_string(),
        x_label: "Severity".to_string(),
        y_label: "Events".to_string(),
        bars,
    }))
}

/// Per-class probabilities for a single prediction.
pub fn build_probability_chart(prediction: &SeverityPrediction) -> Result<ChartSpec, RenderError> {
    let mut bars = Vec::with_capacity(Severity::COUNT);
    for entry in prediction.breakdown() {
        if !entry.probability.is_finite() {
            return Err(RenderError::NonFinite("class probabilities".to_string()));
        }
        bars.push(Bar {
            label: entry.severity.display_name().to_string(),
            value: entry.probability,
            color: Some(entry.severity.color()),
        });
    }

    Ok(ChartSpec::Bar(BarChart {
        title: "Probability by severity tier".to_string(),
        x_label: "Severity".to_string(),
        y_label: "Probability".to_string(),
        bars,
    }))
}

fn finite_column(table: &Table, column: NumericColumn) -> Result<Vec<f64>, RenderError> {
    let values = table.column(column);
    if values.is_empty() {
        return Err(RenderError::EmptyData(column.label().to_string()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RenderError::NonFinite(column.label().to_string()));
    }
    Ok(values)
}

/// Equal-width histogram of one column.
pub fn build_histogram(table: &Table, column: NumericColumn, bins: usize) -> Result<ChartSpec, RenderError> {
    if bins == 0 {
        return Err(RenderError::InvalidParameter("histogram bins must be > 0".to_string()));
    }
    let values = finite_column(table, column)?;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bins = if max > min {
        let width = (max - min) / bins as f64;
        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                start: min + width * i as f64,
                end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
                count: 0,
            })
            .collect();
        for v in &values {
            // The maximum lands in the last (closed) bin
            let idx = (((v - min) / width) as usize).min(bins - 1);
            out[idx].count += 1;
        }
        out
    } else {
        vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }]
    };

    Ok(ChartSpec::Histogram(HistogramChart {
        title: format!("Distribution of {}", column.label()),
        column,
        x_label: column.label().to_string(),
        bins,
    }))
}

/// Box plot with Tukey whiskers for one column.
pub fn build_boxplot(table: &Table, column: NumericColumn) -> Result<ChartSpec, RenderError> {
    let values = finite_column(table, column)?;
    let stats = ColumnStats::from_values(column, &values)
        .ok_or_else(|| RenderError::EmptyData(column.label().to_string()))?;

    let fence_low = stats.q1 - 1.5 * stats.iqr();
    let fence_high = stats.q3 + 1.5 * stats.iqr();
    let inside = values.iter().copied().filter(|v| *v >= fence_low && *v <= fence_high);
    let whisker_low = inside.clone().fold(f64::INFINITY, f64::min);
    let whisker_high = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| *v < fence_low || *v > fence_high)
        .collect();

    Ok(ChartSpec::BoxPlot(BoxPlotChart {
        title: format!("{} spread", column.label()),
        column,
        min: stats.min,
        q1: stats.q1,
        median: stats.median,
        q3: stats.q3,
        max: stats.max,
        whisker_low,
        whisker_high,
        outliers,
    }))
}

/// Pearson correlation heat map over the numeric columns.
pub fn build_correlation_heatmap(table: &Table) -> Result<ChartSpec, RenderError> {
    if table.len() < 2 {
        return Err(RenderError::InsufficientData {
            chart: "correlation heat map",
            needed: 2,
            found: table.len(),
        });
    }
    for column in NumericColumn::ALL {
        finite_column(table, column)?;
    }

    let matrix = correlation_matrix(table);
    Ok(ChartSpec::Heatmap(HeatmapChart {
        title: "Correlation matrix".to_string(),
        labels: matrix.columns.iter().map(|c| c.label().to_string()).collect(),
        values: matrix.r,
        p_values: matrix.p_values,
    }))
}
