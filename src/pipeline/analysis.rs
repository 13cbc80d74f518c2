//! Dataset flow: range warnings, descriptive statistics, batch predictions.

use serde::Serialize;
use tracing::{info, warn};

use super::AppContext;
use crate::charts::{
    build_boxplot, build_correlation_heatmap, build_distribution_chart, build_histogram, build_map,
    describe, ChartSpec, ColumnStats, RenderError,
};
use crate::dataset::{NumericColumn, Table, TableRow};
use crate::types::{severity_counts, PredictedRow, SeverityCount};
use crate::validation::validate_table;

/// Everything the analysis page shows for one table.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetAnalysis {
    pub source: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub missing_values: usize,
    pub duplicate_rows: usize,
    pub preview: Vec<TableRow>,
    /// Out-of-range values and omitted charts
    pub warnings: Vec<String>,
    pub descriptive: DescriptiveSection,
    pub predictive: PredictiveSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveSection {
    pub stats: Vec<ColumnStats>,
    /// Histograms and box plots per numeric column, then the heat map
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictiveSection {
    Ready {
        counts: Vec<SeverityCount>,
        /// Share of rows whose label in the data matches the prediction
        #[serde(skip_serializing_if = "Option::is_none")]
        agreement: Option<f64>,
        charts: Vec<ChartSpec>,
    },
    Unavailable {
        message: String,
    },
}

/// Run the dataset flow over `table`.
///
/// Never fails as a whole: chart failures become warnings, and an inference
/// failure turns only the predictive section into a message.
pub fn analyze_dataset(ctx: &AppContext, table: &Table) -> DatasetAnalysis {
    let mut warnings = validate_table(table, &ctx.config.validation).messages();

    let descriptive = descriptive_section(ctx, table, &mut warnings);
    let predictive = match ctx.predictor.predict_table(table) {
        Ok(rows) => predictive_section(ctx, &rows, &mut warnings),
        Err(e) => {
            warn!(source = table.source(), error = %e, "Batch prediction failed");
            PredictiveSection::Unavailable {
                message: format!("Prediction unavailable: {e}"),
            }
        }
    };

    info!(
        source = table.source(),
        rows = table.len(),
        warnings = warnings.len(),
        "📊 Dataset analyzed"
    );

    DatasetAnalysis {
        source: table.source().to_string(),
        rows: table.len(),
        columns: table.headers().to_vec(),
        missing_values: table.missing_values(),
        duplicate_rows: table.duplicate_rows(),
        preview: table.preview(ctx.config.data.preview_rows),
        warnings,
        descriptive,
        predictive,
    }
}

fn push_chart(charts: &mut Vec<ChartSpec>, warnings: &mut Vec<String>, chart: Result<ChartSpec, RenderError>) {
    match chart {
        Ok(spec) => charts.push(spec),
        Err(e) => {
            warn!(error = %e, "Chart omitted");
            warnings.push(format!("Chart omitted: {e}"));
        }
    }
}

fn descriptive_section(ctx: &AppContext, table: &Table, warnings: &mut Vec<String>) -> DescriptiveSection {
    let mut charts = Vec::new();
    for column in NumericColumn::ALL {
        push_chart(
            &mut charts,
            warnings,
            build_histogram(table, column, ctx.config.charts.histogram_bins),
        );
    }
    for column in NumericColumn::ALL {
        push_chart(&mut charts, warnings, build_boxplot(table, column));
    }
    push_chart(&mut charts, warnings, build_correlation_heatmap(table));

    DescriptiveSection {
        stats: describe(table),
        charts,
    }
}

fn predictive_section(ctx: &AppContext, rows: &[PredictedRow], warnings: &mut Vec<String>) -> PredictiveSection {
    let mut charts = Vec::new();
    push_chart(&mut charts, warnings, build_distribution_chart(rows));
    push_chart(&mut charts, warnings, build_map(rows, &ctx.config.charts));

    PredictiveSection::Ready {
        counts: severity_counts(rows),
        agreement: agreement(rows),
        charts,
    }
}

fn agreement(rows: &[PredictedRow]) -> Option<f64> {
    let labelled: Vec<_> = rows
        .iter()
        .filter_map(|r| r.observed.map(|o| o == r.prediction.severity()))
        .collect();
    if labelled.is_empty() {
        return None;
    }
    let matches = labelled.iter().filter(|&&m| m).count();
    Some(matches as f64 / labelled.len() as f64)
}
