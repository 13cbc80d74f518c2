//! Request Pipelines
//!
//! ## Flows
//!
//! ```text
//! assess:   form -> record -> validate -> predict -> charts -> insight?
//! analyze:  table -> range warnings -> descriptive -> predictive
//! ```
//!
//! Both flows run entirely inside the request that triggered them. The only
//! shared state is [`AppContext`], built once before the server binds and
//! immutable afterwards apart from the insight cache.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

mod analysis;
mod assessment;

pub use analysis::{analyze_dataset, DatasetAnalysis, DescriptiveSection, PredictiveSection};
pub use assessment::{assess_record, Assessment, AssessmentError, InsightNotice};

use crate::config::AppConfig;
use crate::dataset::{load_dataset, DataLoadError, Table};
use crate::llm::InsightService;
use crate::model::{ModelInferenceError, Predictor};

/// Failure to build the process-wide context. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load base dataset: {0}")]
    Dataset(#[from] DataLoadError),

    #[error("failed to load severity model: {0}")]
    Model(#[from] ModelInferenceError),
}

// ============================================================================
// Application Context
// ============================================================================

/// Everything a request needs, shared as `Arc<AppContext>` through axum state.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    /// Base dataset loaded at startup
    pub base: Arc<Table>,
    pub predictor: Predictor,
    pub insights: InsightService,
    pub started: Instant,
}

impl AppContext {
    pub fn new(config: AppConfig, base: Table, predictor: Predictor, insights: InsightService) -> Self {
        Self {
            config,
            base: Arc::new(base),
            predictor,
            insights,
            started: Instant::now(),
        }
    }

    /// Load the dataset and model named by `config`.
    ///
    /// `dataset` and `model` override the configured paths.
    pub fn load(
        config: AppConfig,
        dataset: Option<&Path>,
        model: Option<&Path>,
        insights: InsightService,
    ) -> Result<Self, StartupError> {
        let dataset_path = dataset.unwrap_or(&config.data.dataset_path).to_path_buf();
        let model_path = model.unwrap_or(&config.model.artifact_path).to_path_buf();

        let base = load_dataset(&dataset_path)?;
        let predictor = Predictor::load(&model_path)?;

        info!(
            rows = base.len(),
            model = predictor.version(),
            insights = insights.is_available(),
            "✓ Application context ready"
        );
        Ok(Self::new(config, base, predictor, insights))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
