//! System-wide default constants.
//!
//! Centralises magic numbers used by the config defaults and the pipeline.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// HTTP bind address when neither config nor CLI set one.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Data
// ============================================================================

/// Base dataset loaded at startup.
pub const DATASET_PATH: &str = "data/earthquakes.csv";

/// Largest accepted CSV upload (megabytes).
pub const MAX_UPLOAD_MB: u64 = 100;

/// Rows returned in the dataset preview.
pub const PREVIEW_ROWS: usize = 10;

/// Largest random dataset a single request may ask for.
pub const MAX_RANDOM_ROWS: usize = 100_000;

// ============================================================================
// Model
// ============================================================================

/// Serialized classifier artifact loaded at startup.
pub const MODEL_PATH: &str = "model/severity_model.json";

/// Allowed deviation of the model's probability vector sum from 1.0.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

// ============================================================================
// LLM
// ============================================================================

/// OpenAI-compatible API base URL.
pub const LLM_ENDPOINT: &str = "https://api.openai.com/v1";

/// Chat model used for narrative insights.
pub const LLM_MODEL: &str = "gpt-4o-mini";

/// Environment variable holding the provider credential.
pub const LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Upper bound on a single LLM call (seconds).
pub const LLM_TIMEOUT_SECS: u64 = 20;

/// Lifetime of a cached dataset analysis (seconds). 1 800 = 30 minutes.
pub const INSIGHT_CACHE_TTL_SECS: u64 = 1_800;

/// Maximum number of cached dataset analyses.
pub const INSIGHT_CACHE_MAX_ENTRIES: usize = 50;

// ============================================================================
// Charts
// ============================================================================

/// Initial zoom level of the severity map.
pub const MAP_ZOOM: u8 = 4;

/// Base map style name handed to the page.
pub const MAP_STYLE: &str = "carto-positron";

/// Histogram bin count.
pub const HISTOGRAM_BINS: usize = 20;

/// File name offered for the batch prediction download.
pub const DOWNLOAD_FILENAME: &str = "quake_predictions.csv";
