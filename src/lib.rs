//! Quake-Grade: Seismic Severity Classification
//!
//! Classifies earthquake records into four severity tiers with a trained
//! classifier and serves the results over HTTP.
//!
//! ## Architecture
//!
//! - **Dataset**: CSV loading, column mapping, random dataset generation
//! - **Validation**: range rules for single records and whole tables
//! - **Model**: JSON classifier artifact behind the `SeverityModel` trait
//! - **Charts**: serializable chart specs and descriptive statistics
//! - **LLM Module**: optional narrative insights from a chat-completion API
//! - **Pipeline**: the single-record and dataset flows over a shared context
//! - **API**: axum router, JSON envelope and the embedded form page

pub mod api;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod types;
pub mod validation;

// Re-export configuration
pub use config::AppConfig;

// Re-export commonly used types
pub use types::{ClassProbability, EarthquakeRecord, PredictedRow, Severity, SeverityPrediction};

// Re-export the main entry points
pub use api::create_app;
pub use dataset::{load_dataset, parse_csv, DataLoadError, Table};
pub use llm::{InsightService, InsightUnavailable};
pub use model::{ModelInferenceError, Predictor};
pub use pipeline::{analyze_dataset, assess_record, AppContext};
pub use validation::{validate, RecordForm, ValidationResult};
