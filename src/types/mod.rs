//! Shared data structures for the severity pipeline
//!
//! - `EarthquakeRecord`: one event (user form or dataset row)
//! - `Severity`: the four ordinal tiers
//! - `SeverityPrediction` / `PredictedRow`: classifier outputs

mod prediction;
mod record;
mod severity;

pub use prediction::*;
pub use record::*;
pub use severity::*;
