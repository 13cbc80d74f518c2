//! Earthquake record: the single input entity of every flow.

use serde::Serialize;

/// Number of model input features.
pub const NUM_FEATURES: usize = 4;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = ["magnitude", "latitude", "longitude", "depth"];

/// One earthquake event: magnitude, hypocentre depth and epicentre position.
///
/// Construction does not validate; run [`crate::validation::validate`]
/// before feeding a record to the model. Fields are read-only after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeRecord {
    magnitude: f64,
    /// Depth in km
    depth: f64,
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl EarthquakeRecord {
    pub fn new(magnitude: f64, depth: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            magnitude,
            depth,
            latitude,
            longitude,
            location: None,
        }
    }

    /// Attach a free-text location label (ignored by the model).
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Feature vector in [`FEATURE_NAMES`] order.
    pub fn features(&self) -> [f64; NUM_FEATURES] {
        [self.magnitude, self.latitude, self.longitude, self.depth]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_follow_model_order() {
        let record = EarthquakeRecord::new(5.2, 10.5, 19.42, -99.13);
        assert_eq!(record.features(), [5.2, 19.42, -99.13, 10.5]);
    }

    #[test]
    fn test_blank_location_is_dropped() {
        let record = EarthquakeRecord::new(5.0, 1.0, 0.0, 0.0).with_location("   ");
        assert!(record.location().is_none());

        let record = EarthquakeRecord::new(5.0, 1.0, 0.0, 0.0).with_location("Oaxaca");
        assert_eq!(record.location(), Some("Oaxaca"));
    }
}
