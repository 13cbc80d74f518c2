//! Record and dataset validation
//!
//! Pure range checks driven by [`ValidationConfig`]. Every violated rule is
//! reported so the page can show the full error list at once.

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::dataset::{NumericColumn, Table};
use crate::types::EarthquakeRecord;

// ============================================================================
// Result Types
// ============================================================================

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    /// Error messages only, in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// First error recorded for `field`, if any.
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid {
            f.write_str("valid")
        } else {
            f.write_str(&self.messages().join("; "))
        }
    }
}

// ============================================================================
// Form Input
// ============================================================================

/// Raw form fields for a single record. Any field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordForm {
    #[serde(default, alias = "magnitud")]
    pub magnitude: Option<f64>,
    #[serde(default, alias = "profundidad")]
    pub depth: Option<f64>,
    #[serde(default, alias = "latitud")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "longitud")]
    pub longitude: Option<f64>,
    #[serde(default, alias = "localidad")]
    pub location: Option<String>,
}

impl RecordForm {
    /// Convert to a record; each absent field becomes a "required" error.
    pub fn into_record(self) -> Result<EarthquakeRecord, ValidationResult> {
        let mut errors = Vec::new();
        let mut require = |value: Option<f64>, field: &str, label: &str| {
            if value.is_none() {
                errors.push(FieldError::new(field, format!("{label} is required")));
            }
            value.unwrap_or_default()
        };

        let magnitude = require(self.magnitude, "magnitude", "Magnitude");
        let depth = require(self.depth, "depth", "Depth");
        let latitude = require(self.latitude, "latitude", "Latitude");
        let longitude = require(self.longitude, "longitude", "Longitude");

        if !errors.is_empty() {
            return Err(ValidationResult::from_errors(errors));
        }

        let record = EarthquakeRecord::new(magnitude, depth, latitude, longitude);
        Ok(match self.location {
            Some(location) => record.with_location(location),
            None => record,
        })
    }
}

// ============================================================================
// Record Rules
// ============================================================================

/// Validate a record against the default bounds.
pub fn validate(record: &EarthquakeRecord) -> ValidationResult {
    validate_with(record, &ValidationConfig::default())
}

/// Validate a record against configured bounds.
pub fn validate_with(record: &EarthquakeRecord, rules: &ValidationConfig) -> ValidationResult {
    let mut errors = Vec::new();

    check_between(
        &mut errors,
        "magnitude",
        "Magnitude",
        record.magnitude(),
        rules.magnitude_min,
        rules.magnitude_max,
    );

    let depth = record.depth();
    if !depth.is_finite() {
        errors.push(FieldError::new("depth", "Depth must be a finite number"));
    } else if depth < rules.depth_min {
        let message = if rules.depth_min == 0.0 {
            format!("Depth must be non-negative (got {depth})")
        } else {
            format!("Depth must be at least {} km (got {depth})", rules.depth_min)
        };
        errors.push(FieldError::new("depth", message));
    }

    check_between(
        &mut errors,
        "latitude",
        "Latitude",
        record.latitude(),
        rules.latitude_min,
        rules.latitude_max,
    );
    check_between(
        &mut errors,
        "longitude",
        "Longitude",
        record.longitude(),
        rules.longitude_min,
        rules.longitude_max,
    );

    ValidationResult::from_errors(errors)
}

fn check_between(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !value.is_finite() {
        errors.push(FieldError::new(field, format!("{label} must be a finite number")));
    } else if value < min || value > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be between {min} and {max} (got {value})"),
        ));
    }
}

// ============================================================================
// Dataset Rules
// ============================================================================

/// Column-level range check over a whole table: one message per column
/// with the number of out-of-range rows.
pub fn validate_table(table: &Table, rules: &ValidationConfig) -> ValidationResult {
    let mut errors = Vec::new();

    for column in NumericColumn::ALL {
        let (min, max) = match column {
            NumericColumn::Magnitude => (rules.magnitude_min, rules.magnitude_max),
            NumericColumn::Latitude => (rules.latitude_min, rules.latitude_max),
            NumericColumn::Longitude => (rules.longitude_min, rules.longitude_max),
            NumericColumn::Depth => (rules.depth_min, f64::INFINITY),
        };
        let offending = table
            .records()
            .iter()
            .map(|r| column.value(r))
            .filter(|v| *v < min || *v > max)
            .count();
        if offending == 0 {
            continue;
        }

        let message = if max.is_infinite() {
            format!("{}: {offending} row(s) below {min}", column.label())
        } else {
            format!("{}: {offending} row(s) outside [{min}, {max}]", column.label())
        };
        errors.push(FieldError::new(column.name(), message));
    }

    ValidationResult::from_errors(errors)
}

/// Reject uploads larger than `max_mb` megabytes.
pub fn validate_upload_size(bytes: usize, max_mb: u64) -> ValidationResult {
    let limit = max_mb.saturating_mul(1024 * 1024);
    if (bytes as u64) <= limit {
        return ValidationResult::ok();
    }
    let size_mb = bytes as f64 / (1024.0 * 1024.0);
    ValidationResult::from_errors(vec![FieldError::new(
        "file",
        format!("File is too large ({size_mb:.1} MB); the maximum is {max_mb} MB"),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_csv;

    #[test]
    fn test_valid_record_passes() {
        let result = validate(&EarthquakeRecord::new(7.5, 10.0, -23.5, -46.6));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_magnitude_out_of_range_names_magnitude() {
        for magnitude in [-0.1, 10.5, 42.0] {
            let result = validate(&EarthquakeRecord::new(magnitude, 10.0, 0.0, 0.0));
            assert!(!result.is_valid);
            let err = result.error_for("magnitude").expect("magnitude error");
            assert!(err.message.contains("Magnitude"));
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(validate(&EarthquakeRecord::new(0.0, 0.0, -90.0, -180.0)).is_valid);
        assert!(validate(&EarthquakeRecord::new(10.0, 700.0, 90.0, 180.0)).is_valid);
    }

    #[test]
    fn test_all_violations_are_reported() {
        let result = validate(&EarthquakeRecord::new(11.0, -5.0, 95.0, -200.0));
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["magnitude", "depth", "latitude", "longitude"]);
        assert!(result.error_for("depth").unwrap().message.contains("non-negative"));
    }

    #[test]
    fn test_non_finite_values_fail() {
        let result = validate(&EarthquakeRecord::new(f64::NAN, f64::INFINITY, 0.0, 0.0));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_configured_bounds_apply() {
        let rules = ValidationConfig {
            magnitude_min: 2.0,
            ..ValidationConfig::default()
        };
        let result = validate_with(&EarthquakeRecord::new(1.5, 1.0, 0.0, 0.0), &rules);
        assert!(result.error_for("magnitude").unwrap().message.contains("between 2 and 10"));
    }

    #[test]
    fn test_form_reports_every_missing_field() {
        let form = RecordForm {
            magnitude: Some(5.0),
            ..RecordForm::default()
        };
        let result = form.into_record().unwrap_err();
        assert_eq!(
            result.messages(),
            vec!["Depth is required", "Latitude is required", "Longitude is required"]
        );
    }

    #[test]
    fn test_form_accepts_source_field_names() {
        let form: RecordForm = serde_json::from_str(
            r#"{"magnitud": 6.1, "profundidad": 20, "latitud": 17.0, "longitud": -99.0, "localidad": "Guerrero"}"#,
        )
        .unwrap();
        let record = form.into_record().unwrap();
        assert!((record.depth() - 20.0).abs() < 1e-12);
        assert_eq!(record.location(), Some("Guerrero"));
    }

    #[test]
    fn test_table_range_check_counts_rows() {
        let table = parse_csv(
            "t.csv",
            "magnitude,latitude,longitude,depth\n5,10,10,5\n12,10,10,-1\n11,10,10,3\n",
        )
        .unwrap();
        let result = validate_table(&table, &ValidationConfig::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.error_for("magnitude").unwrap().message.contains("2 row(s)"));
        assert!(result.error_for("depth").unwrap().message.contains("1 row(s)"));
    }

    #[test]
    fn test_upload_size_limit() {
        assert!(validate_upload_size(1024, 1).is_valid);
        assert!(validate_upload_size(1024 * 1024, 1).is_valid);
        let result = validate_upload_size(3 * 1024 * 1024, 1);
        assert!(!result.is_valid);
        assert!(result.messages()[0].contains("maximum is 1 MB"));
    }
}
