//! Prediction Regression Tests
//!
//! Fixed records against the shipped model artifact. A change in any of
//! these labels means the artifact or the inference path changed.

use quake_grade::model::{predictions_to_csv, Predictor, SeverityModel};
use quake_grade::validation::validate;
use quake_grade::{load_dataset, EarthquakeRecord, ModelInferenceError, Severity};

fn shipped_predictor() -> Predictor {
    Predictor::load("model/severity_model.json").unwrap()
}

#[test]
fn reference_record_is_very_high() {
    let record = EarthquakeRecord::new(7.5, 10.0, -23.5, -46.6);
    assert!(validate(&record).is_valid);

    let prediction = shipped_predictor().predict(&record).unwrap();
    assert_eq!(prediction.severity(), Severity::VeryHigh);
    assert!(prediction.confidence() > 0.9);
}

#[test]
fn fixed_records_keep_their_labels() {
    let predictor = shipped_predictor();
    let cases = [
        ((3.0, 50.0, 17.0, -98.0), Severity::Low),
        ((5.0, 30.0, 17.0, -98.0), Severity::Medium),
        ((6.0, 40.0, 17.0, -98.0), Severity::High),
        ((4.2, 12.0, 16.0, -95.0), Severity::Low),
    ];
    for ((magnitude, depth, lat, lon), expected) in cases {
        let record = EarthquakeRecord::new(magnitude, depth, lat, lon);
        let prediction = predictor.predict(&record).unwrap();
        assert_eq!(prediction.severity(), expected, "M{magnitude} at {depth} km");
    }
}

#[test]
fn probabilities_sum_to_one_across_dataset() {
    let predictor = shipped_predictor();
    let table = load_dataset("data/earthquakes.csv").unwrap();
    let rows = predictor.predict_table(&table).unwrap();
    assert_eq!(rows.len(), table.len());

    for row in &rows {
        let probs = row.prediction.probabilities();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        // The predicted tier is the most probable one
        let best = probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(row.prediction.confidence(), best);
    }
}

#[test]
fn predictions_are_deterministic() {
    let predictor = shipped_predictor();
    let record = EarthquakeRecord::new(5.8, 22.0, 19.4, -99.1);
    let first = predictor.predict(&record).unwrap();
    for _ in 0..10 {
        assert_eq!(predictor.predict(&record).unwrap(), first);
    }
}

#[test]
fn batch_csv_uses_dataset_labels() {
    let predictor = shipped_predictor();
    let table = load_dataset("data/earthquakes.csv").unwrap();
    let rows = predictor.predict_table(&table).unwrap();
    let csv = predictions_to_csv(&rows);

    let labels = ["Baja", "Media", "Alta", "Muy Alta"];
    for line in csv.lines().skip(1) {
        let fields: Vec<&str> = line.split(',').collect();
        let label = fields[fields.len() - 2];
        assert!(labels.contains(&label), "unexpected label {label}");
    }
}

struct WrongWidth;

impl SeverityModel for WrongWidth {
    fn predict(&self, _features: &[f64]) -> Result<(usize, Vec<f64>), ModelInferenceError> {
        Ok((0, vec![1.0]))
    }

    fn n_features(&self) -> usize {
        3
    }
}

#[test]
fn model_with_wrong_feature_count_is_rejected() {
    let err = Predictor::with_model(Box::new(WrongWidth), "test").unwrap_err();
    assert!(matches!(err, ModelInferenceError::ShapeMismatch { expected: 4, found: 3 }));
}

#[test]
fn missing_artifact_is_reported() {
    let err = Predictor::load("model/missing.json").unwrap_err();
    assert!(matches!(err, ModelInferenceError::ArtifactMissing { .. }));
}
