//! Synthetic datasets that mimic the base table's statistics.
//!
//! Each numeric column is drawn from a normal distribution with the base
//! column's mean and sample standard deviation, then clipped to the base
//! column's observed range. Severity labels are resampled from the base
//! table's empirical label distribution.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use statrs::statistics::Statistics;

use super::{NumericColumn, Table};
use crate::types::{EarthquakeRecord, Severity};

struct ColumnSampler {
    normal: Option<Normal<f64>>,
    mean: f64,
    min: f64,
    max: f64,
}

impl ColumnSampler {
    fn fit(values: &[f64]) -> Self {
        let mean = values.mean();
        let std = if values.len() > 1 { values.std_dev() } else { 0.0 };
        let min = Statistics::min(values);
        let max = Statistics::max(values);
        // Zero spread (or a single row) degenerates to the mean
        let normal = if std.is_finite() && std > 0.0 {
            Normal::new(mean, std).ok()
        } else {
            None
        };
        Self { normal, mean, min, max }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let value = match &self.normal {
            Some(normal) => normal.sample(rng),
            None => self.mean,
        };
        value.clamp(self.min, self.max)
    }
}

/// Generate `n` synthetic rows (base size when `None`) from `base`.
///
/// With a `seed` the output is reproducible.
pub fn generate_random(base: &Table, n: Option<usize>, seed: Option<u64>) -> Table {
    if base.is_empty() {
        return Table::from_records("random", Vec::new(), base.has_severity().then(Vec::new));
    }

    let n = n.unwrap_or(base.len());
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let samplers: Vec<ColumnSampler> = NumericColumn::ALL
        .iter()
        .map(|&c| ColumnSampler::fit(&base.column(c)))
        .collect();

    let labels: Vec<Severity> = base.observed().iter().flatten().copied().collect();

    let mut records = Vec::with_capacity(n);
    let mut observed = Vec::with_capacity(n);
    for _ in 0..n {
        let v: Vec<f64> = samplers.iter().map(|s| s.sample(&mut rng)).collect();
        // NumericColumn::ALL order: magnitude, latitude, longitude, depth
        records.push(EarthquakeRecord::new(v[0], v[3], v[1], v[2]));
        observed.push(labels.choose(&mut rng).copied());
    }

    let observed = base.has_severity().then_some(observed);
    tracing::debug!(rows = n, seeded = seed.is_some(), "Generated random dataset");
    Table::from_records("random", records, observed)
}
