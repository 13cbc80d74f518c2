//! Descriptive statistics and correlations over table columns (statrs).

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::dataset::{NumericColumn, Table};

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: NumericColumn,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (0 for a single value)
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Returns `None` for an empty column.
    pub fn from_values(column: NumericColumn, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut data = Data::new(values.to_vec());
        Some(Self {
            column,
            count: values.len(),
            mean: values.mean(),
            std: if values.len() > 1 { values.std_dev() } else { 0.0 },
            min: Statistics::min(values),
            q1: data.lower_quartile(),
            median: data.quantile(0.5),
            q3: data.upper_quartile(),
            max: Statistics::max(values),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Stats for every numeric column, in column order. Empty for an empty table.
pub fn describe(table: &Table) -> Vec<ColumnStats> {
    NumericColumn::ALL
        .iter()
        .filter_map(|&c| ColumnStats::from_values(c, &table.column(c)))
        .collect()
}

/// Pearson correlation coefficient. Zero when either side has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        (numerator / denominator).clamp(-1.0, 1.0)
    }
}

/// Two-tailed p-value for `r` over `n` samples (Student's t, n-2 df).
pub fn p_value_for_r(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    if r.abs() >= 0.9999 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}

/// Pairwise correlations between the numeric columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub r: Vec<Vec<f64>>,
    pub p_values: Vec<Vec<f64>>,
}

pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let columns = NumericColumn::ALL.to_vec();
    let data: Vec<Vec<f64>> = columns.iter().map(|&c| table.column(c)).collect();
    let n = table.len();

    let mut r = vec![vec![0.0; columns.len()]; columns.len()];
    let mut p_values = vec![vec![1.0; columns.len()]; columns.len()];
    for i in 0..columns.len() {
        r[i][i] = 1.0;
        p_values[i][i] = 0.0;
        for j in (i + 1)..columns.len() {
            let coef = pearson(&data[i], &data[j]);
            let p = p_value_for_r(coef, n);
            r[i][j] = coef;
            r[j][i] = coef;
            p_values[i][j] = p;
            p_values[j][i] = p;
        }
    }

    CorrelationMatrix { columns, r, p_values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_csv;

    #[test]
    fn test_describe_basic_column() {
        let stats = ColumnStats::from_values(NumericColumn::Magnitude, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.median - 3.0).abs() < 1e-12);
        assert!((stats.min - 1.0).abs() < 1e-12);
        assert!((stats.max - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.5_f64.sqrt()).abs() < 1e-12);
        assert!(stats.q1 <= stats.median && stats.median <= stats.q3);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let stats = ColumnStats::from_values(NumericColumn::Depth, &[12.0]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert!(ColumnStats::from_values(NumericColumn::Depth, &[]).is_none());
    }

    #[test]
    fn test_pearson_perfect_and_flat() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_p_value_small_samples() {
        assert_eq!(p_value_for_r(0.5, 2), 1.0);
        assert_eq!(p_value_for_r(1.0, 10), 0.0);
        let p = p_value_for_r(0.1, 10);
        assert!(p > 0.5 && p <= 1.0);
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let table = parse_csv(
            "t.csv",
            "magnitude,latitude,longitude,depth\n4,10,-90,5\n5,12,-92,15\n6,11,-95,40\n7,15,-91,60\n",
        )
        .unwrap();
        let m = correlation_matrix(&table);
        assert_eq!(m.columns.len(), 4);
        for i in 0..4 {
            assert_eq!(m.r[i][i], 1.0);
            for j in 0..4 {
                assert_eq!(m.r[i][j], m.r[j][i]);
            }
        }
        // magnitude and depth rise together in this table
        assert!(m.r[0][3] > 0.9);
    }
}
