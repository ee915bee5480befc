//! Column standardization

use serde::{Deserialize, Serialize};

/// Below this a column is treated as constant
const MIN_STD: f64 = 1e-12;

/// Per-column z-score transform with population statistics.
///
/// Fitted once and then applied unchanged, so training and evaluation rows
/// share the same scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Standardizer {
    /// Fit on a row-major matrix; an empty matrix gives a zero-width scaler
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        if rows.is_empty() {
            return Self {
                means: Vec::new(),
                stds: Vec::new(),
            };
        }
        let n = rows.len() as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for ((std, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                *std += (value - mean).powi(2);
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
        }

        Self { means, stds }
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Standardize one row; constant columns map to 0
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(value, (mean, std))| {
                if *std < MIN_STD {
                    0.0
                } else {
                    (value - mean) / std
                }
            })
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn fit_transform(rows: &[Vec<f64>]) -> (Self, Vec<Vec<f64>>) {
        let scaler = Self::fit(rows);
        let scaled = scaler.transform(rows);
        (scaler, scaled)
    }
}
