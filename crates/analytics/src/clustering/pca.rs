//! Two-component principal component projection
//!
//! Power iteration with deflation on the sample covariance. Each component
//! is sign-normalized so its largest-magnitude loading is positive.

const MAX_ITERATIONS: usize = 1000;
const TOLERANCE: f64 = 1e-10;

/// Fitted components and explained variances
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    pub components: Vec<Vec<f64>>,
    pub explained_variance: Vec<f64>,
}

impl Pca {
    /// Fit `n_components` principal axes of already centered or
    /// standardized rows
    pub fn fit(x: &[Vec<f64>], n_components: usize) -> Self {
        let width = x.first().map_or(0, Vec::len);
        if x.len() < 2 || width == 0 {
            return Self {
                components: vec![vec![0.0; width]; n_components],
                explained_variance: vec![0.0; n_components],
            };
        }

        let mut covariance = covariance(x);
        let mut components = Vec::with_capacity(n_components);
        let mut explained_variance = Vec::with_capacity(n_components);

        for _ in 0..n_components {
            let (eigenvalue, vector) = dominant_eigenpair(&covariance);
            for i in 0..width {
                for j in 0..width {
                    covariance[i][j] -= eigenvalue * vector[i] * vector[j];
                }
            }
            explained_variance.push(eigenvalue);
            components.push(vector);
        }

        Self {
            components,
            explained_variance,
        }
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.iter()
            .map(|row| {
                self.components
                    .iter()
                    .map(|c| c.iter().zip(row).map(|(a, b)| a * b).sum())
                    .collect()
            })
            .collect()
    }
}

fn covariance(x: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = x.len() as f64;
    let width = x[0].len();

    let means: Vec<f64> = (0..width)
        .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
        .collect();

    let mut cov = vec![vec![0.0; width]; width];
    for row in x {
        for i in 0..width {
            let di = row[i] - means[i];
            for j in i..width {
                cov[i][j] += di * (row[j] - means[j]);
            }
        }
    }
    for i in 0..width {
        for j in i..width {
            cov[i][j] /= n - 1.0;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Largest eigenvalue and its unit eigenvector; a zero matrix yields a
/// zero vector
fn dominant_eigenpair(matrix: &[Vec<f64>]) -> (f64, Vec<f64>) {
    let width = matrix.len();
    // Uneven start avoids being orthogonal to a symmetric eigenvector
    let mut v: Vec<f64> = (0..width).map(|i| 1.0 + i as f64 / width as f64).collect();
    normalize(&mut v);

    for _ in 0..MAX_ITERATIONS {
        let mut next: Vec<f64> = matrix
            .iter()
            .map(|row| row.iter().zip(&v).map(|(a, b)| a * b).sum())
            .collect();
        if normalize(&mut next) < TOLERANCE {
            return (0.0, vec![0.0; width]);
        }
        let change: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
        v = next;
        if change < TOLERANCE {
            break;
        }
    }

    let eigenvalue: f64 = matrix
        .iter()
        .zip(&v)
        .map(|(row, vi)| vi * row.iter().zip(&v).map(|(a, b)| a * b).sum::<f64>())
        .sum();

    if eigenvalue <= TOLERANCE {
        return (0.0, vec![0.0; width]);
    }

    fix_sign(&mut v);
    (eigenvalue, v)
}

/// Scale to unit length, returning the original norm
fn normalize(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

fn fix_sign(v: &mut [f64]) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        for x in v.iter_mut() {
            *x = -*x;
        }
    }
}
