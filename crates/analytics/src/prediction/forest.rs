//! Bootstrap-aggregated regression trees

use super::tree::{normalize, RegressionTree, TreeParams};
use super::Regressor;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::models::ModelKind;

#[derive(Debug, Clone)]
pub struct BaggedTrees {
    params: TreeParams,
    n_estimators: usize,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl BaggedTrees {
    pub fn new(params: TreeParams, n_estimators: usize, seed: u64) -> Self {
        Self {
            params,
            n_estimators,
            seed,
            trees: Vec::new(),
        }
    }
}

impl Regressor for BaggedTrees {
    fn kind(&self) -> ModelKind {
        ModelKind::BaggedTrees
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let kind = self.kind();
        self.params.validate(kind)?;
        if self.n_estimators == 0 {
            return Err(AppError::model_fit(kind.name(), "n_estimators must be at least 1"));
        }
        if y.is_empty() {
            return Err(AppError::model_fit(kind.name(), "no training rows"));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n = y.len();
        self.trees.clear();

        for _ in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut tree = RegressionTree::new(self.params);
            tree.fit_sample(x, y, &sample)?;
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        if self.trees.is_empty() {
            return vec![0.0; x.len()];
        }
        let count = self.trees.len() as f64;
        x.iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / count)
            .collect()
    }

    /// Mean of the per-tree normalized importances, renormalized
    fn feature_importances(&self) -> Vec<f64> {
        let width = self.trees.first().map_or(0, |t| t.raw_importances().len());
        let mut total = vec![0.0; width];
        for tree in &self.trees {
            for (sum, value) in total.iter_mut().zip(tree.feature_importances()) {
                *sum += value;
            }
        }
        normalize(&total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = (0..20).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y = (0..20).map(|i| 2.0 * i as f64).collect();
        (x, y)
    }

    #[test]
    fn test_bagging_is_reproducible() {
        let (x, y) = data();
        let mut a = BaggedTrees::new(TreeParams::default(), 10, 42);
        let mut b = BaggedTrees::new(TreeParams::default(), 10, 42);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x), b.predict(&x));
    }

    #[test]
    fn test_bagging_tracks_trend() {
        let (x, y) = data();
        let mut model = BaggedTrees::new(TreeParams::default(), 25, 7);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&[vec![1.0, 1.0], vec![18.0, 0.0]]);
        assert!(predictions[0] < predictions[1]);

        let importances = model.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_zero_estimators_is_fit_error() {
        let (x, y) = data();
        let mut model = BaggedTrees::new(TreeParams::default(), 0, 42);
        assert!(matches!(model.fit(&x, &y), Err(AppError::ModelFit { .. })));
    }
}
