//! Gradient-boosted regression trees (squared loss)

use super::tree::{normalize, RegressionTree, TreeParams};
use super::Regressor;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::models::ModelKind;

#[derive(Debug, Clone)]
pub struct BoostedTrees {
    params: TreeParams,
    n_estimators: usize,
    learning_rate: f64,

    /// Starting prediction: the training mean
    init: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedTrees {
    pub fn new(params: TreeParams, n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            params,
            n_estimators,
            learning_rate,
            init: 0.0,
            trees: Vec::new(),
        }
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.init
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict_row(row))
                .sum::<f64>()
    }
}

impl Regressor for BoostedTrees {
    fn kind(&self) -> ModelKind {
        ModelKind::BoostedTrees
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let kind = self.kind();
        self.params.validate(kind)?;
        if self.n_estimators == 0 {
            return Err(AppError::model_fit(kind.name(), "n_estimators must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(AppError::model_fit(
                kind.name(),
                format!("learning_rate must be positive, got {}", self.learning_rate),
            ));
        }
        if y.is_empty() {
            return Err(AppError::model_fit(kind.name(), "no training rows"));
        }

        self.init = y.iter().sum::<f64>() / y.len() as f64;
        self.trees.clear();

        let mut predictions = vec![self.init; y.len()];
        for _ in 0..self.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(t, p)| t - p).collect();
            let mut tree = RegressionTree::new(self.params);
            tree.fit(x, &residuals)?;
            for (p, row) in predictions.iter_mut().zip(x) {
                *p += self.learning_rate * tree.predict_row(row);
            }
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

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
