//! Citation prediction
//!
//! Trains several regression models to predict an author's total citations
//! from the remaining features and selects the one with the best held-out
//! R² score:
//! - Single regression tree
//! - Bagged trees (bootstrap aggregation)
//! - Gradient-boosted trees

mod boosting;
mod forest;
mod tree;

pub use boosting::BoostedTrees;
pub use forest::BaggedTrees;
pub use tree::{RegressionTree, TreeParams};

use crate::features::feature_matrix;
use crate::scaler::Standardizer;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scholarnet_common::config::PredictionConfig;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::metrics::record_model_fit;
use scholarnet_common::models::{
    FeatureColumn, FeatureImportance, FeatureVector, ModelFailure, ModelKind, PredictionResult,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Column being predicted
pub const TARGET: FeatureColumn = FeatureColumn::TotalCitations;

/// Fewer rows than this cannot be split into train and evaluation subsets
const MIN_ROWS: usize = 3;

/// A trainable regression model
pub trait Regressor {
    fn kind(&self) -> ModelKind;

    /// Fit on row-major features; invalid hyper-parameters are fit errors
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64>;

    /// One value per input column, summing to 1 (or all 0 without splits)
    fn feature_importances(&self) -> Vec<f64>;
}

/// Hyper-parameters for every model family
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub models: Vec<ModelKind>,
    pub n_estimators: usize,
    pub tree: TreeParams,
    pub boosting_max_depth: usize,
    pub learning_rate: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::from(&PredictionConfig::default())
    }
}

impl From<&PredictionConfig> for PredictorConfig {
    fn from(config: &PredictionConfig) -> Self {
        Self {
            test_fraction: config.test_fraction,
            seed: config.seed,
            models: config.models.clone(),
            n_estimators: config.n_estimators,
            tree: TreeParams {
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
            },
            boosting_max_depth: config.boosting_max_depth,
            learning_rate: config.learning_rate,
        }
    }
}

impl PredictorConfig {
    fn build(&self, kind: ModelKind) -> Box<dyn Regressor> {
        match kind {
            ModelKind::SingleTree => Box::new(RegressionTree::new(self.tree)),
            ModelKind::BaggedTrees => {
                Box::new(BaggedTrees::new(self.tree, self.n_estimators, self.seed))
            }
            ModelKind::BoostedTrees => Box::new(BoostedTrees::new(
                TreeParams {
                    max_depth: self.boosting_max_depth,
                    ..self.tree
                },
                self.n_estimators,
                self.learning_rate,
            )),
        }
    }
}

/// Model comparison outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Successful models in configured order
    pub results: Vec<PredictionResult>,

    /// Models that failed to fit or evaluate
    pub failures: Vec<ModelFailure>,

    /// Highest R²; ties go to the earlier model kind
    pub best_model: Option<ModelKind>,

    /// Importance ranking of the best model
    pub feature_importance: Vec<FeatureImportance>,

    /// Input columns, in matrix order
    pub feature_names: Vec<String>,

    pub train_size: usize,
    pub test_size: usize,
}

impl PredictionReport {
    pub fn best(&self) -> Option<&PredictionResult> {
        let best = self.best_model?;
        self.results.iter().find(|r| r.model == best)
    }
}

/// Held-out row indices for the given seed; `None` when the data is too
/// small to evaluate on
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Option<(Vec<usize>, Vec<usize>)> {
    if n < MIN_ROWS {
        return None;
    }

    let test_size = (n as f64 * test_fraction).ceil() as usize;
    if test_size < 2 || test_size >= n {
        return None;
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let train = indices.split_off(test_size);
    Some((train, indices))
}

/// Coefficient of determination; a constant target scores 1 only when
/// predicted exactly
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual.iter().zip(predicted).map(|(y, p)| (y - p).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let mse = actual.iter().zip(predicted).map(|(y, p)| (y - p).powi(2)).sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

/// Importances ranked descending, ties in column order
fn ranked_importance(columns: &[FeatureColumn], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = columns
        .iter()
        .zip(importances)
        .map(|(&feature, &importance)| FeatureImportance { feature, importance })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

/// Trains and compares citation models
pub struct CitationPredictor {
    config: PredictorConfig,
}

impl CitationPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Fit every configured model and pick the best.
    ///
    /// Never fails: per-model errors land in `failures`, and data too small
    /// to split yields an empty report.
    pub fn predict(&self, features: &[FeatureVector]) -> PredictionReport {
        let columns = FeatureColumn::all_except(&[TARGET]);
        let feature_names = columns.iter().map(|c| c.name().to_string()).collect();

        let Some((train, test)) =
            train_test_split(features.len(), self.config.test_fraction, self.config.seed)
        else {
            warn!(rows = features.len(), "Not enough authors to train citation models");
            return PredictionReport {
                feature_names,
                ..PredictionReport::default()
            };
        };

        let x = feature_matrix(features, &columns);
        let y: Vec<f64> = features.iter().map(|f| f.value(TARGET)).collect();

        let x_train: Vec<Vec<f64>> = train.iter().map(|&i| x[i].clone()).collect();
        let x_test: Vec<Vec<f64>> = test.iter().map(|&i| x[i].clone()).collect();
        let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();
        let y_test: Vec<f64> = test.iter().map(|&i| y[i]).collect();

        let scaler = Standardizer::fit(&x_train);
        let x_train = scaler.transform(&x_train);
        let x_test = scaler.transform(&x_test);

        let mut report = PredictionReport {
            feature_names,
            train_size: train.len(),
            test_size: test.len(),
            ..PredictionReport::default()
        };

        for &kind in &self.config.models {
            match self.evaluate(kind, &columns, &x_train, &y_train, &x_test, &y_test) {
                Ok(result) => {
                    info!(model = %kind, r2 = result.r2_score, rmse = result.rmse, "Model evaluated");
                    record_model_fit(kind.name(), Some(result.r2_score));
                    report.results.push(result);
                }
                Err(e) => {
                    if e.is_recoverable() {
                        warn!(model = %kind, error = %e, "Model excluded from comparison");
                    } else {
                        error!(model = %kind, error = %e, code = e.code().as_code(), "Model failed unexpectedly");
                    }
                    record_model_fit(kind.name(), None);
                    report.failures.push(ModelFailure {
                        model: kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        let best = report.results.iter().reduce(|best, candidate| {
            let better = candidate.r2_score > best.r2_score
                || (candidate.r2_score == best.r2_score && candidate.model < best.model);
            if better { candidate } else { best }
        });
        if let Some(best) = best {
            report.best_model = Some(best.model);
            report.feature_importance = best.feature_importance.clone();
        }

        report
    }

    fn evaluate(
        &self,
        kind: ModelKind,
        columns: &[FeatureColumn],
        x_train: &[Vec<f64>],
        y_train: &[f64],
        x_test: &[Vec<f64>],
        y_test: &[f64],
    ) -> Result<PredictionResult> {
        let mut model = self.config.build(kind);
        model.fit(x_train, y_train)?;

        let predicted = model.predict(x_test);
        let r2 = r2_score(y_test, &predicted);
        let error = rmse(y_test, &predicted);
        if !r2.is_finite() || !error.is_finite() {
            return Err(AppError::model_fit(kind.name(), "non-finite evaluation score"));
        }

        Ok(PredictionResult {
            model: kind,
            r2_score: r2,
            rmse: error,
            feature_importance: ranked_importance(columns, &model.feature_importances()),
            predictions: predicted,
            actual: y_test.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authors(n: usize) -> Vec<FeatureVector> {
        (0..n)
            .map(|i| {
                let papers = (i + 1) as u32;
                FeatureVector {
                    author_name: format!("author {:02}", i),
                    publication_count: papers,
                    total_citations: 10 * papers as u64,
                    avg_citations_per_paper: 10.0,
                    h_index_approx: papers.min(10),
                    degree: (i % 5) as u32,
                    degree_centrality: (i % 5) as f64 / 4.0,
                    pagerank: 1.0 / n as f64,
                    ..FeatureVector::default()
                }
            })
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        assert_eq!(train_test_split(10, 0.2, 42), train_test_split(10, 0.2, 42));
    }

    #[test]
    fn test_split_too_small() {
        assert!(train_test_split(2, 0.2, 42).is_none());
        // ceil(5 * 0.2) = 1 evaluation row
        assert!(train_test_split(5, 0.2, 42).is_none());
    }

    #[test]
    fn test_r2_and_rmse() {
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 5.0]), 0.0);
        assert!((r2_score(&[1.0, 3.0], &[2.0, 2.0]) - 0.0).abs() < 1e-12);
        assert!((rmse(&[1.0, 3.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_models_compared() {
        let report = CitationPredictor::new(PredictorConfig::default()).predict(&authors(30));

        assert_eq!(report.results.len(), 3);
        assert!(report.failures.is_empty());
        assert_eq!(report.train_size, 24);
        assert_eq!(report.test_size, 6);
        assert_eq!(report.feature_names.len(), 9);
        assert!(!report.feature_names.contains(&"total_citations".to_string()));

        for result in &report.results {
            assert_eq!(result.predictions.len(), report.test_size);
            assert_eq!(result.actual.len(), report.test_size);
            assert!(result.actual.iter().all(|y| y % 10.0 == 0.0));
        }

        let best = report.best().unwrap();
        assert!(best.r2_score > 0.7);
        assert!((rmse(&best.actual, &best.predictions) - best.rmse).abs() < 1e-12);
        assert!(report.results.iter().all(|r| r.r2_score <= best.r2_score));

        let importance_sum: f64 = report.feature_importance.iter().map(|f| f.importance).sum();
        assert!((importance_sum - 1.0).abs() < 1e-9);
        assert!(report
            .feature_importance
            .windows(2)
            .all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_one_failing_model_is_excluded() {
        let config = PredictorConfig {
            learning_rate: 0.0,
            ..PredictorConfig::default()
        };
        let report = CitationPredictor::new(config).predict(&authors(30));

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].model, ModelKind::BoostedTrees);
        assert!(report.failures[0].message.contains("learning"));
        assert!(report.best_model.is_some());
        assert_ne!(report.best_model, Some(ModelKind::BoostedTrees));
    }

    #[test]
    fn test_every_model_failing_gives_empty_report() {
        let config = PredictorConfig {
            tree: TreeParams {
                max_depth: 0,
                ..TreeParams::default()
            },
            boosting_max_depth: 0,
            ..PredictorConfig::default()
        };
        let report = CitationPredictor::new(config).predict(&authors(30));

        assert!(report.results.is_empty());
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.best_model, None);
        assert!(report.feature_importance.is_empty());
    }

    #[test]
    fn test_too_few_rows() {
        let report = CitationPredictor::new(PredictorConfig::default()).predict(&authors(2));
        assert!(report.results.is_empty());
        assert!(report.best_model.is_none());
        assert_eq!(report.train_size, 0);
    }

    #[test]
    fn test_reproducible_report() {
        let predictor = CitationPredictor::new(PredictorConfig::default());
        let data = authors(20);
        assert_eq!(predictor.predict(&data), predictor.predict(&data));
    }
}
