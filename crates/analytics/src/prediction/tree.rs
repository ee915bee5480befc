//! CART regression tree
//!
//! Greedy variance-reduction splits on numeric features. Split search is
//! exhaustive over every feature and every boundary between distinct
//! values, so fitting is deterministic for a given sample.

use super::Regressor;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::models::ModelKind;

/// Gains at or below this are treated as no improvement
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Growth limits shared by every tree-based model
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeParams {
    pub fn validate(&self, model: ModelKind) -> Result<()> {
        if self.max_depth == 0 {
            return Err(AppError::model_fit(model.name(), "max_depth must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(AppError::model_fit(model.name(), "min_samples_split must be at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(AppError::model_fit(model.name(), "min_samples_leaf must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Single regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    params: TreeParams,
    nodes: Vec<Node>,

    /// Total weighted impurity decrease per feature
    impurity_decrease: Vec<f64>,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            impurity_decrease: Vec::new(),
        }
    }

    /// Fit on the given sample rows; indices may repeat (bootstrap)
    pub fn fit_sample(&mut self, x: &[Vec<f64>], y: &[f64], sample: &[usize]) -> Result<()> {
        self.params.validate(ModelKind::SingleTree)?;
        if sample.is_empty() {
            return Err(AppError::model_fit(ModelKind::SingleTree.name(), "no training rows"));
        }

        let width = x.first().map_or(0, Vec::len);
        self.nodes.clear();
        self.impurity_decrease = vec![0.0; width];
        self.grow(x, y, sample.to_vec(), 0);
        Ok(())
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            match self.nodes.get(node) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Raw (unnormalized) impurity decrease per feature
    pub fn raw_importances(&self) -> &[f64] {
        &self.impurity_decrease
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Grow a subtree and return its node index
    fn grow(&mut self, x: &[Vec<f64>], y: &[f64], sample: Vec<usize>, depth: usize) -> usize {
        let id = self.nodes.len();
        let value = mean(y, &sample);
        self.nodes.push(Node::Leaf { value });

        if depth >= self.params.max_depth || sample.len() < self.params.min_samples_split {
            return id;
        }

        let Some(split) = self.best_split(x, y, &sample) else {
            return id;
        };

        self.impurity_decrease[split.feature] += split.gain;
        let left = self.grow(x, y, split.left, depth + 1);
        let right = self.grow(x, y, split.right, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn best_split(&self, x: &[Vec<f64>], y: &[f64], sample: &[usize]) -> Option<SplitCandidate> {
        let n = sample.len();
        let min_leaf = self.params.min_samples_leaf;
        let parent_sse = sse(y, sample);
        if parent_sse <= MIN_IMPURITY_DECREASE {
            return None;
        }

        let width = x.first().map_or(0, Vec::len);
        let mut best: Option<(usize, usize, f64, Vec<usize>)> = None;

        for feature in 0..width {
            let mut order = sample.to_vec();
            order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let total_sum: f64 = order.iter().map(|&i| y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for split_at in 1..n {
                let moved = y[order[split_at - 1]];
                left_sum += moved;
                left_sq += moved * moved;

                if split_at < min_leaf || n - split_at < min_leaf {
                    continue;
                }
                if x[order[split_at - 1]][feature] == x[order[split_at]][feature] {
                    continue;
                }

                let left_n = split_at as f64;
                let right_n = (n - split_at) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let children_sse =
                    (left_sq - left_sum * left_sum / left_n) + (right_sq - right_sum * right_sum / right_n);
                let gain = parent_sse - children_sse;

                if gain > MIN_IMPURITY_DECREASE && best.as_ref().map_or(true, |b| gain > b.2) {
                    best = Some((feature, split_at, gain, order.clone()));
                }
            }
        }

        best.map(|(feature, split_at, gain, order)| {
            let threshold = (x[order[split_at - 1]][feature] + x[order[split_at]][feature]) / 2.0;
            let (left, right) = order.split_at(split_at);
            SplitCandidate {
                feature,
                threshold,
                gain,
                left: left.to_vec(),
                right: right.to_vec(),
            }
        })
    }
}

impl Regressor for RegressionTree {
    fn kind(&self) -> ModelKind {
        ModelKind::SingleTree
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let sample: Vec<usize> = (0..y.len()).collect();
        self.fit_sample(x, y, &sample)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    fn feature_importances(&self) -> Vec<f64> {
        normalize(&self.impurity_decrease)
    }
}

fn mean(y: &[f64], sample: &[usize]) -> f64 {
    sample.iter().map(|&i| y[i]).sum::<f64>() / sample.len() as f64
}

/// Sum of squared deviations from the sample mean
fn sse(y: &[f64], sample: &[usize]) -> f64 {
    let m = mean(y, sample);
    sample.iter().map(|&i| (y[i] - m).powi(2)).sum()
}

/// Scale to sum 1; all zeros stay zeros
pub(crate) fn normalize(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.iter().map(|v| v / total).collect()
    } else {
        vec![0.0; values.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_step_function() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 0.0]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();

        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&[vec![2.0, 0.0], vec![7.5, 0.0]]), vec![1.0, 9.0]);
        // one split on the informative feature, constant feature unused
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.feature_importances(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_depth_limit() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..8).map(|i| i as f64).collect();

        let mut stump = RegressionTree::new(TreeParams {
            max_depth: 1,
            ..TreeParams::default()
        });
        stump.fit(&x, &y).unwrap();
        assert_eq!(stump.node_count(), 3);
        assert_eq!(stump.predict_row(&[0.0]), 1.5);
    }

    #[test]
    fn test_constant_target_never_splits() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let y = vec![4.0; 5];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.feature_importances(), vec![0.0]);
    }

    #[test]
    fn test_invalid_depth_is_fit_error() {
        let mut tree = RegressionTree::new(TreeParams {
            max_depth: 0,
            ..TreeParams::default()
        });
        let err = tree.fit(&[vec![1.0]], &[1.0]).unwrap_err();
        assert!(matches!(err, AppError::ModelFit { .. }));
    }
}
