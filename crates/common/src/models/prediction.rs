//! Citation prediction result entities

use super::FeatureColumn;
use serde::{Deserialize, Serialize};

/// Regression model families compared by the citation predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Bootstrap-aggregated regression trees
    BaggedTrees,
    /// Gradient-boosted regression trees
    BoostedTrees,
    /// A single regression tree
    SingleTree,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::BaggedTrees,
        ModelKind::BoostedTrees,
        ModelKind::SingleTree,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::BaggedTrees => "bagged_trees",
            ModelKind::BoostedTrees => "boosted_trees",
            ModelKind::SingleTree => "single_tree",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Importance of one input feature in a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: FeatureColumn,
    pub importance: f64,
}

/// Held-out evaluation of one fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub model: ModelKind,

    /// Coefficient of determination on the evaluation subset
    pub r2_score: f64,

    /// Root-mean-squared error on the evaluation subset
    pub rmse: f64,

    /// Features ranked by importance, descending
    pub feature_importance: Vec<FeatureImportance>,

    /// Predicted total citations for each evaluation row
    pub predictions: Vec<f64>,

    /// Observed total citations, aligned with `predictions`
    pub actual: Vec<f64>,
}

/// A model excluded from comparison because fitting or evaluation failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFailure {
    pub model: ModelKind,
    pub message: String,
}
