//! Configuration management for ScholarNet
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml)
//! - Default values

use crate::errors::Result;
use crate::models::ModelKind;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    /// Input and output locations
    #[serde(default)]
    #[validate(nested)]
    pub paths: PathsConfig,

    /// Graph metric and community settings
    #[serde(default)]
    #[validate(nested)]
    pub network: NetworkConfig,

    /// Influence scoring settings
    #[serde(default)]
    #[validate(nested)]
    pub scoring: ScoringConfig,

    /// Citation prediction settings
    #[serde(default)]
    #[validate(nested)]
    pub prediction: PredictionConfig,

    /// Author clustering settings
    #[serde(default)]
    #[validate(nested)]
    pub clustering: ClusteringConfig,

    /// Observability configuration
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PathsConfig {
    /// Publication records produced by the collector (CSV or JSON)
    #[serde(default = "default_input")]
    #[validate(length(min = 1))]
    pub input: String,

    /// Directory receiving every output table
    #[serde(default = "default_results_dir")]
    #[validate(length(min = 1))]
    pub results_dir: String,
}

/// Community detection algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityAlgorithm {
    /// Greedy multi-level modularity optimization
    #[default]
    Louvain,
    /// First split of the edge-betweenness dendrogram
    GirvanNewman,
}

impl CommunityAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Louvain => "louvain",
            Self::GirvanNewman => "girvan_newman",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NetworkConfig {
    /// PageRank damping factor
    #[serde(default = "default_damping")]
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub damping: f64,

    /// PageRank iteration budget
    #[serde(default = "default_pagerank_max_iter")]
    #[validate(range(min = 1))]
    pub pagerank_max_iter: usize,

    /// Shared convergence tolerance for power iterations
    #[serde(default = "default_tolerance")]
    #[validate(range(exclusive_min = 0.0))]
    pub tolerance: f64,

    /// Eigenvector centrality iteration budget (first attempt)
    #[serde(default = "default_eigenvector_max_iter")]
    #[validate(range(min = 1))]
    pub eigenvector_max_iter: usize,

    /// Budget multiplier for the single eigenvector retry
    #[serde(default = "default_eigenvector_retry_factor")]
    #[validate(range(min = 1))]
    pub eigenvector_retry_factor: usize,

    /// Community detection algorithm
    #[serde(default)]
    pub community_algorithm: CommunityAlgorithm,

    /// Seed for the community detection visiting order
    #[serde(default = "default_seed")]
    pub community_seed: u64,

    /// Modularity resolution
    #[serde(default = "default_resolution")]
    #[validate(range(exclusive_min = 0.0))]
    pub resolution: f64,

    /// Number of top PageRank authors kept in the render view
    #[serde(default = "default_view_top_authors")]
    #[validate(range(min = 1))]
    pub view_top_authors: usize,

    /// Minimum edge weight kept in the render view
    #[serde(default = "default_view_min_edge_weight")]
    pub view_min_edge_weight: u32,

    /// Number of nodes highlighted in the render view
    #[serde(default = "default_view_highlighted")]
    pub view_highlighted: usize,

    /// Number of top connectors logged
    #[serde(default = "default_top_connectors")]
    pub top_connectors: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ScoringConfig {
    /// Size of the top influential authors table
    #[serde(default = "default_top_n")]
    #[validate(range(min = 1))]
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PredictionConfig {
    /// Share of authors held out for evaluation
    #[serde(default = "default_test_fraction")]
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub test_fraction: f64,

    /// Seed for the split and every stochastic model
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Models to train, in report order
    #[serde(default = "default_models")]
    #[validate(length(min = 1))]
    pub models: Vec<ModelKind>,

    /// Trees in the bagged ensemble and rounds of boosting
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Depth limit for standalone and bagged trees
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Depth limit for boosted trees
    #[serde(default = "default_boosting_max_depth")]
    pub boosting_max_depth: usize,

    /// Boosting shrinkage
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Minimum samples required to split a node
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Minimum samples in each leaf
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

/// Clustering algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMethod {
    /// Centroid-based partitioning
    #[default]
    KMeans,
    /// Density-based grouping with a noise label
    Dbscan,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub method: ClusterMethod,

    /// Requested cluster count (k-means)
    #[serde(default = "default_n_clusters")]
    #[validate(range(min = 1))]
    pub n_clusters: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Independent k-means restarts
    #[serde(default = "default_n_init")]
    #[validate(range(min = 1))]
    pub n_init: usize,

    #[serde(default = "default_kmeans_max_iter")]
    #[validate(range(min = 1))]
    pub max_iter: usize,

    #[serde(default = "default_kmeans_tol")]
    pub tol: f64,

    /// Neighborhood radius (DBSCAN)
    #[serde(default = "default_eps")]
    #[validate(range(exclusive_min = 0.0))]
    pub eps: f64,

    /// Core point threshold, point itself included (DBSCAN)
    #[serde(default = "default_min_samples")]
    #[validate(range(min = 1))]
    pub min_samples: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Write a Prometheus snapshot of the run next to the results
    #[serde(default = "default_metrics_snapshot")]
    pub metrics_snapshot: bool,

    /// Service name attached to log lines
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_input() -> String { "data/publications.csv".to_string() }
fn default_results_dir() -> String { "results".to_string() }
fn default_damping() -> f64 { 0.85 }
fn default_pagerank_max_iter() -> usize { 100 }
fn default_tolerance() -> f64 { 1e-6 }
fn default_eigenvector_max_iter() -> usize { 1000 }
fn default_eigenvector_retry_factor() -> usize { 10 }
fn default_seed() -> u64 { 42 }
fn default_resolution() -> f64 { 1.0 }
fn default_view_top_authors() -> usize { 50 }
fn default_view_min_edge_weight() -> u32 { 2 }
fn default_view_highlighted() -> usize { 15 }
fn default_top_connectors() -> usize { 10 }
fn default_top_n() -> usize { crate::DEFAULT_TOP_N }
fn default_test_fraction() -> f64 { 0.2 }
fn default_models() -> Vec<ModelKind> { ModelKind::ALL.to_vec() }
fn default_n_estimators() -> usize { 100 }
fn default_max_depth() -> usize { 10 }
fn default_boosting_max_depth() -> usize { 3 }
fn default_learning_rate() -> f64 { 0.1 }
fn default_min_samples_split() -> usize { 2 }
fn default_min_samples_leaf() -> usize { 1 }
fn default_n_clusters() -> usize { 5 }
fn default_n_init() -> usize { 10 }
fn default_kmeans_max_iter() -> usize { 300 }
fn default_kmeans_tol() -> f64 { 1e-4 }
fn default_eps() -> f64 { 0.5 }
fn default_min_samples() -> usize { 3 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_snapshot() -> bool { true }
fn default_service_name() -> String { "scholarnet".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__PREDICTION__SEED=7
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            results_dir: default_results_dir(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            pagerank_max_iter: default_pagerank_max_iter(),
            tolerance: default_tolerance(),
            eigenvector_max_iter: default_eigenvector_max_iter(),
            eigenvector_retry_factor: default_eigenvector_retry_factor(),
            community_algorithm: CommunityAlgorithm::default(),
            community_seed: default_seed(),
            resolution: default_resolution(),
            view_top_authors: default_view_top_authors(),
            view_min_edge_weight: default_view_min_edge_weight(),
            view_highlighted: default_view_highlighted(),
            top_connectors: default_top_connectors(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { top_n: default_top_n() }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            models: default_models(),
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
            boosting_max_depth: default_boosting_max_depth(),
            learning_rate: default_learning_rate(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            method: ClusterMethod::default(),
            n_clusters: default_n_clusters(),
            seed: default_seed(),
            n_init: default_n_init(),
            max_iter: default_kmeans_max_iter(),
            tol: default_kmeans_tol(),
            eps: default_eps(),
            min_samples: default_min_samples(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_snapshot: default_metrics_snapshot(),
            service_name: default_service_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.paths.input, "data/publications.csv");
        assert_eq!(config.network.damping, 0.85);
        assert_eq!(config.prediction.models.len(), 3);
        assert_eq!(config.clustering.n_clusters, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_test_fraction_rejected() {
        let mut config = AppConfig::default();
        config.prediction.test_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enum_names() {
        let algo: CommunityAlgorithm = serde_json::from_str("\"girvan_newman\"").unwrap();
        assert_eq!(algo, CommunityAlgorithm::GirvanNewman);
        assert_eq!(algo.name(), "girvan_newman");
        let method: ClusterMethod = serde_json::from_str("\"dbscan\"").unwrap();
        assert_eq!(method, ClusterMethod::Dbscan);
    }
}
