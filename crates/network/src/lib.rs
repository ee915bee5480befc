//! ScholarNet Network Engine
//!
//! Co-authorship graph analysis:
//! - Graph construction from publication records
//! - Structural centrality and weighted PageRank
//! - Community detection (Louvain, Girvan-Newman)
//! - Render-ready network view

mod centrality;
mod community;
mod graph;
mod pagerank;
mod view;

pub use centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality, eigenvector_centrality,
};
pub use community::{modularity, CommunityConfig, CommunityDetector, Partition};
pub use graph::{CoauthorEdge, CollaborationGraph, GraphBuilder};
pub use pagerank::{PageRankConfig, PageRankRun, PageRankScorer};
pub use view::{display_label, NetworkView, ViewConfig, ViewEdge, ViewNode};

use scholarnet_common::config::NetworkConfig;
use scholarnet_common::metrics::record_eigenvector_fallback;
use scholarnet_common::models::NetworkMetricRow;
use tracing::{debug, warn};

/// Settings for the per-author metric table
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub pagerank: PageRankConfig,

    /// Eigenvector centrality budget for the first attempt
    pub eigenvector_max_iter: usize,

    /// Budget multiplier for the single retry
    pub eigenvector_retry_factor: usize,

    pub tolerance: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            pagerank: PageRankConfig::default(),
            eigenvector_max_iter: 1000,
            eigenvector_retry_factor: 10,
            tolerance: 1e-6,
        }
    }
}

impl From<&NetworkConfig> for MetricsConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            pagerank: PageRankConfig {
                damping: config.damping,
                max_iterations: config.pagerank_max_iter,
                epsilon: config.tolerance,
            },
            eigenvector_max_iter: config.eigenvector_max_iter,
            eigenvector_retry_factor: config.eigenvector_retry_factor,
            tolerance: config.tolerance,
        }
    }
}

/// Computes the per-author structural metric table
pub struct NetworkMetricsEngine {
    config: MetricsConfig,
}

impl NetworkMetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// One row per vertex, sorted by author name.
    ///
    /// Never fails: an eigenvector computation that does not converge after
    /// the retry yields 0 for every author while other metrics are kept.
    pub fn compute(&self, graph: &CollaborationGraph) -> Vec<NetworkMetricRow> {
        if graph.is_empty() {
            return Vec::new();
        }

        let degree = degree_centrality(graph);
        let betweenness = betweenness_centrality(graph);
        let closeness = closeness_centrality(graph);
        let eigenvector = self.eigenvector_with_fallback(graph);
        let pagerank = PageRankScorer::new(self.config.pagerank.clone()).compute(graph);

        debug!(
            nodes = graph.node_count(),
            pagerank_iterations = pagerank.iterations,
            "Network metrics computed"
        );

        // Vertex indices follow name order, so rows come out sorted
        (0..graph.node_count())
            .map(|v| NetworkMetricRow {
                author_name: graph.name(v).to_string(),
                degree: graph.degree(v) as u32,
                degree_centrality: degree[v],
                betweenness_centrality: betweenness[v],
                closeness_centrality: closeness[v],
                eigenvector_centrality: eigenvector[v],
                pagerank: pagerank.scores[v],
            })
            .collect()
    }

    fn eigenvector_with_fallback(&self, graph: &CollaborationGraph) -> Vec<f64> {
        let budget = self.config.eigenvector_max_iter;
        let tolerance = self.config.tolerance;

        let first = match eigenvector_centrality(graph, budget, tolerance) {
            Ok(values) => return values,
            Err(e) if e.is_recoverable() => e,
            Err(e) => {
                warn!(error = %e, "Eigenvector centrality failed, using 0 for every author");
                record_eigenvector_fallback();
                return vec![0.0; graph.node_count()];
            }
        };

        let retry_budget = budget.saturating_mul(self.config.eigenvector_retry_factor);
        debug!(error = %first, retry_budget, "Retrying eigenvector centrality");

        match eigenvector_centrality(graph, retry_budget, tolerance) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.code().as_code(),
                    "Eigenvector centrality did not converge, using 0 for every author"
                );
                record_eigenvector_fallback();
                vec![0.0; graph.node_count()]
            }
        }
    }
}

/// Best-connected authors: degree descending, ties by name
pub fn top_connectors(rows: &[NetworkMetricRow], n: usize) -> Vec<NetworkMetricRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| {
        b.degree
            .cmp(&a.degree)
            .then_with(|| a.author_name.cmp(&b.author_name))
    });
    ranked.truncate(n);
    ranked
}
