//! Render-ready collaboration network
//!
//! Selects the most central authors, keeps their strong ties and attaches
//! the visual attributes (size, color group, edge width) an external
//! renderer needs. No layout is computed here.

use crate::community::Partition;
use crate::graph::CollaborationGraph;
use scholarnet_common::config::NetworkConfig;
use scholarnet_common::models::NetworkMetricRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const BASE_NODE_SIZE: f64 = 300.0;
const NODE_SIZE_FACTOR: f64 = 800.0;
const MAX_EDGE_WIDTH: f64 = 2.5;
const LABEL_MAX_CHARS: usize = 12;

#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Authors considered, by PageRank
    pub top_authors: usize,

    /// Edges lighter than this are hidden
    pub min_edge_weight: u32,

    /// Authors flagged and labelled, by PageRank
    pub highlighted: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            top_authors: 50,
            min_edge_weight: 2,
            highlighted: 15,
        }
    }
}

impl From<&NetworkConfig> for ViewConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            top_authors: config.view_top_authors,
            min_edge_weight: config.view_min_edge_weight,
            highlighted: config.view_highlighted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub author_name: String,

    /// Short display label, only set for highlighted authors
    pub label: Option<String>,

    pub pagerank: f64,
    pub size: f64,

    /// Community label from the full-graph partition
    pub community: Option<usize>,

    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub width: f64,
}

/// Subgraph of the strongest collaborations among the top authors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkView {
    /// Sorted by author name
    pub nodes: Vec<ViewNode>,

    /// Sorted by (source, target)
    pub edges: Vec<ViewEdge>,
}

impl NetworkView {
    pub fn build(
        graph: &CollaborationGraph,
        metrics: &[NetworkMetricRow],
        partition: &Partition,
        config: &ViewConfig,
    ) -> Self {
        let ranked = rank_by_pagerank(metrics);

        let top: Vec<String> = ranked
            .iter()
            .take(config.top_authors)
            .map(|(name, _)| name.to_string())
            .collect();

        let min_weight = config.min_edge_weight;
        let subgraph = graph.filtered_subgraph(&top, |w| w >= min_weight);
        if subgraph.is_empty() {
            return Self::default();
        }

        let pagerank: HashMap<&str, f64> = ranked.iter().copied().collect();
        let max_pagerank = subgraph
            .names()
            .iter()
            .filter_map(|name| pagerank.get(name.as_str()).copied())
            .fold(0.0f64, f64::max);

        let highlighted: BTreeSet<&str> = ranked
            .iter()
            .filter(|(name, _)| subgraph.index_of(name).is_some())
            .take(config.highlighted)
            .map(|(name, _)| *name)
            .collect();

        let nodes = subgraph
            .names()
            .iter()
            .map(|name| {
                let pr = pagerank.get(name.as_str()).copied().unwrap_or(0.0);
                let size = if max_pagerank > 0.0 {
                    pr / max_pagerank * NODE_SIZE_FACTOR + BASE_NODE_SIZE
                } else {
                    BASE_NODE_SIZE
                };
                let is_highlighted = highlighted.contains(name.as_str());
                ViewNode {
                    author_name: name.clone(),
                    label: is_highlighted.then(|| display_label(name)),
                    pagerank: pr,
                    size,
                    community: partition.community_of(name),
                    highlighted: is_highlighted,
                }
            })
            .collect();

        let edges = subgraph.edges();
        let max_weight = edges.iter().map(|e| e.weight).max().unwrap_or(1).max(1) as f64;
        let edges = edges
            .into_iter()
            .map(|e| ViewEdge {
                width: (e.weight as f64 / max_weight * 3.0).min(MAX_EDGE_WIDTH),
                source: e.source,
                target: e.target,
                weight: e.weight,
            })
            .collect();

        Self { nodes, edges }
    }
}

/// PageRank descending, ties by name ascending
fn rank_by_pagerank(metrics: &[NetworkMetricRow]) -> Vec<(&str, f64)> {
    let mut seen = BTreeSet::new();
    let mut ranked: Vec<(&str, f64)> = metrics
        .iter()
        .filter(|row| seen.insert(row.author_name.as_str()))
        .map(|row| (row.author_name.as_str(), row.pagerank))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// Last name token upper-cased; single-token names are cut to 12 chars
pub fn display_label(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [.., last] if tokens.len() > 1 => last.to_uppercase(),
        _ => name.chars().take(LABEL_MAX_CHARS).collect::<String>().to_uppercase(),
    }
}
