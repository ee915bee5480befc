//! Collaboration graph representation
//!
//! Provides the in-memory undirected co-authorship graph and its builder

use scholarnet_common::models::PublicationRecord;
use scholarnet_common::names::normalize_author_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Edge in the collaboration graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorEdge {
    /// Lexicographically smaller endpoint
    pub source: String,

    /// Lexicographically larger endpoint
    pub target: String,

    /// Number of publications both authors appear on
    pub weight: u32,
}

/// In-memory co-authorship graph.
///
/// Vertices are indexed in ascending author-name order, so indices (and
/// everything derived from iterating them) do not depend on the order in
/// which records were processed.
#[derive(Debug, Clone, Default)]
pub struct CollaborationGraph {
    /// Vertex index -> normalized author name
    names: Vec<String>,

    /// Normalized author name -> vertex index
    index: HashMap<String, usize>,

    /// Adjacency: vertex -> (neighbor -> weight)
    adjacency: Vec<BTreeMap<usize, u32>>,

    /// Number of undirected edges
    edge_count: usize,
}

impl CollaborationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from unordered weighted pairs.
    ///
    /// Pairs may be given in either orientation; self-pairs are ignored and
    /// repeated pairs accumulate weight.
    pub fn from_weighted_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String, u32)>,
    {
        let mut weights: BTreeMap<(String, String), u32> = BTreeMap::new();
        for (a, b, w) in pairs {
            if a == b || w == 0 {
                continue;
            }
            let key = if a < b { (a, b) } else { (b, a) };
            *weights.entry(key).or_insert(0) += w;
        }

        let names: Vec<String> = weights
            .keys()
            .flat_map(|(a, b)| [a.clone(), b.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let mut adjacency = vec![BTreeMap::new(); names.len()];
        for ((a, b), w) in &weights {
            let (ia, ib) = (index[a], index[b]);
            adjacency[ia].insert(ib, *w);
            adjacency[ib].insert(ia, *w);
        }

        Self {
            names,
            index,
            adjacency,
            edge_count: weights.len(),
        }
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Author name for a vertex index
    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    /// All author names in index (ascending name) order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Vertex index for a normalized author name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Neighbors of a vertex with edge weights, ascending by index
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.adjacency[node].iter().map(|(&n, &w)| (n, w))
    }

    /// Number of distinct co-authors
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Sum of incident edge weights
    pub fn weighted_degree(&self, node: usize) -> f64 {
        self.adjacency[node].values().map(|&w| w as f64).sum()
    }

    /// Weight of the edge between two authors, if any
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);
        self.adjacency[ia].get(&ib).copied()
    }

    /// Edges as index pairs `(u, v, weight)` with `u < v`, ascending
    pub fn edge_indices(&self) -> Vec<(usize, usize, u32)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            for (&v, &w) in neighbors.range(u + 1..) {
                edges.push((u, v, w));
            }
        }
        edges
    }

    /// All edges sorted by (source, target)
    pub fn edges(&self) -> Vec<CoauthorEdge> {
        self.edge_indices()
            .into_iter()
            .map(|(u, v, weight)| CoauthorEdge {
                source: self.names[u].clone(),
                target: self.names[v].clone(),
                weight,
            })
            .collect()
    }

    /// Induced subgraph on the given authors
    pub fn subgraph(&self, authors: &[String]) -> Self {
        self.filtered_subgraph(authors, |_| true)
    }

    /// Induced subgraph on the given authors, keeping edges accepted by `keep`.
    ///
    /// Authors left without an edge are not part of the result.
    pub fn filtered_subgraph<F>(&self, authors: &[String], keep: F) -> Self
    where
        F: Fn(u32) -> bool,
    {
        let members: BTreeSet<usize> = authors
            .iter()
            .filter_map(|name| self.index_of(name))
            .collect();

        let pairs = self
            .edge_indices()
            .into_iter()
            .filter(|(u, v, w)| members.contains(u) && members.contains(v) && keep(*w))
            .map(|(u, v, w)| (self.names[u].clone(), self.names[v].clone(), w));

        Self::from_weighted_pairs(pairs)
    }
}

/// Turns publication records into a [`CollaborationGraph`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Accumulated weights keyed by the ordered author pair
    pair_weights: BTreeMap<(String, String), u32>,

    records_seen: usize,
    records_used: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a slice of records
    pub fn from_records(records: &[PublicationRecord]) -> CollaborationGraph {
        let mut builder = Self::new();
        for record in records {
            builder.add_record(record);
        }
        builder.build()
    }

    /// Count every unordered pair of distinct authors on this record once
    pub fn add_record(&mut self, record: &PublicationRecord) {
        self.records_seen += 1;

        let authors: BTreeSet<String> = record
            .authors
            .iter()
            .filter_map(|a| normalize_author_name(a))
            .collect();

        if authors.len() < 2 {
            return;
        }
        self.records_used += 1;

        let authors: Vec<&String> = authors.iter().collect();
        for i in 0..authors.len() {
            for j in (i + 1)..authors.len() {
                // BTreeSet iteration keeps authors[i] < authors[j]
                *self
                    .pair_weights
                    .entry((authors[i].clone(), authors[j].clone()))
                    .or_insert(0) += 1;
            }
        }
    }

    /// Finish building
    pub fn build(self) -> CollaborationGraph {
        debug!(
            records_seen = self.records_seen,
            records_used = self.records_used,
            pairs = self.pair_weights.len(),
            "Collaboration graph assembled"
        );
        CollaborationGraph::from_weighted_pairs(
            self.pair_weights.into_iter().map(|((a, b), w)| (a, b, w)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(authors: &[&str]) -> PublicationRecord {
        PublicationRecord::new("t", authors.iter().map(|a| a.to_string()).collect(), 0)
    }

    #[test]
    fn test_graph_construction() {
        // P1:[A,B], P2:[A,B], P3:[A,C]
        let graph = GraphBuilder::from_records(&[
            record(&["A", "B"]),
            record(&["A", "B"]),
            record(&["A", "C"]),
        ]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight("a", "b"), Some(2));
        assert_eq!(graph.weight("a", "c"), Some(1));
        assert_eq!(graph.weight("b", "c"), None);

        let a = graph.index_of("a").unwrap();
        let b = graph.index_of("b").unwrap();
        assert_eq!(graph.degree(a), 2);
        assert_eq!(graph.degree(b), 1);
    }

    #[test]
    fn test_weight_independent_of_order() {
        let graph = GraphBuilder::from_records(&[
            record(&["Ada", "Bob", "Cy"]),
            record(&["Cy", "ada", "BOB "]),
        ]);
        assert_eq!(graph.weight("ada", "bob"), Some(2));
        assert_eq!(graph.weight("bob", "ada"), Some(2));
        assert_eq!(graph.weight("cy", "ada"), Some(2));
    }

    #[test]
    fn test_duplicates_within_record_count_once() {
        let graph = GraphBuilder::from_records(&[record(&["Ada", "ada", " ADA ", "Bob"])]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.weight("ada", "bob"), Some(1));
    }

    #[test]
    fn test_solo_records_add_nothing() {
        let graph = GraphBuilder::from_records(&[
            record(&["Ada"]),
            record(&[]),
            record(&["Bob", "bob"]),
        ]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_sorted() {
        let graph = GraphBuilder::from_records(&[record(&["Zed", "Amy", "Max"])]);
        let edges = graph.edges();
        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("amy", "max"), ("amy", "zed"), ("max", "zed")]);
    }

    #[test]
    fn test_filtered_subgraph() {
        let graph = GraphBuilder::from_records(&[
            record(&["A", "B"]),
            record(&["A", "B"]),
            record(&["A", "C"]),
        ]);
        let sub = graph.filtered_subgraph(&["a".into(), "b".into(), "c".into()], |w| w >= 2);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.weight("a", "b"), Some(2));
        assert_eq!(sub.index_of("c"), None);

        let induced = graph.subgraph(&["a".into(), "c".into()]);
        assert_eq!(induced.edge_count(), 1);
        assert_eq!(induced.weight("a", "c"), Some(1));
    }
}
