//! Research community detection
//!
//! Partitions the collaboration graph into disjoint communities:
//! - Louvain: greedy multi-level modularity maximization (default)
//! - Girvan-Newman: first split of the edge-betweenness dendrogram
//!
//! Labels are renumbered by community size (descending), then by smallest
//! member name, so equal partitions always get equal labels.

use crate::graph::CollaborationGraph;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scholarnet_common::config::{CommunityAlgorithm, NetworkConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Minimum modularity gain for a move to count
const MIN_GAIN: f64 = 1e-10;

/// Guard against oscillating local moves
const MAX_PASSES: usize = 1000;

/// Community detection configuration
#[derive(Debug, Clone)]
pub struct CommunityConfig {
    pub algorithm: CommunityAlgorithm,

    /// Seed for the vertex visiting order (Louvain)
    pub seed: u64,

    /// Modularity resolution (Louvain)
    pub resolution: f64,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            algorithm: CommunityAlgorithm::Louvain,
            seed: 42,
            resolution: 1.0,
        }
    }
}

impl From<&NetworkConfig> for CommunityConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            algorithm: config.community_algorithm,
            seed: config.community_seed,
            resolution: config.resolution,
        }
    }
}

/// A partition of the graph's authors into communities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Partition {
    /// Author name -> community label
    pub assignments: BTreeMap<String, usize>,

    /// Modularity of the partition on the full graph
    pub modularity: f64,
}

impl Partition {
    pub fn community_of(&self, author: &str) -> Option<usize> {
        self.assignments.get(author).copied()
    }

    pub fn community_count(&self) -> usize {
        self.assignments.values().max().map_or(0, |&max| max + 1)
    }

    /// Members per community, labels ascending, names ascending
    pub fn communities(&self) -> Vec<Vec<String>> {
        let mut groups = vec![Vec::new(); self.community_count()];
        for (author, &label) in &self.assignments {
            groups[label].push(author.clone());
        }
        groups
    }
}

/// Community detector
pub struct CommunityDetector {
    config: CommunityConfig,
}

impl CommunityDetector {
    pub fn new(config: CommunityConfig) -> Self {
        Self { config }
    }

    /// Partition the graph
    pub fn detect(&self, graph: &CollaborationGraph) -> Partition {
        if graph.is_empty() {
            return Partition::default();
        }

        let membership = match self.config.algorithm {
            CommunityAlgorithm::Louvain => louvain(graph, self.config.seed, self.config.resolution),
            CommunityAlgorithm::GirvanNewman => girvan_newman(graph),
        };

        let labels = canonical_labels(graph, &membership);
        let modularity = modularity(graph, &labels, self.config.resolution);

        debug!(
            algorithm = ?self.config.algorithm,
            communities = labels.iter().max().map_or(0, |m| m + 1),
            modularity,
            "Communities detected"
        );

        Partition {
            assignments: labels
                .iter()
                .enumerate()
                .map(|(v, &label)| (graph.name(v).to_string(), label))
                .collect(),
            modularity,
        }
    }
}

/// Modularity `Σ_c [in_c / m - γ (tot_c / 2m)^2]` with edge weights
pub fn modularity(graph: &CollaborationGraph, labels: &[usize], resolution: f64) -> f64 {
    let total_weight: f64 = graph.edge_indices().iter().map(|&(_, _, w)| w as f64).sum();
    if total_weight == 0.0 {
        return 0.0;
    }

    let communities = labels.iter().max().map_or(0, |m| m + 1);
    let mut internal = vec![0.0; communities];
    let mut degree_sum = vec![0.0; communities];

    for (u, v, w) in graph.edge_indices() {
        if labels[u] == labels[v] {
            internal[labels[u]] += w as f64;
        }
    }
    for (v, &label) in labels.iter().enumerate() {
        degree_sum[label] += graph.weighted_degree(v);
    }

    internal
        .iter()
        .zip(&degree_sum)
        .map(|(&inside, &tot)| {
            inside / total_weight - resolution * (tot / (2.0 * total_weight)).powi(2)
        })
        .sum()
}

/// Renumber raw community ids: size descending, then smallest member name
fn canonical_labels(graph: &CollaborationGraph, membership: &[usize]) -> Vec<usize> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (v, &community) in membership.iter().enumerate() {
        groups.entry(community).or_default().push(v);
    }

    let mut ordered: Vec<Vec<usize>> = groups.into_values().collect();
    // Vertex indices follow name order, so the first member is the smallest name
    ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let mut labels = vec![0; graph.node_count()];
    for (label, members) in ordered.iter().enumerate() {
        for &v in members {
            labels[v] = label;
        }
    }
    labels
}

/// Weighted graph used between Louvain levels; may carry self-loops
struct LevelGraph {
    /// Neighbor weights per node, self-loops excluded
    adjacency: Vec<BTreeMap<usize, f64>>,

    /// Self-loop weight per node (aggregated internal weight)
    loops: Vec<f64>,
}

impl LevelGraph {
    fn from_graph(graph: &CollaborationGraph) -> Self {
        let adjacency = (0..graph.node_count())
            .map(|v| graph.neighbors(v).map(|(w, weight)| (w, weight as f64)).collect())
            .collect();
        Self {
            adjacency,
            loops: vec![0.0; graph.node_count()],
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Weighted degree, self-loops counted twice
    fn degree(&self, v: usize) -> f64 {
        self.adjacency[v].values().sum::<f64>() + 2.0 * self.loops[v]
    }

    fn total_weight(&self) -> f64 {
        let edges: f64 = self.adjacency.iter().map(|n| n.values().sum::<f64>()).sum::<f64>() / 2.0;
        edges + self.loops.iter().sum::<f64>()
    }

    /// Collapse every community into a single node
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut adjacency = vec![BTreeMap::new(); count];
        let mut loops = vec![0.0; count];

        for v in 0..self.len() {
            let cv = community[v];
            loops[cv] += self.loops[v];
            for (&w, &weight) in &self.adjacency[v] {
                let cw = community[w];
                if cv == cw {
                    // Each internal edge is seen from both ends
                    loops[cv] += weight / 2.0;
                } else {
                    *adjacency[cv].entry(cw).or_insert(0.0) += weight;
                }
            }
        }

        Self { adjacency, loops }
    }
}

/// One round of local moves; returns whether any node changed community
fn louvain_local_moves(
    level: &LevelGraph,
    community: &mut [usize],
    rng: &mut ChaCha8Rng,
    resolution: f64,
) -> bool {
    let n = level.len();
    let m2 = 2.0 * level.total_weight();
    if m2 == 0.0 {
        return false;
    }

    let degrees: Vec<f64> = (0..n).map(|v| level.degree(v)).collect();
    let mut totals = vec![0.0; n];
    for v in 0..n {
        totals[community[v]] += degrees[v];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut moved_any = false;
    for _ in 0..MAX_PASSES {
        let mut moved = false;

        for &v in &order {
            let current = community[v];

            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for (&w, &weight) in &level.adjacency[v] {
                *links.entry(community[w]).or_insert(0.0) += weight;
            }

            totals[current] -= degrees[v];

            let gain = |target: usize, link: f64| link - resolution * totals[target] * degrees[v] / m2;
            let mut best = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));

            for (&target, &link) in &links {
                let candidate = gain(target, link);
                if candidate > best_gain + MIN_GAIN {
                    best = target;
                    best_gain = candidate;
                }
            }

            totals[best] += degrees[v];
            if best != current {
                community[v] = best;
                moved = true;
                moved_any = true;
            }
        }

        if !moved {
            break;
        }
    }

    moved_any
}

/// Louvain community detection; returns a raw community id per vertex
fn louvain(graph: &CollaborationGraph, seed: u64, resolution: f64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut level = LevelGraph::from_graph(graph);
    let mut membership: Vec<usize> = (0..graph.node_count()).collect();

    loop {
        let mut community: Vec<usize> = (0..level.len()).collect();
        if !louvain_local_moves(&level, &mut community, &mut rng, resolution) {
            break;
        }

        // Compact community ids in first-seen order
        let mut remap: BTreeMap<usize, usize> = BTreeMap::new();
        for c in community.iter_mut() {
            let next = remap.len();
            *c = *remap.entry(*c).or_insert(next);
        }

        for node_community in membership.iter_mut() {
            *node_community = community[*node_community];
        }

        let count = remap.len();
        if count == level.len() {
            break;
        }
        level = level.aggregate(&community, count);
    }

    membership
}

/// Edge betweenness over the current edge set (unweighted shortest paths)
fn edge_betweenness(adjacency: &[Vec<usize>]) -> BTreeMap<(usize, usize), f64> {
    let n = adjacency.len();
    let mut scores: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for source in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut distance = vec![-1i64; n];
        sigma[source] = 1.0;
        distance[source] = 0;

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adjacency[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                let contribution = sigma[v] / sigma[w] * (1.0 + delta[w]);
                let key = if v < w { (v, w) } else { (w, v) };
                *scores.entry(key).or_insert(0.0) += contribution;
                delta[v] += contribution;
            }
        }
    }

    scores
}

fn component_count(adjacency: &[Vec<usize>]) -> (usize, Vec<usize>) {
    let n = adjacency.len();
    let mut component = vec![usize::MAX; n];
    let mut count = 0;
    for start in 0..n {
        if component[start] != usize::MAX {
            continue;
        }
        component[start] = count;
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for &w in &adjacency[v] {
                if component[w] == usize::MAX {
                    component[w] = count;
                    stack.push(w);
                }
            }
        }
        count += 1;
    }
    (count, component)
}

/// Remove highest-betweenness edges until the graph splits further
fn girvan_newman(graph: &CollaborationGraph) -> Vec<usize> {
    let mut adjacency: Vec<Vec<usize>> = (0..graph.node_count())
        .map(|v| graph.neighbors(v).map(|(w, _)| w).collect())
        .collect();

    let (initial, mut component) = component_count(&adjacency);
    let mut remaining = graph.edge_count();

    while remaining > 0 {
        let scores = edge_betweenness(&adjacency);
        // Ties go to the smallest (u, v) pair
        let Some((&(u, v), _)) = scores
            .iter()
            .fold(None, |best: Option<(&(usize, usize), &f64)>, item| match best {
                Some(b) if *b.1 >= *item.1 => Some(b),
                _ => Some(item),
            })
        else {
            break;
        };

        adjacency[u].retain(|&w| w != v);
        adjacency[v].retain(|&w| w != u);
        remaining -= 1;

        let (count, labels) = component_count(&adjacency);
        component = labels;
        if count > initial {
            break;
        }
    }

    component
}
