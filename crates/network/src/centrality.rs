//! Structural centrality measures
//!
//! All measures treat the graph as unweighted (hop distances, adjacency
//! counts) and return one value per vertex in index order.

use crate::graph::CollaborationGraph;
use scholarnet_common::errors::{AppError, Result};
use std::collections::VecDeque;

/// Degree normalized by the number of other vertices
pub fn degree_centrality(graph: &CollaborationGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|v| graph.degree(v) as f64 * scale).collect()
}

/// Betweenness centrality (Brandes), normalized over vertex pairs.
///
/// Each unordered pair is visited from both endpoints, so the accumulated
/// dependency is scaled by `1 / ((n - 1)(n - 2))`.
pub fn betweenness_centrality(graph: &CollaborationGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];

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
            for (w, _) in graph.neighbors(v) {
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
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in &mut centrality {
            *value *= scale;
        }
    }

    centrality
}

/// Hop distances from `source`; unreachable vertices are `None`
fn bfs_distances(graph: &CollaborationGraph, source: usize) -> Vec<Option<usize>> {
    let mut distance = vec![None; graph.node_count()];
    distance[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        let next = distance[v].map_or(0, |d| d + 1);
        for (w, _) in graph.neighbors(v) {
            if distance[w].is_none() {
                distance[w] = Some(next);
                queue.push_back(w);
            }
        }
    }
    distance
}

/// Closeness centrality with the Wasserman-Faust correction for
/// disconnected graphs: `((r - 1) / Σd) * ((r - 1) / (n - 1))` where `r`
/// counts the vertices reachable from `v` (itself included).
pub fn closeness_centrality(graph: &CollaborationGraph) -> Vec<f64> {
    let n = graph.node_count();
    (0..n)
        .map(|v| {
            let distances = bfs_distances(graph, v);
            let reachable = distances.iter().filter(|d| d.is_some()).count();
            let total: usize = distances.iter().flatten().sum();
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let r = (reachable - 1) as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

/// Eigenvector centrality by power iteration on `A + I`.
///
/// Starts from the uniform vector, L2-normalizes every step and stops when
/// the L1 change drops below `n * tolerance`. Exhausting the budget yields
/// [`AppError::Convergence`].
pub fn eigenvector_centrality(
    graph: &CollaborationGraph,
    max_iterations: usize,
    tolerance: f64,
) -> Result<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..max_iterations {
        let last = x.clone();
        for (v, &value) in last.iter().enumerate() {
            for (w, _) in graph.neighbors(v) {
                x[w] += value;
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm > 0.0 { norm } else { 1.0 };
        for value in &mut x {
            *value /= norm;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tolerance {
            return Ok(x);
        }
    }

    Err(AppError::Convergence {
        algorithm: "eigenvector_centrality".to_string(),
        iterations: max_iterations,
    })
}
