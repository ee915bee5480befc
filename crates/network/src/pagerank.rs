//! PageRank-based author scoring
//!
//! Weighted PageRank over the undirected collaboration graph: a random
//! walker follows an incident edge with probability proportional to its
//! weight, and teleports uniformly with probability `1 - damping`.

use crate::graph::CollaborationGraph;
use tracing::warn;

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (typically 0.85)
    pub damping: f64,

    /// Maximum iterations
    pub max_iterations: usize,

    /// Convergence threshold (per vertex, L1)
    pub epsilon: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            epsilon: 1e-6,
        }
    }
}

/// Outcome of one PageRank computation
#[derive(Debug, Clone)]
pub struct PageRankRun {
    /// Score per vertex in index order, summing to 1
    pub scores: Vec<f64>,

    /// Iterations performed
    pub iterations: usize,

    /// Whether the tolerance was reached within the budget
    pub converged: bool,
}

/// PageRank scorer for authors
pub struct PageRankScorer {
    config: PageRankConfig,
}

impl PageRankScorer {
    /// Create a new scorer
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// Compute PageRank scores for all authors.
    ///
    /// A run that exhausts its budget returns the last iterate with
    /// `converged == false`; scores are renormalized to sum to 1 either way.
    pub fn compute(&self, graph: &CollaborationGraph) -> PageRankRun {
        let n = graph.node_count();
        if n == 0 {
            return PageRankRun {
                scores: Vec::new(),
                iterations: 0,
                converged: true,
            };
        }

        let n_f64 = n as f64;
        let damping = self.config.damping;
        let uniform = 1.0 / n_f64;

        // Precompute weighted degrees; zero means the vertex is dangling
        let out_weights: Vec<f64> = (0..n).map(|v| graph.weighted_degree(v)).collect();
        let dangling: Vec<usize> = (0..n).filter(|&v| out_weights[v] == 0.0).collect();

        let mut scores = vec![uniform; n];
        let mut iterations = 0;
        let mut converged = false;

        // Iterative computation
        while iterations < self.config.max_iterations {
            iterations += 1;
            let last = std::mem::replace(&mut scores, vec![0.0; n]);

            let dangling_sum: f64 = damping * dangling.iter().map(|&v| last[v]).sum::<f64>();

            for (v, &score) in last.iter().enumerate() {
                if out_weights[v] == 0.0 {
                    continue;
                }
                let share = damping * score / out_weights[v];
                for (w, weight) in graph.neighbors(v) {
                    scores[w] += share * weight as f64;
                }
            }

            let base = (dangling_sum + 1.0 - damping) * uniform;
            for score in &mut scores {
                *score += base;
            }

            // Check convergence
            let diff: f64 = scores.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
            if diff < n_f64 * self.config.epsilon {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                iterations,
                nodes = n,
                "PageRank did not converge, using last iterate"
            );
        }

        let total: f64 = scores.iter().sum();
        if total > 0.0 {
            for score in &mut scores {
                *score /= total;
            }
        }

        PageRankRun {
            scores,
            iterations,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star() -> CollaborationGraph {
        CollaborationGraph::from_weighted_pairs(vec![
            ("hub".into(), "a".into(), 1),
            ("hub".into(), "b".into(), 1),
            ("hub".into(), "c".into(), 1),
            ("a".into(), "b".into(), 1),
        ])
    }

    #[test]
    fn test_pagerank_basic() {
        let graph = star();
        let scorer = PageRankScorer::new(PageRankConfig::default());
        let run = scorer.compute(&graph);

        let hub = graph.index_of("hub").unwrap();
        let c = graph.index_of("c").unwrap();

        assert!(run.converged);
        assert!(run.scores[hub] > run.scores[c], "hub should rank above a leaf");
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        let graph = star();
        let run = PageRankScorer::new(PageRankConfig::default()).compute(&graph);
        let total: f64 = run.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pagerank_weights_matter() {
        // Stationary mass follows weighted degree: b (5) over c (2)
        let graph = CollaborationGraph::from_weighted_pairs(vec![
            ("a".into(), "b".into(), 5),
            ("a".into(), "c".into(), 1),
            ("c".into(), "d".into(), 1),
        ]);
        let run = PageRankScorer::new(PageRankConfig::default()).compute(&graph);
        let b = graph.index_of("b").unwrap();
        let c = graph.index_of("c").unwrap();
        assert!(run.scores[b] > run.scores[c]);
    }

    #[test]
    fn test_pagerank_budget_exhausted_still_normalized() {
        let graph = star();
        let config = PageRankConfig {
            max_iterations: 1,
            ..PageRankConfig::default()
        };
        let run = PageRankScorer::new(config).compute(&graph);
        assert!(!run.converged);
        let total: f64 = run.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pagerank_empty_graph() {
        let graph = CollaborationGraph::new();
        let scorer = PageRankScorer::new(PageRankConfig::default());
        let run = scorer.compute(&graph);

        assert!(run.scores.is_empty());
    }
}
