//! Composite author influence score
//!
//! Standardizes every feature column, combines them with fixed weights and
//! rescales the result to [0, 100].

use crate::features::feature_matrix;
use crate::scaler::Standardizer;
use scholarnet_common::models::{FeatureColumn, FeatureVector, ScoredAuthor};
use tracing::debug;

const SCORE_SCALE: f64 = 100.0;

/// Contribution of each feature column to the raw score
pub const INFLUENCE_WEIGHTS: [(FeatureColumn, f64); 8] = [
    (FeatureColumn::TotalCitations, 0.25),
    (FeatureColumn::HIndexApprox, 0.20),
    (FeatureColumn::Pagerank, 0.15),
    (FeatureColumn::PublicationCount, 0.10),
    (FeatureColumn::BetweennessCentrality, 0.10),
    (FeatureColumn::EigenvectorCentrality, 0.10),
    (FeatureColumn::DegreeCentrality, 0.05),
    (FeatureColumn::ClosenessCentrality, 0.05),
];

/// Weight of a column; unlisted columns weigh 0
pub fn influence_weight(column: FeatureColumn) -> f64 {
    INFLUENCE_WEIGHTS
        .iter()
        .find(|(c, _)| *c == column)
        .map_or(0.0, |(_, w)| *w)
}

pub struct InfluenceScorer;

impl InfluenceScorer {
    /// Score every author; sorted by score descending, ties by name.
    ///
    /// When every author has the same raw score, all scores are 0.
    pub fn score(features: &[FeatureVector]) -> Vec<ScoredAuthor> {
        if features.is_empty() {
            return Vec::new();
        }

        let columns = FeatureColumn::ALL;
        let weights: Vec<f64> = columns.iter().map(|&c| influence_weight(c)).collect();
        let (_, standardized) = Standardizer::fit_transform(&feature_matrix(features, &columns));

        let raw: Vec<f64> = standardized
            .iter()
            .map(|row| row.iter().zip(&weights).map(|(z, w)| z * w).sum())
            .collect();

        let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
        let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let mut scored: Vec<ScoredAuthor> = features
            .iter()
            .zip(&raw)
            .map(|(f, &r)| ScoredAuthor {
                features: f.clone(),
                influence_score: if range > 0.0 {
                    (r - min) / range * SCORE_SCALE
                } else {
                    0.0
                },
            })
            .collect();

        scored.sort_by(|a, b| {
            b.influence_score
                .total_cmp(&a.influence_score)
                .then_with(|| a.features.author_name.cmp(&b.features.author_name))
        });

        debug!(authors = scored.len(), raw_min = min, raw_max = max, "Influence scores computed");
        scored
    }
}

/// The `n` highest-scoring authors of an already sorted table
pub fn top_influential(scored: &[ScoredAuthor], n: usize) -> Vec<ScoredAuthor> {
    scored.iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str, citations: u64, pagerank: f64) -> FeatureVector {
        FeatureVector {
            author_name: name.to_string(),
            publication_count: 1,
            total_citations: citations,
            avg_citations_per_paper: citations as f64,
            h_index_approx: 1,
            degree: 1,
            pagerank,
            ..FeatureVector::default()
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = INFLUENCE_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(influence_weight(FeatureColumn::Degree), 0.0);
        assert_eq!(influence_weight(FeatureColumn::AvgCitationsPerPaper), 0.0);
    }

    #[test]
    fn test_scores_span_zero_to_hundred() {
        let scored = InfluenceScorer::score(&[
            author("low", 1, 0.1),
            author("mid", 5, 0.3),
            author("high", 20, 0.6),
        ]);

        assert_eq!(scored[0].features.author_name, "high");
        assert!((scored[0].influence_score - 100.0).abs() < 1e-9);
        assert_eq!(scored[2].features.author_name, "low");
        assert!(scored[2].influence_score.abs() < 1e-9);
        assert!(scored.iter().all(|s| (0.0..=100.0).contains(&s.influence_score)));
    }

    #[test]
    fn test_constant_columns_score_zero() {
        let scored = InfluenceScorer::score(&[author("bob", 3, 0.5), author("ada", 3, 0.5)]);
        assert!(scored.iter().all(|s| s.influence_score == 0.0));
        // equal scores fall back to name order
        assert_eq!(scored[0].features.author_name, "ada");
    }

    #[test]
    fn test_constant_citations_do_not_change_ranking() {
        let varied = |citations: u64| {
            vec![
                FeatureVector {
                    total_citations: citations,
                    h_index_approx: 4,
                    pagerank: 0.5,
                    ..author("ada", 0, 0.0)
                },
                FeatureVector {
                    total_citations: citations,
                    h_index_approx: 2,
                    pagerank: 0.3,
                    publication_count: 3,
                    ..author("bob", 0, 0.0)
                },
                FeatureVector {
                    total_citations: citations,
                    h_index_approx: 1,
                    pagerank: 0.2,
                    ..author("cy", 0, 0.0)
                },
            ]
        };

        let with_citations = InfluenceScorer::score(&varied(100));
        let without_citations = InfluenceScorer::score(&varied(0));

        let order = |scored: &[ScoredAuthor]| -> Vec<String> {
            scored.iter().map(|s| s.features.author_name.clone()).collect()
        };
        assert_eq!(order(&with_citations), vec!["ada", "bob", "cy"]);
        assert_eq!(order(&with_citations), order(&without_citations));
        for (a, b) in with_citations.iter().zip(&without_citations) {
            assert!((a.influence_score - b.influence_score).abs() < 1e-9);
        }
        assert!((with_citations[0].influence_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_author() {
        let scored = InfluenceScorer::score(&[author("solo", 10, 1.0)]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].influence_score, 0.0);
    }

    #[test]
    fn test_top_influential() {
        let scored = InfluenceScorer::score(&[
            author("a", 1, 0.1),
            author("b", 2, 0.2),
            author("c", 3, 0.3),
        ]);
        let top = top_influential(&scored, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].features.author_name, "c");
        assert!(top_influential(&scored, 10).len() == 3);
    }
}
