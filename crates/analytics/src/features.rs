//! Feature table assembly

use scholarnet_common::models::{AuthorStats, FeatureColumn, FeatureVector, NetworkMetricRow};
use std::collections::BTreeMap;
use tracing::debug;

/// Joins bibliometric statistics with network metrics
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Inner join on author name, sorted by name.
    ///
    /// Authors present on only one side are dropped; a repeated name keeps
    /// its first row.
    pub fn assemble(stats: &[AuthorStats], metrics: &[NetworkMetricRow]) -> Vec<FeatureVector> {
        let mut stats_by_name: BTreeMap<&str, &AuthorStats> = BTreeMap::new();
        for row in stats {
            stats_by_name.entry(row.author_name.as_str()).or_insert(row);
        }

        let mut metrics_by_name: BTreeMap<&str, &NetworkMetricRow> = BTreeMap::new();
        for row in metrics {
            metrics_by_name.entry(row.author_name.as_str()).or_insert(row);
        }

        let features: Vec<FeatureVector> = stats_by_name
            .iter()
            .filter_map(|(name, s)| metrics_by_name.get(name).map(|m| FeatureVector::from_parts(s, m)))
            .collect();

        debug!(
            stats_only = stats_by_name.len() - features.len(),
            metrics_only = metrics_by_name.len() - features.len(),
            joined = features.len(),
            "Feature table assembled"
        );

        features
    }
}

/// Row-major matrix of the given columns
pub fn feature_matrix(features: &[FeatureVector], columns: &[FeatureColumn]) -> Vec<Vec<f64>> {
    features.iter().map(|f| f.values(columns)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(name: &str, citations: u64) -> AuthorStats {
        AuthorStats {
            author_name: name.to_string(),
            publication_count: 1,
            total_citations: citations,
            avg_citations_per_paper: citations as f64,
            h_index_approx: 1,
        }
    }

    fn metric(name: &str, degree: u32) -> NetworkMetricRow {
        NetworkMetricRow {
            author_name: name.to_string(),
            degree,
            ..NetworkMetricRow::default()
        }
    }

    #[test]
    fn test_inner_join() {
        let features = FeatureAssembler::assemble(
            &[stats("solo", 9), stats("bob", 2), stats("ada", 5)],
            &[metric("ada", 1), metric("bob", 1), metric("ghost", 3)],
        );

        let names: Vec<&str> = features.iter().map(|f| f.author_name.as_str()).collect();
        assert_eq!(names, vec!["ada", "bob"]);
        assert_eq!(features[0].total_citations, 5);
        assert_eq!(features[0].degree, 1);
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let features = FeatureAssembler::assemble(
            &[stats("ada", 5), stats("ada", 50)],
            &[metric("ada", 1), metric("ada", 7)],
        );
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].total_citations, 5);
        assert_eq!(features[0].degree, 1);
    }

    #[test]
    fn test_feature_matrix() {
        let features = FeatureAssembler::assemble(&[stats("ada", 5)], &[metric("ada", 2)]);
        let matrix = feature_matrix(&features, &[FeatureColumn::Degree, FeatureColumn::TotalCitations]);
        assert_eq!(matrix, vec![vec![2.0, 5.0]]);
    }
}
