//! Per-author tables: statistics, network metrics, features and scores

use serde::{Deserialize, Serialize};

/// Bibliometric statistics for one normalized author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub author_name: String,

    /// Number of publications listing this author
    pub publication_count: u32,

    /// Sum of citation counts over those publications
    pub total_citations: u64,

    pub avg_citations_per_paper: f64,

    /// Largest h with h publications cited at least h times each
    pub h_index_approx: u32,
}

/// Structural metrics for one vertex of the collaboration graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetricRow {
    pub author_name: String,

    /// Number of distinct co-authors
    pub degree: u32,

    pub degree_centrality: f64,

    pub betweenness_centrality: f64,

    pub closeness_centrality: f64,

    pub eigenvector_centrality: f64,

    /// Stationary visit probability, sums to 1 across the graph
    pub pagerank: f64,
}

/// Numeric columns of the feature table, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    PublicationCount,
    TotalCitations,
    AvgCitationsPerPaper,
    HIndexApprox,
    Degree,
    DegreeCentrality,
    BetweennessCentrality,
    ClosenessCentrality,
    EigenvectorCentrality,
    Pagerank,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 10] = [
        FeatureColumn::PublicationCount,
        FeatureColumn::TotalCitations,
        FeatureColumn::AvgCitationsPerPaper,
        FeatureColumn::HIndexApprox,
        FeatureColumn::Degree,
        FeatureColumn::DegreeCentrality,
        FeatureColumn::BetweennessCentrality,
        FeatureColumn::ClosenessCentrality,
        FeatureColumn::EigenvectorCentrality,
        FeatureColumn::Pagerank,
    ];

    /// Column name used in output tables
    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::PublicationCount => "publication_count",
            FeatureColumn::TotalCitations => "total_citations",
            FeatureColumn::AvgCitationsPerPaper => "avg_citations_per_paper",
            FeatureColumn::HIndexApprox => "h_index_approx",
            FeatureColumn::Degree => "degree",
            FeatureColumn::DegreeCentrality => "degree_centrality",
            FeatureColumn::BetweennessCentrality => "betweenness_centrality",
            FeatureColumn::ClosenessCentrality => "closeness_centrality",
            FeatureColumn::EigenvectorCentrality => "eigenvector_centrality",
            FeatureColumn::Pagerank => "pagerank",
        }
    }

    /// Every column except the given ones, in canonical order
    pub fn all_except(excluded: &[FeatureColumn]) -> Vec<FeatureColumn> {
        Self::ALL
            .iter()
            .copied()
            .filter(|c| !excluded.contains(c))
            .collect()
    }
}

impl std::fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Joined bibliometric and structural features for one author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub author_name: String,
    pub publication_count: u32,
    pub total_citations: u64,
    pub avg_citations_per_paper: f64,
    pub h_index_approx: u32,
    pub degree: u32,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub closeness_centrality: f64,
    pub eigenvector_centrality: f64,
    pub pagerank: f64,
}

impl FeatureVector {
    /// Merge one statistics row and one metric row describing the same author
    pub fn from_parts(stats: &AuthorStats, metrics: &NetworkMetricRow) -> Self {
        Self {
            author_name: stats.author_name.clone(),
            publication_count: stats.publication_count,
            total_citations: stats.total_citations,
            avg_citations_per_paper: finite_or_zero(stats.avg_citations_per_paper),
            h_index_approx: stats.h_index_approx,
            degree: metrics.degree,
            degree_centrality: finite_or_zero(metrics.degree_centrality),
            betweenness_centrality: finite_or_zero(metrics.betweenness_centrality),
            closeness_centrality: finite_or_zero(metrics.closeness_centrality),
            eigenvector_centrality: finite_or_zero(metrics.eigenvector_centrality),
            pagerank: finite_or_zero(metrics.pagerank),
        }
    }

    /// Value of a numeric column as f64
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::PublicationCount => self.publication_count as f64,
            FeatureColumn::TotalCitations => self.total_citations as f64,
            FeatureColumn::AvgCitationsPerPaper => self.avg_citations_per_paper,
            FeatureColumn::HIndexApprox => self.h_index_approx as f64,
            FeatureColumn::Degree => self.degree as f64,
            FeatureColumn::DegreeCentrality => self.degree_centrality,
            FeatureColumn::BetweennessCentrality => self.betweenness_centrality,
            FeatureColumn::ClosenessCentrality => self.closeness_centrality,
            FeatureColumn::EigenvectorCentrality => self.eigenvector_centrality,
            FeatureColumn::Pagerank => self.pagerank,
        }
    }

    /// Values of the given columns, in the given order
    pub fn values(&self, columns: &[FeatureColumn]) -> Vec<f64> {
        columns.iter().map(|&c| self.value(c)).collect()
    }
}

/// Missing values are filled with 0
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Feature row augmented with the composite influence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAuthor {
    pub features: FeatureVector,

    /// Composite score in [0, 100]
    pub influence_score: f64,
}

/// Cluster label for one author; -1 marks density-based noise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub author_name: String,
    pub cluster_label: i32,
}

impl ClusterAssignment {
    pub const NOISE: i32 = -1;

    pub fn is_noise(&self) -> bool {
        self.cluster_label == Self::NOISE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureVector {
        let stats = AuthorStats {
            author_name: "ada lovelace".into(),
            publication_count: 3,
            total_citations: 30,
            avg_citations_per_paper: 10.0,
            h_index_approx: 3,
        };
        let metrics = NetworkMetricRow {
            author_name: "ada lovelace".into(),
            degree: 2,
            degree_centrality: 1.0,
            betweenness_centrality: 1.0,
            closeness_centrality: 1.0,
            eigenvector_centrality: f64::NAN,
            pagerank: 0.5,
        };
        FeatureVector::from_parts(&stats, &metrics)
    }

    #[test]
    fn test_column_values() {
        let fv = sample();
        assert_eq!(fv.value(FeatureColumn::TotalCitations), 30.0);
        assert_eq!(fv.value(FeatureColumn::Degree), 2.0);
        assert_eq!(fv.value(FeatureColumn::EigenvectorCentrality), 0.0);
    }

    #[test]
    fn test_all_except() {
        let cols = FeatureColumn::all_except(&[FeatureColumn::TotalCitations]);
        assert_eq!(cols.len(), 9);
        assert!(!cols.contains(&FeatureColumn::TotalCitations));
        assert_eq!(cols[0], FeatureColumn::PublicationCount);
    }
}
