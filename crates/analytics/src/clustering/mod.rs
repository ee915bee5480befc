//! Author clustering
//!
//! Groups authors with similar bibliometric and structural profiles.
//! Features are standardized before clustering; citation totals are left
//! out since they are the prediction target.

mod dbscan;
mod kmeans;
mod pca;

pub use dbscan::Dbscan;
pub use kmeans::{KMeans, KMeansFit};
pub use pca::Pca;

use crate::features::feature_matrix;
use crate::scaler::Standardizer;
use scholarnet_common::config::{ClusterMethod, ClusteringConfig};
use scholarnet_common::models::{ClusterAssignment, FeatureColumn, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Columns used for clustering
pub fn clustering_columns() -> Vec<FeatureColumn> {
    FeatureColumn::all_except(&[FeatureColumn::TotalCitations])
}

/// Author position in the 2-D principal component plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedAuthor {
    pub author_name: String,
    pub cluster_label: i32,
    pub pca_1: f64,
    pub pca_2: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusteringResult {
    /// One label per author, in input order
    pub assignments: Vec<ClusterAssignment>,

    /// Same authors and labels, placed in the PCA plane
    pub projection: Vec<ProjectedAuthor>,

    /// Distinct non-noise labels
    pub cluster_count: usize,

    pub noise_count: usize,
}

pub struct AuthorClusterer {
    config: ClusteringConfig,
}

impl AuthorClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn cluster(&self, features: &[FeatureVector]) -> ClusteringResult {
        if features.is_empty() {
            return ClusteringResult::default();
        }

        let (_, x) = Standardizer::fit_transform(&feature_matrix(features, &clustering_columns()));

        let labels: Vec<i32> = match self.config.method {
            ClusterMethod::KMeans => {
                let fit = KMeans {
                    n_clusters: self.config.n_clusters,
                    n_init: self.config.n_init,
                    max_iter: self.config.max_iter,
                    tol: self.config.tol,
                    seed: self.config.seed,
                }
                .fit(&x);
                fit.labels.into_iter().map(|l| l as i32).collect()
            }
            ClusterMethod::Dbscan => Dbscan {
                eps: self.config.eps,
                min_samples: self.config.min_samples,
            }
            .fit(&x),
        };

        let pca = Pca::fit(&x, 2);
        let projected = pca.transform(&x);

        let assignments: Vec<ClusterAssignment> = features
            .iter()
            .zip(&labels)
            .map(|(f, &cluster_label)| ClusterAssignment {
                author_name: f.author_name.clone(),
                cluster_label,
            })
            .collect();

        let projection = assignments
            .iter()
            .zip(&projected)
            .map(|(a, point)| ProjectedAuthor {
                author_name: a.author_name.clone(),
                cluster_label: a.cluster_label,
                pca_1: point[0],
                pca_2: point[1],
            })
            .collect();

        let cluster_count = labels
            .iter()
            .filter(|&&l| l != ClusterAssignment::NOISE)
            .collect::<BTreeSet<_>>()
            .len();
        let noise_count = assignments.iter().filter(|a| a.is_noise()).count();

        info!(
            method = ?self.config.method,
            authors = assignments.len(),
            clusters = cluster_count,
            noise = noise_count,
            "Authors clustered"
        );

        ClusteringResult {
            assignments,
            projection,
            cluster_count,
            noise_count,
        }
    }
}
