//! Output tables and run manifest
//!
//! Every artifact is rendered to bytes first so a run can be compared or
//! hashed before anything touches the disk.

use crate::runner::PipelineOutput;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::metrics::record_rows_written;
use scholarnet_common::models::{FeatureColumn, FeatureVector, ScoredAuthor};
use scholarnet_common::VERSION;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub const AUTHOR_IMPACT_SCORES: &str = "author_impact_scores.csv";
pub const NETWORK_METRICS: &str = "network_metrics.csv";
pub const TOP_INFLUENTIAL_AUTHORS: &str = "top_influential_authors.csv";
pub const CLUSTERED_AUTHORS: &str = "clustered_authors.csv";
pub const CLUSTER_PROJECTION: &str = "cluster_projection.csv";
pub const COMMUNITIES: &str = "communities.csv";
pub const MODEL_COMPARISON: &str = "model_comparison.json";
pub const NETWORK_VIEW: &str = "network_view.json";
pub const RUN_MANIFEST: &str = "run_manifest.json";
pub const METRICS_SNAPSHOT: &str = "pipeline_metrics.prom";

const NETWORK_METRICS_HEADER: [&str; 7] = [
    "author_name",
    "degree",
    "degree_centrality",
    "betweenness_centrality",
    "closeness_centrality",
    "eigenvector_centrality",
    "pagerank",
];
const PROJECTION_HEADER: [&str; 4] = ["author_name", "cluster_label", "pca_1", "pca_2"];
const COMMUNITIES_HEADER: [&str; 2] = ["author_name", "community"];

/// `author_name`, every feature column in canonical order, then `trailing`
fn feature_header(trailing: &'static str) -> Vec<&'static str> {
    std::iter::once("author_name")
        .chain(FeatureColumn::ALL.iter().map(|c| c.name()))
        .chain(std::iter::once(trailing))
        .collect()
}

/// Feature table row plus the influence score, flattened for CSV
#[derive(Debug, Serialize)]
struct ScoredRow<'a> {
    author_name: &'a str,
    publication_count: u32,
    total_citations: u64,
    avg_citations_per_paper: f64,
    h_index_approx: u32,
    degree: u32,
    degree_centrality: f64,
    betweenness_centrality: f64,
    closeness_centrality: f64,
    eigenvector_centrality: f64,
    pagerank: f64,
    influence_score: f64,
}

impl<'a> From<&'a ScoredAuthor> for ScoredRow<'a> {
    fn from(scored: &'a ScoredAuthor) -> Self {
        let f = &scored.features;
        Self {
            author_name: &f.author_name,
            publication_count: f.publication_count,
            total_citations: f.total_citations,
            avg_citations_per_paper: f.avg_citations_per_paper,
            h_index_approx: f.h_index_approx,
            degree: f.degree,
            degree_centrality: f.degree_centrality,
            betweenness_centrality: f.betweenness_centrality,
            closeness_centrality: f.closeness_centrality,
            eigenvector_centrality: f.eigenvector_centrality,
            pagerank: f.pagerank,
            influence_score: scored.influence_score,
        }
    }
}

/// Feature table row plus the cluster label, flattened for CSV
#[derive(Debug, Serialize)]
struct ClusteredRow<'a> {
    author_name: &'a str,
    publication_count: u32,
    total_citations: u64,
    avg_citations_per_paper: f64,
    h_index_approx: u32,
    degree: u32,
    degree_centrality: f64,
    betweenness_centrality: f64,
    closeness_centrality: f64,
    eigenvector_centrality: f64,
    pagerank: f64,
    cluster_label: i32,
}

impl<'a> ClusteredRow<'a> {
    fn new(f: &'a FeatureVector, cluster_label: i32) -> Self {
        Self {
            author_name: &f.author_name,
            publication_count: f.publication_count,
            total_citations: f.total_citations,
            avg_citations_per_paper: f.avg_citations_per_paper,
            h_index_approx: f.h_index_approx,
            degree: f.degree,
            degree_centrality: f.degree_centrality,
            betweenness_centrality: f.betweenness_centrality,
            closeness_centrality: f.closeness_centrality,
            eigenvector_centrality: f.eigenvector_centrality,
            pagerank: f.pagerank,
            cluster_label,
        }
    }
}

#[derive(Debug, Serialize)]
struct CommunityRow<'a> {
    author_name: &'a str,
    community: usize,
}

/// Row count and digest of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

/// Contents of `run_manifest.json`; free of timestamps so identical runs
/// produce identical manifests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: String,
    pub input_records: usize,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub rows: usize,
}

/// Every rendered artifact of a run, keyed by file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBundle {
    pub artifacts: BTreeMap<&'static str, Artifact>,
    pub manifest: RunManifest,
}

/// Serialize rows with a header line; `header` is written on its own when
/// there are no rows, since serde headers only come with the first record
fn csv_bytes<T: Serialize>(header: &[&str], rows: impl IntoIterator<Item = T>) -> Result<Artifact> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    if count == 0 {
        writer.write_record(header)?;
    }
    let bytes = writer.into_inner().map_err(|e| AppError::Internal {
        message: format!("CSV buffer flush failed: {}", e),
    })?;
    Ok(Artifact { bytes, rows: count })
}

fn json_bytes<T: Serialize>(value: &T, rows: usize) -> Result<Artifact> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(Artifact { bytes, rows })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl OutputBundle {
    /// Render every output table of a run
    pub fn render(output: &PipelineOutput) -> Result<Self> {
        let mut artifacts = BTreeMap::new();

        artifacts.insert(
            AUTHOR_IMPACT_SCORES,
            csv_bytes(
                &feature_header("influence_score"),
                output.scored.iter().map(ScoredRow::from),
            )?,
        );
        artifacts.insert(NETWORK_METRICS, csv_bytes(&NETWORK_METRICS_HEADER, &output.metrics)?);
        artifacts.insert(
            TOP_INFLUENTIAL_AUTHORS,
            csv_bytes(
                &feature_header("influence_score"),
                output.top_influential.iter().map(ScoredRow::from),
            )?,
        );
        artifacts.insert(
            CLUSTERED_AUTHORS,
            csv_bytes(
                &feature_header("cluster_label"),
                output
                    .features
                    .iter()
                    .zip(&output.clustering.assignments)
                    .map(|(f, a)| ClusteredRow::new(f, a.cluster_label)),
            )?,
        );
        artifacts.insert(
            CLUSTER_PROJECTION,
            csv_bytes(&PROJECTION_HEADER, &output.clustering.projection)?,
        );
        artifacts.insert(
            COMMUNITIES,
            csv_bytes(&COMMUNITIES_HEADER, output.partition.assignments.iter().map(|(author, &community)| {
                CommunityRow {
                    author_name: author,
                    community,
                }
            }))?,
        );
        artifacts.insert(
            MODEL_COMPARISON,
            json_bytes(&output.prediction, output.prediction.results.len())?,
        );
        artifacts.insert(NETWORK_VIEW, json_bytes(&output.view, output.view.nodes.len())?);

        let manifest = RunManifest {
            version: VERSION.to_string(),
            input_records: output.records_loaded,
            files: artifacts
                .iter()
                .map(|(file, artifact)| ManifestEntry {
                    file: file.to_string(),
                    rows: artifact.rows,
                    sha256: sha256_hex(&artifact.bytes),
                })
                .collect(),
        };

        Ok(Self { artifacts, manifest })
    }

    /// Write every artifact and the manifest into `dir`, replacing old files
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| AppError::OutputWrite {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        for (file, artifact) in &self.artifacts {
            write_file(&dir.join(file), &artifact.bytes)?;
            record_rows_written(file, artifact.rows);
        }

        let manifest = json_bytes(&self.manifest, self.manifest.files.len())?;
        write_file(&dir.join(RUN_MANIFEST), &manifest.bytes)?;

        info!(
            dir = %dir.display(),
            files = self.artifacts.len() + 1,
            "Results written"
        );
        Ok(())
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| AppError::OutputWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarnet_common::models::NetworkMetricRow;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_csv_headers_are_flat() {
        let scored = ScoredAuthor {
            features: FeatureVector {
                author_name: "ada".into(),
                publication_count: 2,
                ..FeatureVector::default()
            },
            influence_score: 50.0,
        };
        let header = feature_header("influence_score");
        let artifact = csv_bytes(&header, std::iter::once(ScoredRow::from(&scored))).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        let first_line = text.lines().next().unwrap();

        assert_eq!(artifact.rows, 1);
        assert!(first_line.starts_with("author_name,publication_count,total_citations"));
        assert!(first_line.ends_with("pagerank,influence_score"));
        // the fallback header matches what serde derives from the row
        assert_eq!(first_line, header.join(","));
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let artifact = csv_bytes(&COMMUNITIES_HEADER, Vec::<CommunityRow>::new()).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();

        assert_eq!(artifact.rows, 0);
        assert_eq!(text, "author_name,community\n");
    }

    #[test]
    fn test_fixed_headers_match_rows() {
        let metrics = vec![NetworkMetricRow {
            author_name: "ada".into(),
            ..NetworkMetricRow::default()
        }];
        let artifact = csv_bytes(&NETWORK_METRICS_HEADER, &metrics).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text.lines().next().unwrap(), NETWORK_METRICS_HEADER.join(","));

        let row = CommunityRow {
            author_name: "ada",
            community: 0,
        };
        let artifact = csv_bytes(&COMMUNITIES_HEADER, std::iter::once(row)).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text.lines().next().unwrap(), COMMUNITIES_HEADER.join(","));

        let clustered = FeatureVector::default();
        let artifact = csv_bytes(
            &feature_header("cluster_label"),
            std::iter::once(ClusteredRow::new(&clustered, -1)),
        )
        .unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text.lines().next().unwrap(), feature_header("cluster_label").join(","));
    }
}
