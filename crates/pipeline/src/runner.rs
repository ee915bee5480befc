//! Pipeline orchestration
//!
//! Runs every analysis stage in order over an in-memory set of records.
//! Stages never fail: degenerate inputs produce empty tables.

use scholarnet_analytics::{
    author_statistics, clean_publications, top_authors, top_influential, AuthorClusterer,
    CitationPredictor, ClusteringResult, FeatureAssembler, InfluenceScorer, PredictionReport,
    PredictorConfig, StatsRanking,
};
use scholarnet_common::config::AppConfig;
use scholarnet_common::metrics::{record_communities, record_graph, record_records, StageTimer};
use scholarnet_common::models::{
    AuthorStats, FeatureVector, NetworkMetricRow, PublicationRecord, ScoredAuthor,
};
use scholarnet_network::{
    top_connectors, CollaborationGraph, CommunityConfig, CommunityDetector, GraphBuilder,
    MetricsConfig, NetworkMetricsEngine, NetworkView, Partition, ViewConfig,
};
use tracing::{info, instrument};

/// Authors listed in the run summary log
const SUMMARY_AUTHORS: usize = 10;

/// Everything a run produces, before it is written out
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records_loaded: usize,
    pub records_kept: usize,
    pub author_stats: Vec<AuthorStats>,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub metrics: Vec<NetworkMetricRow>,
    pub top_connectors: Vec<NetworkMetricRow>,
    pub partition: Partition,
    pub features: Vec<FeatureVector>,
    pub scored: Vec<ScoredAuthor>,
    pub top_influential: Vec<ScoredAuthor>,
    pub prediction: PredictionReport,
    pub clustering: ClusteringResult,
    pub view: NetworkView,
}

/// Run every stage over the loaded records
#[instrument(skip_all, fields(records = records.len()))]
pub fn run(records: &[PublicationRecord], config: &AppConfig) -> PipelineOutput {
    let cleaned = clean_stage(records);
    let author_stats = statistics_stage(&cleaned);
    let graph = graph_stage(&cleaned);

    let metrics = metrics_stage(&graph, config);
    let connectors = top_connectors(&metrics, config.network.top_connectors);
    for row in &connectors {
        info!(author = %row.author_name, degree = row.degree, "Top connector");
    }

    let partition = community_stage(&graph, config);
    let features = feature_stage(&author_stats, &metrics);
    let scored = scoring_stage(&features);
    let top = top_influential(&scored, config.scoring.top_n);
    let prediction = prediction_stage(&features, config);
    let clustering = clustering_stage(&features, config);
    let view = view_stage(&graph, &metrics, &partition, config);

    PipelineOutput {
        records_loaded: records.len(),
        records_kept: cleaned.len(),
        author_stats,
        graph_nodes: graph.node_count(),
        graph_edges: graph.edge_count(),
        metrics,
        top_connectors: connectors,
        partition,
        features,
        scored,
        top_influential: top,
        prediction,
        clustering,
        view,
    }
}

#[instrument(skip_all)]
fn clean_stage(records: &[PublicationRecord]) -> Vec<PublicationRecord> {
    let timer = StageTimer::start("clean");
    let cleaned = clean_publications(records);
    record_records(records.len(), records.len() - cleaned.len());
    info!(
        loaded = records.len(),
        kept = cleaned.len(),
        elapsed = timer.finish(),
        "Publications cleaned"
    );
    cleaned
}

#[instrument(skip_all)]
fn statistics_stage(records: &[PublicationRecord]) -> Vec<AuthorStats> {
    let timer = StageTimer::start("statistics");
    let stats = author_statistics(records);
    for author in top_authors(&stats, SUMMARY_AUTHORS, StatsRanking::TotalCitations) {
        info!(
            author = %author.author_name,
            total_citations = author.total_citations,
            publications = author.publication_count,
            h_index = author.h_index_approx,
            "Top cited author"
        );
    }
    info!(authors = stats.len(), elapsed = timer.finish(), "Author statistics computed");
    stats
}

#[instrument(skip_all)]
fn graph_stage(records: &[PublicationRecord]) -> CollaborationGraph {
    let timer = StageTimer::start("graph");
    let graph = GraphBuilder::from_records(records);
    record_graph(graph.node_count(), graph.edge_count());
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        elapsed = timer.finish(),
        "Collaboration graph built"
    );
    graph
}

#[instrument(skip_all)]
fn metrics_stage(graph: &CollaborationGraph, config: &AppConfig) -> Vec<NetworkMetricRow> {
    let timer = StageTimer::start("network_metrics");
    let rows = NetworkMetricsEngine::new(MetricsConfig::from(&config.network)).compute(graph);
    info!(rows = rows.len(), elapsed = timer.finish(), "Network metrics computed");
    rows
}

#[instrument(skip_all)]
fn community_stage(graph: &CollaborationGraph, config: &AppConfig) -> Partition {
    let timer = StageTimer::start("communities");
    let community_config = CommunityConfig::from(&config.network);
    let algorithm = community_config.algorithm.name();
    let partition = CommunityDetector::new(community_config).detect(graph);
    record_communities(partition.community_count(), algorithm);
    info!(
        communities = partition.community_count(),
        modularity = partition.modularity,
        elapsed = timer.finish(),
        "Communities detected"
    );
    partition
}

#[instrument(skip_all)]
fn feature_stage(stats: &[AuthorStats], metrics: &[NetworkMetricRow]) -> Vec<FeatureVector> {
    let timer = StageTimer::start("features");
    let features = FeatureAssembler::assemble(stats, metrics);
    info!(authors = features.len(), elapsed = timer.finish(), "Feature table assembled");
    features
}

#[instrument(skip_all)]
fn scoring_stage(features: &[FeatureVector]) -> Vec<ScoredAuthor> {
    let timer = StageTimer::start("scoring");
    let scored = InfluenceScorer::score(features);
    for author in scored.iter().take(SUMMARY_AUTHORS) {
        info!(
            author = %author.features.author_name,
            score = author.influence_score,
            "Influential author"
        );
    }
    info!(authors = scored.len(), elapsed = timer.finish(), "Influence scores computed");
    scored
}

#[instrument(skip_all)]
fn prediction_stage(features: &[FeatureVector], config: &AppConfig) -> PredictionReport {
    let timer = StageTimer::start("prediction");
    let report = CitationPredictor::new(PredictorConfig::from(&config.prediction)).predict(features);
    info!(
        best_model = ?report.best_model,
        trained = report.results.len(),
        failed = report.failures.len(),
        elapsed = timer.finish(),
        "Citation models compared"
    );
    report
}

#[instrument(skip_all)]
fn clustering_stage(features: &[FeatureVector], config: &AppConfig) -> ClusteringResult {
    let timer = StageTimer::start("clustering");
    let result = AuthorClusterer::new(config.clustering.clone()).cluster(features);
    info!(
        clusters = result.cluster_count,
        elapsed = timer.finish(),
        "Clustering finished"
    );
    result
}

#[instrument(skip_all)]
fn view_stage(
    graph: &CollaborationGraph,
    metrics: &[NetworkMetricRow],
    partition: &Partition,
    config: &AppConfig,
) -> NetworkView {
    let timer = StageTimer::start("view");
    let view = NetworkView::build(graph, metrics, partition, &ViewConfig::from(&config.network));
    info!(
        nodes = view.nodes.len(),
        edges = view.edges.len(),
        elapsed = timer.finish(),
        "Network view prepared"
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{OutputBundle, AUTHOR_IMPACT_SCORES, COMMUNITIES, NETWORK_METRICS};

    fn record(title: &str, authors: &[&str], citations: u64) -> PublicationRecord {
        PublicationRecord::new(title, authors.iter().map(|a| a.to_string()).collect(), citations)
    }

    /// Two research groups bridged by one shared paper
    fn corpus() -> Vec<PublicationRecord> {
        let mut records = Vec::new();
        let group_a = ["Ada Lovelace", "Alan Turing", "Grace Hopper", "Edsger Dijkstra"];
        let group_b = ["Barbara Liskov", "Donald Knuth", "Frances Allen", "John Backus"];
        let mut n = 0;
        for group in [&group_a, &group_b] {
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    n += 1;
                    records.push(record(&format!("paper {}", n), &[group[i], group[j]], (n * 7 % 40) as u64));
                }
            }
        }
        records.push(record("bridge", &["Grace Hopper", "Barbara Liskov"], 3));
        records.push(record("solo", &["Alan Turing"], 100));
        records.push(record("paper 1", &["Duplicate Title"], 1));
        records.push(record("", &["Nobody"], 5));
        records
    }

    #[test]
    fn test_three_publication_scenario() {
        let records = vec![
            record("P1", &["A", "B"], 10),
            record("P2", &["A", "B"], 20),
            record("P3", &["A", "C"], 5),
        ];
        let output = run(&records, &AppConfig::default());

        assert_eq!(output.graph_nodes, 3);
        assert_eq!(output.graph_edges, 2);

        let a = output.metrics.iter().find(|m| m.author_name == "a").unwrap();
        assert_eq!(a.degree, 2);
        assert!((a.betweenness_centrality - 1.0).abs() < 1e-9);

        let stats_a = output.author_stats.iter().find(|s| s.author_name == "a").unwrap();
        assert_eq!(stats_a.total_citations, 35);
        assert_eq!(stats_a.h_index_approx, 3);

        // three authors are too few for a held-out evaluation
        assert!(output.prediction.results.is_empty());
        assert_eq!(output.scored[0].features.author_name, "a");
        assert!((output.scored[0].influence_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_corpus_run() {
        let output = run(&corpus(), &AppConfig::default());

        assert_eq!(output.records_loaded, 16);
        assert_eq!(output.records_kept, 14);
        assert_eq!(output.graph_nodes, 8);
        assert_eq!(output.graph_edges, 13);
        assert_eq!(output.features.len(), 8);
        assert_eq!(output.partition.community_count(), 2);
        assert_eq!(
            output.partition.community_of("ada lovelace"),
            output.partition.community_of("edsger dijkstra")
        );
        assert_ne!(
            output.partition.community_of("ada lovelace"),
            output.partition.community_of("john backus")
        );
        assert_eq!(output.top_influential.len(), 8);
        assert_eq!(output.clustering.assignments.len(), 8);
        assert!(output.scored.iter().all(|s| (0.0..=100.0).contains(&s.influence_score)));
        assert_eq!(output.top_connectors[0].author_name, "barbara liskov");
    }

    #[test]
    fn test_reruns_are_byte_identical() {
        let config = AppConfig::default();
        let first = OutputBundle::render(&run(&corpus(), &config)).unwrap();
        let second = OutputBundle::render(&run(&corpus(), &config)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.manifest, second.manifest);
        assert_eq!(first.artifacts[AUTHOR_IMPACT_SCORES].rows, 8);
        assert_eq!(first.artifacts[NETWORK_METRICS].rows, 8);
        assert_eq!(first.artifacts[COMMUNITIES].rows, 8);
    }

    #[test]
    fn test_empty_input() {
        let output = run(&[], &AppConfig::default());
        assert_eq!(output.graph_nodes, 0);
        assert!(output.metrics.is_empty());
        assert!(output.scored.is_empty());
        assert!(output.prediction.best_model.is_none());
        assert!(output.view.nodes.is_empty());

        let bundle = OutputBundle::render(&output).unwrap();
        assert!(bundle.manifest.files.iter().all(|f| f.rows == 0));
        assert!(bundle.artifacts[NETWORK_METRICS].bytes.starts_with(b"author_name,degree,"));
        assert_eq!(bundle.artifacts[COMMUNITIES].bytes, b"author_name,community\n");
    }

    #[test]
    fn test_solo_authors_have_no_network_row() {
        let records = vec![record("P1", &["Solo"], 4), record("P2", &["A", "B"], 1)];
        let output = run(&records, &AppConfig::default());
        assert_eq!(output.author_stats.len(), 3);
        assert_eq!(output.metrics.len(), 2);
        assert_eq!(output.features.len(), 2);
    }
}
