//! Publication cleaning and per-author bibliometrics

use scholarnet_common::models::{AuthorStats, PublicationRecord};
use scholarnet_common::names::{clean_author_list, normalize_author_name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Drop untitled records, de-duplicate by title and tidy author lists.
///
/// The first record carrying a given title wins; input order is preserved.
pub fn clean_publications(records: &[PublicationRecord]) -> Vec<PublicationRecord> {
    let mut seen_titles: HashSet<&str> = HashSet::new();
    let mut untitled = 0usize;
    let mut duplicates = 0usize;

    let cleaned: Vec<PublicationRecord> = records
        .iter()
        .filter(|record| {
            if record.title.trim().is_empty() {
                untitled += 1;
                return false;
            }
            if !seen_titles.insert(record.title.as_str()) {
                duplicates += 1;
                return false;
            }
            true
        })
        .map(|record| PublicationRecord {
            authors: clean_author_list(&record.authors),
            ..record.clone()
        })
        .collect();

    debug!(
        input = records.len(),
        kept = cleaned.len(),
        untitled,
        duplicates,
        "Publications cleaned"
    );

    cleaned
}

/// Largest h such that at least h of the counts are >= h
pub fn h_index(citations: &[u64]) -> u32 {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|(i, &c)| c >= (*i as u64) + 1)
        .count() as u32
}

/// Per-author statistics over every record, solo papers included.
///
/// Sorted by total citations descending, ties by author name.
pub fn author_statistics(records: &[PublicationRecord]) -> Vec<AuthorStats> {
    let mut citations_by_author: BTreeMap<String, Vec<u64>> = BTreeMap::new();

    for record in records {
        let authors: BTreeSet<String> = record
            .authors
            .iter()
            .filter_map(|a| normalize_author_name(a))
            .collect();
        for author in authors {
            citations_by_author
                .entry(author)
                .or_default()
                .push(record.citation_count);
        }
    }

    let mut stats: Vec<AuthorStats> = citations_by_author
        .into_iter()
        .map(|(author_name, citations)| {
            let publication_count = citations.len() as u32;
            let total_citations: u64 = citations.iter().sum();
            AuthorStats {
                author_name,
                publication_count,
                total_citations,
                avg_citations_per_paper: total_citations as f64 / publication_count as f64,
                h_index_approx: h_index(&citations),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total_citations
            .cmp(&a.total_citations)
            .then_with(|| a.author_name.cmp(&b.author_name))
    });
    stats
}

/// Ranking key for [`top_authors`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsRanking {
    #[default]
    TotalCitations,
    PublicationCount,
    HIndexApprox,
}

/// Top `n` authors by the chosen statistic, ties by name
pub fn top_authors(stats: &[AuthorStats], n: usize, by: StatsRanking) -> Vec<AuthorStats> {
    let key = |s: &AuthorStats| -> u64 {
        match by {
            StatsRanking::TotalCitations => s.total_citations,
            StatsRanking::PublicationCount => s.publication_count as u64,
            StatsRanking::HIndexApprox => s.h_index_approx as u64,
        }
    };

    let mut seen = HashSet::new();
    let mut ranked: Vec<AuthorStats> = stats
        .iter()
        .filter(|s| seen.insert(s.author_name.as_str()))
        .cloned()
        .collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.author_name.cmp(&b.author_name)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, authors: &[&str], citations: u64) -> PublicationRecord {
        PublicationRecord::new(title, authors.iter().map(|a| a.to_string()).collect(), citations)
    }

    #[test]
    fn test_h_index() {
        assert_eq!(h_index(&[10, 8, 5, 3, 2]), 3);
        assert_eq!(h_index(&[]), 0);
        assert_eq!(h_index(&[0, 0]), 0);
        assert_eq!(h_index(&[100]), 1);
        assert_eq!(h_index(&[4, 4, 4, 4]), 4);
    }

    #[test]
    fn test_clean_publications() {
        let records = vec![
            record("Graphs", &["'Ada'", " Bob "], 3),
            record("  ", &["Cy"], 1),
            record("Graphs", &["Dee"], 9),
            record("Trees", &["[Eve]", ""], 0),
        ];
        let cleaned = clean_publications(&records);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].authors, vec!["Ada", "Bob"]);
        assert_eq!(cleaned[0].citation_count, 3);
        assert_eq!(cleaned[1].authors, vec!["Eve"]);
    }

    #[test]
    fn test_author_statistics() {
        let records = vec![
            record("p1", &["Ada", "Bob"], 10),
            record("p2", &["ada", "Cy"], 8),
            record("p3", &["ADA"], 5),
            record("p4", &["Bob", "bob"], 2),
        ];
        let stats = author_statistics(&records);

        assert_eq!(stats[0].author_name, "ada");
        assert_eq!(stats[0].publication_count, 3);
        assert_eq!(stats[0].total_citations, 23);
        assert!((stats[0].avg_citations_per_paper - 23.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats[0].h_index_approx, 3);

        // bob listed twice on p4 still counts one appearance
        let bob = stats.iter().find(|s| s.author_name == "bob").unwrap();
        assert_eq!(bob.publication_count, 2);
        assert_eq!(bob.total_citations, 12);
    }

    #[test]
    fn test_statistics_ties_broken_by_name() {
        let records = vec![record("p1", &["Zed"], 4), record("p2", &["Amy"], 4)];
        let stats = author_statistics(&records);
        assert_eq!(stats[0].author_name, "amy");
        assert_eq!(stats[1].author_name, "zed");
    }

    #[test]
    fn test_top_authors() {
        let records = vec![
            record("p1", &["Ada"], 1),
            record("p2", &["Ada"], 1),
            record("p3", &["Ada"], 1),
            record("p4", &["Bob"], 50),
        ];
        let stats = author_statistics(&records);

        let by_citations = top_authors(&stats, 1, StatsRanking::TotalCitations);
        assert_eq!(by_citations[0].author_name, "bob");

        let by_count = top_authors(&stats, 1, StatsRanking::PublicationCount);
        assert_eq!(by_count[0].author_name, "ada");

        let by_h = top_authors(&stats, 5, StatsRanking::HIndexApprox);
        assert_eq!(by_h.len(), 2);
        // both have h = 1; name decides
        assert_eq!(by_h[0].author_name, "ada");
    }
}
