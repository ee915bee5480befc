//! Author name handling
//!
//! Canonical identity for an author is the raw name lower-cased, trimmed and
//! with internal whitespace collapsed. Every stage keys authors through
//! [`normalize_author_name`] so that the graph, the statistics and the
//! feature table agree on who is who.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Characters stripped from both ends of a raw author token
const WRAPPING_CHARS: &[char] = &['\'', '"', '[', ']'];

fn quoted_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"'([^']*)'|"([^"]*)""#).expect("quoted name pattern is valid")
    })
}

/// Normalize a raw author name into its canonical identity.
///
/// Returns `None` when nothing is left after normalization.
pub fn normalize_author_name(raw: &str) -> Option<String> {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Strip whitespace plus leading/trailing quotes and brackets from a raw name
pub fn clean_author_name(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(WRAPPING_CHARS).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Clean a list of raw author names, dropping empty entries
pub fn clean_author_list<S: AsRef<str>>(authors: &[S]) -> Vec<String> {
    authors
        .iter()
        .filter_map(|a| clean_author_name(a.as_ref()))
        .collect()
}

/// Parse an `authors` cell written by the collector.
///
/// Accepts a bracketed list literal (`['Ada Lovelace', "Alan Turing"]`) or a
/// plain comma-separated string.
pub fn parse_author_list(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let inner = &trimmed[1..trimmed.len() - 1];
        let quoted: Vec<String> = quoted_name_pattern()
            .captures_iter(inner)
            // each name closes with the quote it opened with
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
            .filter_map(|m| clean_author_name(m.as_str()))
            .collect();
        if !quoted.is_empty() || inner.trim().is_empty() {
            return quoted;
        }
        return inner.split(',').filter_map(clean_author_name).collect();
    }

    trimmed.split(',').filter_map(clean_author_name).collect()
}
