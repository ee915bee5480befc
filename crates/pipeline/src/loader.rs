//! Publication input loading
//!
//! Reads the collector's output: a JSON array of records, or a CSV file with
//! a header row. CSV cells are parsed leniently since the collector writes
//! author lists and citation counts as free text.

use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::models::{parse_citation_count, ExternalIds, PublicationRecord};
use scholarnet_common::names::parse_author_list;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// One CSV row as written by the collector; every column is optional
#[derive(Debug, Default, Deserialize)]
struct CsvPublicationRow {
    #[serde(default)]
    title: String,

    #[serde(default, rename = "abstract")]
    abstract_text: String,

    #[serde(default)]
    authors: String,

    #[serde(default)]
    citation_count: String,

    #[serde(default)]
    pub_url: Option<String>,

    #[serde(default)]
    doi: Option<String>,
}

impl From<CsvPublicationRow> for PublicationRecord {
    fn from(row: CsvPublicationRow) -> Self {
        Self {
            title: row.title,
            abstract_text: row.abstract_text,
            authors: parse_author_list(&row.authors),
            citation_count: parse_citation_count(&row.citation_count),
            external_ids: ExternalIds {
                pub_url: row.pub_url.filter(|s| !s.trim().is_empty()),
                doi: row.doi.filter(|s| !s.trim().is_empty()),
            },
        }
    }
}

/// Load publication records, choosing the format by file extension
pub fn load_publications(path: impl AsRef<Path>) -> Result<Vec<PublicationRecord>> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    if !path.exists() {
        return Err(AppError::InputNotFound { path: shown });
    }

    let file = std::fs::File::open(path).map_err(|e| AppError::InputRead {
        path: shown.clone(),
        message: e.to_string(),
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records = if is_json {
        read_json(file, &shown)?
    } else {
        read_csv(file)?
    };

    if records.is_empty() {
        warn!(path = %shown, "Input contains no publication records");
    } else {
        debug!(path = %shown, records = records.len(), "Publications loaded");
    }

    Ok(records)
}

/// Parse CSV with a header row; unknown columns are ignored
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<PublicationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize::<CsvPublicationRow>() {
        records.push(row?.into());
    }
    Ok(records)
}

/// Parse a JSON array of records; an empty document is an empty array
pub fn read_json<R: Read>(mut reader: R, path: &str) -> Result<Vec<PublicationRecord>> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| AppError::InputRead {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&text).map_err(|e| AppError::InvalidFormat {
        message: format!("{}: {}", path, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_with_list_literals() {
        let data = "\
title,abstract,authors,citation_count,pub_url,extra
Graph Mining,About graphs,\"['Ada Lovelace', 'Alan Turing']\",12,https://example.org/1,x
Trees,,\"Grace Hopper, Ada Lovelace\",n/a,,y
";
        let records = read_csv(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(records[0].citation_count, 12);
        assert_eq!(
            records[0].external_ids.pub_url.as_deref(),
            Some("https://example.org/1")
        );
        assert_eq!(records[1].authors, vec!["Grace Hopper", "Ada Lovelace"]);
        assert_eq!(records[1].citation_count, 0);
        assert_eq!(records[1].external_ids.pub_url, None);
    }

    #[test]
    fn test_read_csv_missing_columns_default() {
        let data = "title,authors\nOnly Title,\"['A', 'B']\"\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].citation_count, 0);
        assert_eq!(records[0].abstract_text, "");
        assert_eq!(records[0].authors.len(), 2);
    }

    #[test]
    fn test_read_csv_float_citations() {
        let data = "title,authors,citation_count\nP,\"A, B\",7.9\nQ,\"A, B\",-3\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].citation_count, 7);
        assert_eq!(records[1].citation_count, 0);
    }

    #[test]
    fn test_read_empty_inputs() {
        assert!(read_csv("".as_bytes()).unwrap().is_empty());
        assert!(read_json("  ".as_bytes(), "x.json").unwrap().is_empty());
    }

    #[test]
    fn test_read_json() {
        let data = r#"[
            {"title": "P1", "authors": ["Ada", "Bob"], "citation_count": "5", "doi": "10.1/x"},
            {"title": "P2", "authors": ["Bob"], "citation_count": null}
        ]"#;
        let records = read_json(data.as_bytes(), "p.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].citation_count, 5);
        assert_eq!(records[0].external_ids.doi.as_deref(), Some("10.1/x"));
        assert_eq!(records[1].citation_count, 0);
    }

    #[test]
    fn test_malformed_json_is_invalid_format() {
        let err = read_json("{not json".as_bytes(), "p.json").unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_publications("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, AppError::InputNotFound { .. }));
        assert!(err.is_input_error());
    }
}
