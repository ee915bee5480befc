//! Publication record entity

use serde::{Deserialize, Deserializer, Serialize};

/// External identifiers attached to a publication by the collector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    /// Landing page or DOI resolver URL
    #[serde(default)]
    pub pub_url: Option<String>,

    /// Digital Object Identifier
    #[serde(default)]
    pub doi: Option<String>,
}

/// A single publication as produced by the collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    /// Raw author names in byline order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Citation count, 0 when missing or unparsable
    #[serde(default, deserialize_with = "deserialize_citation_count")]
    pub citation_count: u64,

    #[serde(default, flatten)]
    pub external_ids: ExternalIds,
}

impl PublicationRecord {
    /// Create a record with the given title, authors and citation count
    pub fn new<S: Into<String>>(title: S, authors: Vec<String>, citation_count: u64) -> Self {
        Self {
            title: title.into(),
            authors,
            citation_count,
            ..Default::default()
        }
    }
}

/// Parse a citation count cell.
///
/// Integers and floats are accepted (floats are truncated); negative, NaN,
/// empty and unparsable values all map to 0.
pub fn parse_citation_count(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

fn deserialize_citation_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => match n.as_u64() {
            Some(v) => v,
            None => n.as_f64().map(|f| parse_citation_count(&f.to_string())).unwrap_or(0),
        },
        Some(serde_json::Value::String(s)) => parse_citation_count(&s),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_citation_count() {
        assert_eq!(parse_citation_count("42"), 42);
        assert_eq!(parse_citation_count(" 12.0 "), 12);
        assert_eq!(parse_citation_count("7.9"), 7);
        assert_eq!(parse_citation_count(""), 0);
        assert_eq!(parse_citation_count("n/a"), 0);
        assert_eq!(parse_citation_count("-3"), 0);
        assert_eq!(parse_citation_count("NaN"), 0);
    }

    #[test]
    fn test_json_record_defaults() {
        let record: PublicationRecord = serde_json::from_str(
            r#"{"title": "Graph Methods", "authors": ["Ada", "Grace"], "citation_count": null}"#,
        )
        .unwrap();
        assert_eq!(record.citation_count, 0);
        assert_eq!(record.authors.len(), 2);
        assert!(record.abstract_text.is_empty());
    }

    #[test]
    fn test_json_record_string_count() {
        let record: PublicationRecord = serde_json::from_str(
            r#"{"title": "T", "citation_count": "15", "pub_url": "https://doi.org/10.1/x"}"#,
        )
        .unwrap();
        assert_eq!(record.citation_count, 15);
        assert_eq!(record.external_ids.pub_url.as_deref(), Some("https://doi.org/10.1/x"));
    }
}
