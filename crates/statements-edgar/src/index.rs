//! Filing directory index (`index.json`) and `MetaLinks.json` parsing.

use serde::Deserialize;
use statements_core::{ReconError, Result};
use std::collections::HashMap;

// =============================================================================
// index.json
// =============================================================================

/// Listing of a filing directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilingIndex {
    directory: IndexDirectory,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct IndexDirectory {
    #[serde(default)]
    item: Vec<IndexItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct IndexItem {
    name: String,
}

impl FilingIndex {
    /// Parses an `index.json` body.
    ///
    /// # Errors
    /// Returns a parse error if the document is not a directory listing.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ReconError::Parse(format!("Failed to parse index.json: {}", e)))
    }

    /// Builds an index from file names.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directory: IndexDirectory {
                item: names
                    .into_iter()
                    .map(|name| IndexItem { name: name.into() })
                    .collect(),
            },
        }
    }

    /// All file names in the directory.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directory.item.iter().map(|item| item.name.as_str())
    }

    /// The company extension schema: a `.xsd` whose name does not contain `xbrl`.
    #[must_use]
    pub fn schema_file(&self) -> Option<&str> {
        self.names().find(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".xsd") && !lower.contains("xbrl")
        })
    }

    /// The calculation linkbase: a listed `*_cal.xml`, otherwise the name
    /// derived from the schema stem (`{stem}_cal.xml`).
    #[must_use]
    pub fn calc_linkbase_file(&self) -> Option<String> {
        if let Some(name) = self
            .names()
            .find(|name| name.to_ascii_lowercase().ends_with("_cal.xml"))
        {
            return Some(name.to_string());
        }
        self.schema_file()
            .and_then(|schema| schema.rsplit_once('.'))
            .map(|(stem, _)| format!("{}_cal.xml", stem))
    }
}

// =============================================================================
// MetaLinks.json
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct MetaLinks {
    #[serde(default)]
    instance: HashMap<String, MetaLinksInstance>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaLinksInstance {
    #[serde(default)]
    base_taxonomies: HashMap<String, serde_json::Value>,
}

/// Extracts the US-GAAP taxonomy year from a `MetaLinks.json` body.
///
/// Looks for `instance.*.baseTaxonomies` keys such as
/// `http://fasb.org/us-gaap/2023`. Returns `Ok(None)` when no US-GAAP
/// namespace is declared.
///
/// # Errors
/// Returns a parse error if the body is not valid JSON of the expected shape.
pub fn taxonomy_year(json: &str) -> Result<Option<u16>> {
    let meta: MetaLinks = serde_json::from_str(json)
        .map_err(|e| ReconError::Parse(format!("Failed to parse MetaLinks.json: {}", e)))?;

    let mut years: Vec<u16> = meta
        .instance
        .values()
        .flat_map(|instance| instance.base_taxonomies.keys())
        .filter_map(|ns| {
            let (_, rest) = ns.split_once("fasb.org/us-gaap/")?;
            rest.trim_end_matches('/').parse::<u16>().ok()
        })
        .collect();
    years.sort_unstable();
    Ok(years.pop())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"{
        "directory": {
            "name": "/Archives/edgar/data/320193/000032019324000081",
            "item": [
                {"name": "0000320193-24-000081-index.htm", "type": "text.gif"},
                {"name": "aapl-20240629.htm", "type": "text.gif"},
                {"name": "aapl-20240629.xsd", "type": "text.gif"},
                {"name": "aapl-20240629_cal.xml", "type": "text.gif"},
                {"name": "aapl-20240629_pre.xml", "type": "text.gif"},
                {"name": "FilingSummary.xml", "type": "text.gif"}
            ]
        }
    }"#;

    #[test]
    fn test_parse_index() {
        let index = FilingIndex::parse(INDEX).unwrap();
        assert_eq!(index.names().count(), 6);
        assert_eq!(index.schema_file(), Some("aapl-20240629.xsd"));
        assert_eq!(
            index.calc_linkbase_file().as_deref(),
            Some("aapl-20240629_cal.xml")
        );
    }

    #[test]
    fn test_calc_linkbase_derived_from_schema() {
        let index = FilingIndex::from_names(["acme-20231231.htm", "acme-20231231.xsd"]);
        assert_eq!(
            index.calc_linkbase_file().as_deref(),
            Some("acme-20231231_cal.xml")
        );
    }

    #[test]
    fn test_schema_skips_xbrl_names() {
        let index = FilingIndex::from_names(["xbrl-instance.xsd", "acme.htm"]);
        assert_eq!(index.schema_file(), None);
        assert_eq!(index.calc_linkbase_file(), None);
    }

    #[test]
    fn test_parse_index_rejects_garbage() {
        assert!(FilingIndex::parse("<html>").is_err());
    }

    #[test]
    fn test_taxonomy_year() {
        let json = r#"{
            "version": "2.2",
            "instance": {
                "aapl-20240629.htm": {
                    "baseTaxonomies": {
                        "http://fasb.org/us-gaap/2024": 812,
                        "http://xbrl.sec.gov/dei/2024": 31
                    }
                }
            }
        }"#;
        assert_eq!(taxonomy_year(json).unwrap(), Some(2024));
    }

    #[test]
    fn test_taxonomy_year_missing() {
        let json = r#"{"instance": {"a.htm": {"baseTaxonomies": {"http://xbrl.ifrs.org/taxonomy/2023-03-23/ifrs-full": 1}}}}"#;
        assert_eq!(taxonomy_year(json).unwrap(), None);
        assert_eq!(taxonomy_year("{}").unwrap(), None);
        assert!(taxonomy_year("not json").is_err());
    }
}
