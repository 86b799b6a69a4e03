//! Label normalization.

use regex::Regex;
use statements_core::{ReconError, Result, local_name};

/// Normalizes presentation labels before rule matching.
///
/// Labels are lowercased, apostrophes and commas are dropped, parenthetical
/// remarks are removed, remaining punctuation other than `&` becomes a space
/// and runs of whitespace collapse to one.
#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    parenthetical: Regex,
    punctuation: Regex,
    whitespace: Regex,
}

impl LabelNormalizer {
    /// Compiles the normalizer.
    pub fn new() -> Result<Self> {
        Ok(Self {
            parenthetical: compile(r"\([^)]*\)")?,
            punctuation: compile(r"[^a-z0-9&\s]")?,
            whitespace: compile(r"\s+")?,
        })
    }

    /// Normalizes a label.
    #[must_use]
    pub fn normalize(&self, label: &str) -> String {
        let lower = label
            .to_lowercase()
            .replace(['\'', '\u{2019}', '\u{2018}', ','], "");
        let lower = self.parenthetical.replace_all(&lower, " ");
        let lower = lower.replace('-', " ");
        let lower = self.punctuation.replace_all(&lower, " ");
        self.whitespace.replace_all(&lower, " ").trim().to_string()
    }

    /// Normalizes a concept tag: namespace prefix removed, lowercased.
    #[must_use]
    pub fn normalize_tag(&self, tag: &str) -> String {
        local_name(tag).to_ascii_lowercase()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ReconError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_labels() {
        let n = LabelNormalizer::new().unwrap();
        assert_eq!(
            n.normalize("Total shareholders’ equity"),
            "total shareholders equity"
        );
        assert_eq!(
            n.normalize("Property, plant and equipment, net"),
            "property plant and equipment net"
        );
        assert_eq!(
            n.normalize("Accumulated other comprehensive income (loss)"),
            "accumulated other comprehensive income"
        );
        assert_eq!(n.normalize("Non-current  assets:"), "non current assets");
        assert_eq!(n.normalize("Other income/(expense), net"), "other income net");
        assert_eq!(n.normalize("Research & development"), "research & development");
    }

    #[test]
    fn test_normalize_tag() {
        let n = LabelNormalizer::new().unwrap();
        assert_eq!(n.normalize_tag("us-gaap_CommonStockValue"), "commonstockvalue");
        assert_eq!(n.normalize_tag("AssetsCurrent"), "assetscurrent");
    }
}
