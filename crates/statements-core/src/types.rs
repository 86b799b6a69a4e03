//! Typed rows of the raw financial statement data sets.
//!
//! This module defines the inputs consumed by the reconstruction engine:
//!
//! - [`FilingId`] - Company and accession identifiers of a filing
//! - [`StatementKind`] - Statement type (BS, IS, CF, EQ, CI)
//! - [`Submission`] - One SUB record
//! - [`PresentationRow`] - One PRE record
//! - [`NumericFact`] - One NUM record
//! - [`TagInfo`] - One TAG record
//! - [`FilingData`] - Everything known about a single filing

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ReconError;

/// Base URL of the EDGAR filing archive.
pub const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Base URL of the EDGAR interactive viewer.
pub const EDGAR_VIEWER_URL: &str = "https://www.sec.gov/cgi-bin/viewer";

/// Identity of a single filing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilingId {
    /// Central index key of the filer.
    pub cik: u64,
    /// Accession number, e.g. `0000320193-24-000081`.
    pub adsh: String,
}

impl FilingId {
    /// Creates a new filing identity.
    #[must_use]
    pub fn new(cik: u64, adsh: impl Into<String>) -> Self {
        Self {
            cik,
            adsh: adsh.into(),
        }
    }

    /// Accession number without dashes, as used in archive paths.
    #[must_use]
    pub fn adsh_compact(&self) -> String {
        self.adsh.replace('-', "")
    }

    /// Directory URL holding the filing's documents (with trailing slash).
    #[must_use]
    pub fn archive_url(&self) -> String {
        format!("{}/{}/{}/", EDGAR_ARCHIVES_URL, self.cik, self.adsh_compact())
    }

    /// Deep link to the regulator's interactive viewer for this filing.
    #[must_use]
    pub fn viewer_url(&self) -> String {
        format!(
            "{}?action=view&cik={:010}&accession_number={}&xbrl_type=v",
            EDGAR_VIEWER_URL, self.cik, self.adsh
        )
    }
}

impl fmt::Display for FilingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cik, self.adsh)
    }
}

/// Statement type as used in the `stmt` column of the presentation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    /// Balance sheet (`BS`).
    BalanceSheet,
    /// Income statement (`IS`).
    IncomeStatement,
    /// Cash flow statement (`CF`).
    CashFlow,
    /// Statement of stockholders' equity (`EQ`).
    Equity,
    /// Comprehensive income (`CI`).
    ComprehensiveIncome,
}

impl StatementKind {
    /// All statement kinds in reconstruction order.
    pub const ALL: [Self; 5] = [
        Self::BalanceSheet,
        Self::IncomeStatement,
        Self::CashFlow,
        Self::Equity,
        Self::ComprehensiveIncome,
    ];

    /// Two-letter code used by the data sets.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "BS",
            Self::IncomeStatement => "IS",
            Self::CashFlow => "CF",
            Self::Equity => "EQ",
            Self::ComprehensiveIncome => "CI",
        }
    }

    /// Returns true if the statement reports point-in-time values.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::BalanceSheet)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StatementKind {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BS" => Ok(Self::BalanceSheet),
            "IS" => Ok(Self::IncomeStatement),
            "CF" => Ok(Self::CashFlow),
            "EQ" => Ok(Self::Equity),
            "CI" => Ok(Self::ComprehensiveIncome),
            other => Err(ReconError::Parse(format!("Unknown statement type: {}", other))),
        }
    }
}

/// Submission metadata (one SUB record).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Filing identity.
    pub filing: FilingId,
    /// Company name.
    pub name: Option<String>,
    /// Standard industrial classification code.
    pub sic: Option<u32>,
    /// Fiscal year focus.
    pub fiscal_year: Option<i32>,
    /// Fiscal period focus (FY, Q1, Q2, Q3).
    pub fiscal_period: Option<String>,
    /// Balance sheet date of the primary period.
    pub period: Option<NaiveDate>,
    /// Form type (10-K, 10-Q, ...).
    pub form: Option<String>,
}

impl Submission {
    /// Creates a submission with only the filing identity set.
    #[must_use]
    pub const fn new(filing: FilingId) -> Self {
        Self {
            filing,
            name: None,
            sic: None,
            fiscal_year: None,
            fiscal_period: None,
            period: None,
            form: None,
        }
    }

    /// Sets the SIC code.
    #[must_use]
    pub const fn with_sic(mut self, sic: u32) -> Self {
        self.sic = Some(sic);
        self
    }

    /// Sets the primary period date.
    #[must_use]
    pub const fn with_period(mut self, period: NaiveDate) -> Self {
        self.period = Some(period);
        self
    }
}

/// One presentation row (PRE record).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationRow {
    /// Accession number of the filing.
    pub adsh: String,
    /// Report number grouping rows of one rendered statement.
    pub report: u32,
    /// Line order within the report.
    pub line: u32,
    /// Statement type.
    pub statement: StatementKind,
    /// Indentation level (`inpth`).
    pub indent: u32,
    /// Concept tag.
    pub tag: String,
    /// Presentation label.
    pub label: String,
    /// True if the value is subtracted from its parent.
    pub negating: bool,
}

/// One numeric fact (NUM record).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericFact {
    /// Accession number of the filing.
    pub adsh: String,
    /// Concept tag.
    pub tag: String,
    /// End date of the fact (`ddate`).
    pub end: NaiveDate,
    /// Duration in quarters; 0 for point-in-time facts.
    pub quarters: u8,
    /// Unit of measure.
    pub unit: String,
    /// Dimensional segment identifier, if any.
    pub segments: Option<String>,
    /// Co-registrant identifier, if any.
    pub coregistrant: Option<String>,
    /// Reported value.
    pub value: f64,
}

impl NumericFact {
    /// Returns true for a consolidated, parent-entity fact.
    #[must_use]
    pub fn is_consolidated(&self) -> bool {
        self.segments.as_deref().is_none_or(str::is_empty)
            && self.coregistrant.as_deref().is_none_or(str::is_empty)
    }

    /// Returns true for a point-in-time fact.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.quarters == 0
    }
}

/// Declared value type of a tag (`datatype`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Currency amount.
    #[default]
    Monetary,
    /// Amount per share (EPS and similar).
    PerShare,
    /// Share count.
    Shares,
    /// Anything else (pure, percent, ...).
    Other,
}

impl ValueType {
    /// Parses the `datatype` column.
    #[must_use]
    pub fn from_datatype(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "monetary" => Self::Monetary,
            "pershare" => Self::PerShare,
            "shares" => Self::Shares,
            _ => Self::Other,
        }
    }
}

/// Whether a tag reports an instant or a duration (`iord`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactKind {
    /// Point-in-time value.
    Instant,
    /// Value accumulated over a span.
    #[default]
    Duration,
}

impl FactKind {
    /// Parses the `iord` column (`I` or `D`).
    #[must_use]
    pub fn from_iord(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("I") {
            Self::Instant
        } else {
            Self::Duration
        }
    }
}

/// Credit/debit balance of a tag (`crdr`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Credit balance.
    Credit,
    /// Debit balance.
    Debit,
}

impl Polarity {
    /// Parses the `crdr` column (`C` or `D`).
    #[must_use]
    pub fn from_crdr(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Some(Self::Credit),
            "D" => Some(Self::Debit),
            _ => None,
        }
    }
}

/// Tag metadata (TAG record).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Concept tag.
    pub tag: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Instant or duration.
    pub kind: FactKind,
    /// Credit/debit polarity, when declared.
    pub polarity: Option<Polarity>,
    /// Documentation label.
    pub documentation: Option<String>,
}

impl TagInfo {
    /// Creates monetary tag metadata.
    #[must_use]
    pub fn new(tag: impl Into<String>, kind: FactKind) -> Self {
        Self {
            tag: tag.into(),
            value_type: ValueType::Monetary,
            kind,
            polarity: None,
            documentation: None,
        }
    }

    /// Sets the value type.
    #[must_use]
    pub const fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the polarity.
    #[must_use]
    pub const fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = Some(polarity);
        self
    }
}

/// All raw rows belonging to a single filing.
#[derive(Clone, Debug, Default)]
pub struct FilingData {
    /// Submission metadata, if known.
    pub submission: Option<Submission>,
    /// Presentation rows for every statement of the filing.
    pub presentation: Vec<PresentationRow>,
    /// Numeric facts of the filing.
    pub facts: Vec<NumericFact>,
    /// Tag metadata keyed by tag.
    pub tags: HashMap<String, TagInfo>,
}

impl FilingData {
    /// Creates filing data for a submission.
    #[must_use]
    pub fn new(submission: Submission) -> Self {
        Self {
            submission: Some(submission),
            ..Default::default()
        }
    }

    /// Filing identity, if the submission is known.
    #[must_use]
    pub fn filing(&self) -> Option<&FilingId> {
        self.submission.as_ref().map(|s| &s.filing)
    }

    /// Presentation rows of one statement type.
    pub fn rows_for(&self, kind: StatementKind) -> impl Iterator<Item = &PresentationRow> {
        self.presentation.iter().filter(move |r| r.statement == kind)
    }

    /// Returns true if the filing presents the given statement.
    #[must_use]
    pub fn has_statement(&self, kind: StatementKind) -> bool {
        self.rows_for(kind).next().is_some()
    }

    /// Tag metadata lookup.
    #[must_use]
    pub fn tag_info(&self, tag: &str) -> Option<&TagInfo> {
        self.tags.get(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_urls() {
        let filing = FilingId::new(320193, "0000320193-24-000081");
        assert_eq!(filing.adsh_compact(), "000032019324000081");
        assert_eq!(
            filing.archive_url(),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000081/"
        );
        assert_eq!(
            filing.viewer_url(),
            "https://www.sec.gov/cgi-bin/viewer?action=view&cik=0000320193&accession_number=0000320193-24-000081&xbrl_type=v"
        );
    }

    #[test]
    fn test_statement_kind_parse() {
        assert_eq!("bs".parse::<StatementKind>().unwrap(), StatementKind::BalanceSheet);
        assert_eq!("CF".parse::<StatementKind>().unwrap(), StatementKind::CashFlow);
        assert!("XX".parse::<StatementKind>().is_err());
        assert!(StatementKind::BalanceSheet.is_instant());
        assert!(!StatementKind::IncomeStatement.is_instant());
    }

    #[test]
    fn test_consolidated_fact() {
        let mut fact = NumericFact {
            adsh: "a".to_string(),
            tag: "Assets".to_string(),
            end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            quarters: 0,
            unit: "USD".to_string(),
            segments: None,
            coregistrant: None,
            value: 1.0,
        };
        assert!(fact.is_consolidated());
        fact.segments = Some(String::new());
        assert!(fact.is_consolidated());
        fact.segments = Some("BusinessSegments=Americas;".to_string());
        assert!(!fact.is_consolidated());
    }

    #[test]
    fn test_metadata_parsing() {
        assert_eq!(ValueType::from_datatype("perShare"), ValueType::PerShare);
        assert_eq!(ValueType::from_datatype("shares"), ValueType::Shares);
        assert_eq!(ValueType::from_datatype("pure"), ValueType::Other);
        assert_eq!(FactKind::from_iord("I"), FactKind::Instant);
        assert_eq!(FactKind::from_iord("D"), FactKind::Duration);
        assert_eq!(Polarity::from_crdr("c"), Some(Polarity::Credit));
        assert_eq!(Polarity::from_crdr(""), None);
    }
}
