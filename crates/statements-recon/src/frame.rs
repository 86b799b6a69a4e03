//! Ingestion of the raw data set tables.
//!
//! The storage layer hands over the SUB, PRE, NUM and TAG tables as polars
//! [`DataFrame`]s with the column names of the published data sets. This module
//! converts them into the typed rows of `statements-core`.
//!
//! Columns are cast before reading, so integer columns stored as text and date
//! columns stored as `yyyymmdd` integers are both accepted.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use polars::prelude::*;
use statements_core::{
    FactKind, FilingData, FilingId, NumericFact, Polarity, PresentationRow, ReconError, Result,
    StatementKind, Submission, TagInfo, ValueType,
};
use tracing::{debug, warn};

// ===== Column helpers =====

fn column<'a>(df: &'a DataFrame, table: &str, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| ReconError::MissingColumn {
        table: table.to_string(),
        column: name.to_string(),
    })
}

fn strings(df: &DataFrame, table: &str, name: &str) -> Result<StringChunked> {
    let cast = column(df, table, name)?
        .cast(&DataType::String)
        .map_err(|e| ReconError::Parse(e.to_string()))?;
    cast.str()
        .cloned()
        .map_err(|e| ReconError::Parse(e.to_string()))
}

fn optional_strings(df: &DataFrame, table: &str, name: &str) -> Result<Option<StringChunked>> {
    if df.column(name).is_err() {
        return Ok(None);
    }
    strings(df, table, name).map(Some)
}

fn integers(df: &DataFrame, table: &str, name: &str) -> Result<Int64Chunked> {
    let cast = column(df, table, name)?
        .cast(&DataType::Int64)
        .map_err(|e| ReconError::Parse(e.to_string()))?;
    cast.i64()
        .cloned()
        .map_err(|e| ReconError::Parse(e.to_string()))
}

fn optional_integers(df: &DataFrame, table: &str, name: &str) -> Result<Option<Int64Chunked>> {
    if df.column(name).is_err() {
        return Ok(None);
    }
    integers(df, table, name).map(Some)
}

fn floats(df: &DataFrame, table: &str, name: &str) -> Result<Float64Chunked> {
    let cast = column(df, table, name)?
        .cast(&DataType::Float64)
        .map_err(|e| ReconError::Parse(e.to_string()))?;
    cast.f64()
        .cloned()
        .map_err(|e| ReconError::Parse(e.to_string()))
}

fn required<T>(value: Option<T>, table: &str, name: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| {
        ReconError::InvalidInput(format!("{} row {} has no {}", table, row, name))
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses a data set date, either `yyyymmdd` or ISO `yyyy-mm-dd`.
pub fn parse_ddate(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|e| ReconError::Parse(format!("Invalid date {}: {}", s, e)))
}

fn to_u32(value: i64, table: &str, name: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ReconError::InvalidInput(format!("{}.{} out of range: {}", table, name, value)))
}

// ===== Table readers =====

/// Reads the SUB table.
pub fn submissions(df: &DataFrame) -> Result<Vec<Submission>> {
    const T: &str = "SUB";
    let adsh = strings(df, T, "adsh")?;
    let cik = integers(df, T, "cik")?;
    let name = optional_strings(df, T, "name")?;
    let sic = optional_integers(df, T, "sic")?;
    let fy = optional_integers(df, T, "fy")?;
    let fp = optional_strings(df, T, "fp")?;
    let period = optional_strings(df, T, "period")?;
    let form = optional_strings(df, T, "form")?;

    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let adsh = required(adsh.get(i), T, "adsh", i)?;
        let cik = required(cik.get(i), T, "cik", i)?;
        let cik = u64::try_from(cik)
            .map_err(|_| ReconError::InvalidInput(format!("SUB.cik out of range: {}", cik)))?;

        let mut submission = Submission::new(FilingId::new(cik, adsh));
        submission.name = name.as_ref().and_then(|c| non_empty(c.get(i)));
        submission.sic = sic
            .as_ref()
            .and_then(|c| c.get(i))
            .and_then(|v| u32::try_from(v).ok());
        submission.fiscal_year = fy
            .as_ref()
            .and_then(|c| c.get(i))
            .and_then(|v| i32::try_from(v).ok());
        submission.fiscal_period = fp.as_ref().and_then(|c| non_empty(c.get(i)));
        submission.period = match period.as_ref().and_then(|c| non_empty(c.get(i))) {
            Some(s) => Some(parse_ddate(&s)?),
            None => None,
        };
        submission.form = form.as_ref().and_then(|c| non_empty(c.get(i)));
        out.push(submission);
    }
    Ok(out)
}

/// Reads the PRE table, skipping rows of statement types the engine does not know.
pub fn presentation_rows(df: &DataFrame) -> Result<Vec<PresentationRow>> {
    const T: &str = "PRE";
    let adsh = strings(df, T, "adsh")?;
    let report = integers(df, T, "report")?;
    let line = integers(df, T, "line")?;
    let stmt = strings(df, T, "stmt")?;
    let inpth = integers(df, T, "inpth")?;
    let tag = strings(df, T, "tag")?;
    let plabel = strings(df, T, "plabel")?;
    let negating = optional_integers(df, T, "negating")?;

    let mut out = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for i in 0..df.height() {
        let Ok(statement) = required(stmt.get(i), T, "stmt", i)?.parse::<StatementKind>() else {
            skipped += 1;
            continue;
        };
        out.push(PresentationRow {
            adsh: required(adsh.get(i), T, "adsh", i)?.to_string(),
            report: to_u32(required(report.get(i), T, "report", i)?, T, "report")?,
            line: to_u32(required(line.get(i), T, "line", i)?, T, "line")?,
            statement,
            indent: to_u32(inpth.get(i).unwrap_or(0), T, "inpth")?,
            tag: required(tag.get(i), T, "tag", i)?.to_string(),
            label: plabel.get(i).unwrap_or_default().to_string(),
            negating: negating
                .as_ref()
                .and_then(|c| c.get(i))
                .is_some_and(|v| v != 0),
        });
    }
    if skipped > 0 {
        debug!(skipped, "Skipped presentation rows with unsupported statement types");
    }
    Ok(out)
}

/// Reads the NUM table. Rows without a value are dropped.
pub fn numeric_facts(df: &DataFrame) -> Result<Vec<NumericFact>> {
    const T: &str = "NUM";
    let adsh = strings(df, T, "adsh")?;
    let tag = strings(df, T, "tag")?;
    let ddate = strings(df, T, "ddate")?;
    let qtrs = integers(df, T, "qtrs")?;
    let uom = strings(df, T, "uom")?;
    let segments = optional_strings(df, T, "segments")?;
    let coreg = optional_strings(df, T, "coreg")?;
    let value = floats(df, T, "value")?;

    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(amount) = value.get(i) else {
            continue;
        };
        let quarters = required(qtrs.get(i), T, "qtrs", i)?;
        out.push(NumericFact {
            adsh: required(adsh.get(i), T, "adsh", i)?.to_string(),
            tag: required(tag.get(i), T, "tag", i)?.to_string(),
            end: parse_ddate(required(ddate.get(i), T, "ddate", i)?)?,
            quarters: u8::try_from(quarters).map_err(|_| {
                ReconError::InvalidInput(format!("NUM.qtrs out of range: {}", quarters))
            })?,
            unit: uom.get(i).unwrap_or_default().to_string(),
            segments: segments.as_ref().and_then(|c| non_empty(c.get(i))),
            coregistrant: coreg.as_ref().and_then(|c| non_empty(c.get(i))),
            value: amount,
        });
    }
    Ok(out)
}

/// Reads the TAG table into a lookup keyed by tag.
///
/// Custom tags of different filings can share a name; the first record wins.
pub fn tag_infos(df: &DataFrame) -> Result<HashMap<String, TagInfo>> {
    const T: &str = "TAG";
    let tag = strings(df, T, "tag")?;
    let datatype = optional_strings(df, T, "datatype")?;
    let iord = optional_strings(df, T, "iord")?;
    let crdr = optional_strings(df, T, "crdr")?;
    let doc = optional_strings(df, T, "tlabel")?;

    let mut out = HashMap::with_capacity(df.height());
    for i in 0..df.height() {
        let name = required(tag.get(i), T, "tag", i)?;
        if out.contains_key(name) {
            continue;
        }
        let kind = iord
            .as_ref()
            .and_then(|c| c.get(i))
            .map_or(FactKind::Duration, FactKind::from_iord);
        let mut info = TagInfo::new(name, kind);
        if let Some(dt) = datatype.as_ref().and_then(|c| c.get(i)) {
            info = info.with_value_type(ValueType::from_datatype(dt));
        }
        info.polarity = crdr
            .as_ref()
            .and_then(|c| c.get(i))
            .and_then(Polarity::from_crdr);
        info.documentation = doc.as_ref().and_then(|c| non_empty(c.get(i)));
        out.insert(name.to_string(), info);
    }
    Ok(out)
}

// ===== Filing frames =====

/// The four raw tables of a data set (or of a slice of one).
#[derive(Debug, Clone)]
pub struct FilingFrames {
    /// SUB table.
    pub sub: DataFrame,
    /// PRE table.
    pub pre: DataFrame,
    /// NUM table.
    pub num: DataFrame,
    /// TAG table.
    pub tag: DataFrame,
}

impl FilingFrames {
    /// Wraps the four tables.
    #[must_use]
    pub const fn new(sub: DataFrame, pre: DataFrame, num: DataFrame, tag: DataFrame) -> Self {
        Self { sub, pre, num, tag }
    }

    /// Accession numbers present in the SUB table, in sorted order.
    pub fn adshs(&self) -> Result<Vec<String>> {
        let adsh = strings(&self.sub, "SUB", "adsh")?;
        let set: BTreeSet<String> = adsh.into_iter().flatten().map(str::to_string).collect();
        Ok(set.into_iter().collect())
    }

    /// Extracts the typed rows of one filing.
    pub fn filing(&self, adsh: &str) -> Result<FilingData> {
        let submission = submissions(&self.sub)?
            .into_iter()
            .find(|s| s.filing.adsh == adsh);
        if submission.is_none() {
            warn!(adsh = %adsh, "No SUB record for filing");
        }

        let presentation: Vec<_> = presentation_rows(&self.pre)?
            .into_iter()
            .filter(|r| r.adsh == adsh)
            .collect();
        let facts: Vec<_> = numeric_facts(&self.num)?
            .into_iter()
            .filter(|f| f.adsh == adsh)
            .collect();
        let tags = tag_infos(&self.tag)?;

        debug!(
            adsh = %adsh,
            presentation = presentation.len(),
            facts = facts.len(),
            "Loaded filing rows"
        );

        Ok(FilingData {
            submission,
            presentation,
            facts,
            tags,
        })
    }

    /// Extracts every filing of the tables.
    pub fn filings(&self) -> Result<Vec<FilingData>> {
        let submissions = submissions(&self.sub)?;
        let presentation = presentation_rows(&self.pre)?;
        let facts = numeric_facts(&self.num)?;
        let tags = tag_infos(&self.tag)?;

        let mut by_adsh: HashMap<String, FilingData> = submissions
            .into_iter()
            .map(|s| (s.filing.adsh.clone(), FilingData::new(s)))
            .collect();
        for row in presentation {
            if let Some(data) = by_adsh.get_mut(&row.adsh) {
                data.presentation.push(row);
            }
        }
        for fact in facts {
            if let Some(data) = by_adsh.get_mut(&fact.adsh) {
                data.facts.push(fact);
            }
        }

        let mut out: Vec<_> = by_adsh.into_values().collect();
        for data in &mut out {
            data.tags = tags.clone();
        }
        out.sort_by(|a, b| a.filing().cmp(&b.filing()));
        Ok(out)
    }
}
