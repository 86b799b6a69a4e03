//! Reporting period definitions.
//!
//! A [`Period`] is an end date plus a duration in fiscal quarters, where zero
//! quarters denotes a point-in-time (instant) period. [`PeriodKey`] is the
//! compact, ordered identity used to key per-period values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ReconError;

/// Per-period amounts keyed by period.
pub type PeriodValues = BTreeMap<PeriodKey, f64>;

/// Identity of a reporting period: end date and duration in quarters.
///
/// Serialized as `"{end}/{quarters}"` (e.g. `"2024-06-30/2"`) so it can key
/// JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeriodKey {
    /// Period end date.
    pub end: NaiveDate,
    /// Duration in quarters; 0 for instants.
    pub quarters: u8,
}

impl PeriodKey {
    /// Creates a period key.
    #[must_use]
    pub const fn new(end: NaiveDate, quarters: u8) -> Self {
        Self { end, quarters }
    }

    /// Creates an instant period key.
    #[must_use]
    pub const fn instant(end: NaiveDate) -> Self {
        Self::new(end, 0)
    }

    /// Returns true for a point-in-time period.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.quarters == 0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.end, self.quarters)
    }
}

impl FromStr for PeriodKey {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (end, quarters) = s
            .split_once('/')
            .ok_or_else(|| ReconError::Parse(format!("Invalid period key: {}", s)))?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|e| ReconError::Parse(e.to_string()))?;
        let quarters = quarters
            .parse::<u8>()
            .map_err(|e| ReconError::Parse(e.to_string()))?;
        Ok(Self::new(end, quarters))
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = ReconError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A discovered reporting period with its display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Period end date.
    pub end: NaiveDate,
    /// Duration in quarters; 0 for instants.
    pub quarters: u8,
    /// Human-readable label, e.g. "Six Months Ended Jun 30, 2024".
    pub label: String,
}

impl Period {
    /// Creates a period and derives its label.
    #[must_use]
    pub fn new(end: NaiveDate, quarters: u8) -> Self {
        Self {
            end,
            quarters,
            label: period_label(end, quarters),
        }
    }

    /// Creates an instant period.
    #[must_use]
    pub fn instant(end: NaiveDate) -> Self {
        Self::new(end, 0)
    }

    /// The key identifying this period.
    #[must_use]
    pub const fn key(&self) -> PeriodKey {
        PeriodKey::new(self.end, self.quarters)
    }

    /// Returns true for a point-in-time period.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.quarters == 0
    }
}

impl From<PeriodKey> for Period {
    fn from(key: PeriodKey) -> Self {
        Self::new(key.end, key.quarters)
    }
}

/// Builds the display label for a period.
#[must_use]
pub fn period_label(end: NaiveDate, quarters: u8) -> String {
    let date = end.format("%b %d, %Y");
    match quarters {
        0 => format!("As of {}", date),
        1 => format!("Three Months Ended {}", date),
        2 => format!("Six Months Ended {}", date),
        3 => format!("Nine Months Ended {}", date),
        4 => format!("Year Ended {}", date),
        n => format!("{} Months Ended {}", u32::from(n) * 3, date),
    }
}
