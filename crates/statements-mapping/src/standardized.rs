//! Standardized statement output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statements_core::{Period, PeriodKey, PeriodValues, StatementKind};
use statements_recon::{LineItem, StatementMetadata};

use crate::controls::ControlLines;
use crate::rules::Strategy;

/// Where a standard field's values came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Summed from mapped line items.
    Mapped,
    /// Total minus the mapped components of its section.
    Residual,
    /// Computed from other totals.
    Derived,
}

/// A line item that contributed to (or was kept out of) a standard field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Concept tag.
    pub tag: String,
    /// Presentation label.
    pub label: String,
    /// Line order within the statement.
    pub line: u32,
    /// True if a calculation or presentation ancestor is itself mapped to a
    /// non-control field.
    pub has_mapped_ancestor: bool,
}

impl SourceItem {
    /// Source record for a line item.
    #[must_use]
    pub fn new(item: &LineItem, has_mapped_ancestor: bool) -> Self {
        Self {
            tag: item.tag.clone(),
            label: item.label.clone(),
            line: item.line,
            has_mapped_ancestor,
        }
    }
}

/// Values of one standard field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardField {
    /// Amount per period.
    pub values: PeriodValues,
    /// Contributing line items.
    pub sources: Vec<SourceItem>,
    /// How the values were obtained.
    pub provenance: Provenance,
    /// Part of `values` contributed by items with a mapped ancestor. Kept out
    /// of residual subtraction.
    #[serde(default, skip_serializing_if = "PeriodValues::is_empty")]
    pub nested: PeriodValues,
}

impl StandardField {
    /// An empty mapped field.
    #[must_use]
    pub fn mapped() -> Self {
        Self {
            values: PeriodValues::new(),
            sources: Vec::new(),
            provenance: Provenance::Mapped,
            nested: PeriodValues::new(),
        }
    }

    /// A computed field with no line item sources.
    #[must_use]
    pub fn computed(values: PeriodValues, provenance: Provenance) -> Self {
        Self {
            values,
            sources: Vec::new(),
            provenance,
            nested: PeriodValues::new(),
        }
    }

    /// Amount for a period.
    #[must_use]
    pub fn value(&self, period: &PeriodKey) -> Option<f64> {
        self.values.get(period).copied()
    }

    /// Amount for a period that residuals may subtract.
    #[must_use]
    pub fn residual_basis(&self, period: &PeriodKey) -> Option<f64> {
        let value = self.value(period)?;
        Some(value - self.nested.get(period).copied().unwrap_or(0.0))
    }
}

/// Outcome of mapping a statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MappingStatus {
    /// Mapped; residuals computed where applicable.
    Mapped,
    /// An accounting invariant failed. Mapped fields are kept, nothing was
    /// derived.
    Halted {
        /// The invariant that failed.
        invariant: String,
        /// The figures involved.
        figures: BTreeMap<String, f64>,
    },
    /// Derivation deliberately not attempted.
    Skipped(String),
}

impl MappingStatus {
    /// Returns true for a fully mapped statement.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped)
    }

    /// Returns true if an invariant failed.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self, Self::Halted { .. })
    }
}

/// A statement expressed in standard fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardizedStatement {
    /// Statement type.
    pub kind: StatementKind,
    /// Periods, most recent first.
    pub periods: Vec<Period>,
    /// Standard fields by name.
    pub fields: BTreeMap<String, StandardField>,
    /// Identified control totals.
    pub controls: ControlLines,
    /// Balance sheet strategy; `None` for other statements.
    pub strategy: Option<Strategy>,
    /// Mapping outcome.
    pub status: MappingStatus,
    /// Non-fatal observations, such as an unavailable current/non-current split.
    pub notes: Vec<String>,
    /// Lines skipped because a calculation ancestor below the control totals
    /// already carries them.
    pub skipped: Vec<SourceItem>,
    /// Lines with values that matched no rule.
    pub unmapped: Vec<SourceItem>,
    /// Filing details of the source statement.
    pub metadata: StatementMetadata,
}

impl StandardizedStatement {
    /// A field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&StandardField> {
        self.fields.get(name)
    }

    /// Amount of a field for a period.
    #[must_use]
    pub fn value(&self, name: &str, period: &PeriodKey) -> Option<f64> {
        self.field(name)?.value(period)
    }

    /// Amount of a field for the most recent period.
    #[must_use]
    pub fn current_value(&self, name: &str) -> Option<f64> {
        let period = self.periods.first()?.key();
        self.value(name, &period)
    }

    /// Returns true if the notes mention `note`.
    #[must_use]
    pub fn has_note(&self, note: &str) -> bool {
        self.notes.iter().any(|n| n == note)
    }
}
