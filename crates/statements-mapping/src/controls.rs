//! Control total identification.
//!
//! Control totals anchor a statement: every position constraint in the rule
//! tables is relative to their lines. For each control, a line carrying one of
//! its canonical tags wins; otherwise the first line in statement order whose
//! label matches the control's pattern. A line is claimed by one control at
//! most and must carry at least one value.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use statements_recon::LineItem;

use crate::pattern::Candidate;
use crate::rules::ControlRule;

/// Field name to line number of the identified control totals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLines {
    lines: BTreeMap<String, u32>,
}

impl ControlLines {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the line of a control.
    pub fn insert(&mut self, field: impl Into<String>, line: u32) {
        self.lines.insert(field.into(), line);
    }

    /// Line of a control, if identified.
    #[must_use]
    pub fn line(&self, field: &str) -> Option<u32> {
        self.lines.get(field).copied()
    }

    /// Returns true if the control was identified.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.lines.contains_key(field)
    }

    /// The control identified at `line`, if any.
    #[must_use]
    pub fn field_at(&self, line: u32) -> Option<&str> {
        self.lines
            .iter()
            .find(|(_, l)| **l == line)
            .map(|(field, _)| field.as_str())
    }

    /// Iterates `(field, line)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.lines.iter().map(|(field, line)| (field.as_str(), *line))
    }

    /// Number of identified controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if no control was identified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if both current totals are present, so the balance sheet can be
    /// mapped with its current/non-current split.
    #[must_use]
    pub fn has_current_split(&self) -> bool {
        self.contains("total_current_assets") && self.contains("total_current_liabilities")
    }
}

/// Identifies the control totals among `items`, given in line order.
#[must_use]
pub fn identify_controls(rules: &[ControlRule], items: &[(&LineItem, Candidate)]) -> ControlLines {
    let mut found = ControlLines::new();
    let mut claimed = HashSet::new();

    for rule in rules {
        let canonical = items.iter().find(|(item, _)| {
            !item.values.is_empty() && !claimed.contains(&item.line) && rule.is_canonical(&item.tag)
        });
        if let Some((item, _)) = canonical {
            claimed.insert(item.line);
            found.insert(rule.field, item.line);
        }
    }

    for (item, candidate) in items {
        if item.values.is_empty() || claimed.contains(&item.line) {
            continue;
        }
        let matched = rules
            .iter()
            .filter(|rule| !found.contains(rule.field))
            .find(|rule| rule.matches_label(candidate, &found))
            .map(|rule| rule.field);
        if let Some(field) = matched {
            claimed.insert(item.line);
            found.insert(field, item.line);
        }
    }
    found
}
