//! Reconstructed statement output.

use serde::{Deserialize, Serialize};
use statements_core::{CalcSource, FilingId, Period, StatementKind, Submission};

use crate::hierarchy::{LineItem, StatementTree};
use crate::validate::ValidationReport;

/// Filing and provenance details attached to a reconstructed statement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMetadata {
    /// Filing identity.
    pub filing: Option<FilingId>,
    /// Company name.
    pub company: Option<String>,
    /// Form type.
    pub form: Option<String>,
    /// Fiscal year focus.
    pub fiscal_year: Option<i32>,
    /// Fiscal period focus.
    pub fiscal_period: Option<String>,
    /// Standard industrial classification code.
    pub sic: Option<u32>,
    /// Presentation report the statement was read from.
    pub report: u32,
    /// Deep link to the regulator's interactive viewer.
    pub viewer_url: Option<String>,
    /// Source of the calculation graph applied, if any.
    pub calc_source: Option<CalcSource>,
}

impl StatementMetadata {
    /// Metadata for a statement read from `report` of a submission.
    #[must_use]
    pub fn new(submission: Option<&Submission>, report: u32) -> Self {
        let Some(sub) = submission else {
            return Self {
                report,
                ..Default::default()
            };
        };
        Self {
            filing: Some(sub.filing.clone()),
            company: sub.name.clone(),
            form: sub.form.clone(),
            fiscal_year: sub.fiscal_year,
            fiscal_period: sub.fiscal_period.clone(),
            sic: sub.sic,
            report,
            viewer_url: Some(sub.filing.viewer_url()),
            calc_source: None,
        }
    }
}

/// One statement rebuilt from the raw tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedStatement {
    /// Statement type.
    pub kind: StatementKind,
    /// Discovered periods, most recent first.
    pub periods: Vec<Period>,
    /// Presentation tree with values and calculation annotations.
    pub tree: StatementTree,
    /// Roll-up and equation checks.
    pub validation: ValidationReport,
    /// Filing details.
    pub metadata: StatementMetadata,
}

impl ReconstructedStatement {
    /// The root line item (possibly synthesized).
    #[must_use]
    pub fn root(&self) -> &LineItem {
        self.tree.node(self.tree.root())
    }

    /// Real line items in line order.
    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.tree.line_items()
    }

    /// First line item whose tag names the same concept as `tag`.
    #[must_use]
    pub fn item(&self, tag: &str) -> Option<&LineItem> {
        self.tree.find_tag(tag).map(|id| self.tree.node(id))
    }

    /// Most recent period.
    #[must_use]
    pub fn current_period(&self) -> Option<&Period> {
        self.periods.first()
    }
}
