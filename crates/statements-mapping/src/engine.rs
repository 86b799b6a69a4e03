//! Statement mapping.
//!
//! [`MappingEngine::map`] runs the per-statement steps in order: identify the
//! control totals, choose the balance sheet strategy, assign line items to
//! standard fields through the ordered rules, aggregate, and for balance
//! sheets validate and derive residuals.

use std::collections::HashSet;

use statements_core::{ReconConfig, Result, StatementKind};
use statements_recon::{NodeId, ReconstructedStatement, is_control_tag};
use tracing::{debug, info};

use crate::aggregate::{Assignment, aggregate, mapped_ancestors, split_stockholders_equity};
use crate::controls::{ControlLines, identify_controls};
use crate::normalize::LabelNormalizer;
use crate::pattern::Candidate;
use crate::residual::{
    SPLIT_UNAVAILABLE, UNBALANCED_PERIOD, derive_balance_sheet, unbalanced_periods,
};
use crate::rules::{RuleBook, RuleSet, Strategy, cash_flow};
use crate::standardized::{MappingStatus, SourceItem, StandardizedStatement};

/// Maps reconstructed statements onto the standard schema.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    normalizer: LabelNormalizer,
    book: RuleBook,
    config: ReconConfig,
}

impl MappingEngine {
    /// Compiles every rule table.
    pub fn new(config: ReconConfig) -> Result<Self> {
        let normalizer = LabelNormalizer::new()?;
        let book = RuleBook::new(&normalizer)?;
        Ok(Self {
            normalizer,
            book,
            config,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// The compiled rule tables.
    #[must_use]
    pub const fn rules(&self) -> &RuleBook {
        &self.book
    }

    /// Maps one statement. Returns `None` for statement types without rule
    /// tables (equity and comprehensive income).
    pub fn map(&self, statement: &ReconstructedStatement) -> Option<StandardizedStatement> {
        let kind = statement.kind;
        let tree = &statement.tree;

        let mut ids: Vec<NodeId> = tree.ids().filter(|&id| !tree.node(id).is_virtual()).collect();
        ids.sort_by_key(|&id| tree.node(id).line);
        let candidates: Vec<_> = ids
            .iter()
            .map(|&id| {
                let item = tree.node(id);
                (item, Candidate::from_item(item, &self.normalizer))
            })
            .collect();

        let controls = identify_controls(self.book.controls(kind), &candidates);
        let mut notes = Vec::new();
        let strategy = match kind {
            StatementKind::BalanceSheet if controls.has_current_split() => Strategy::Classified,
            StatementKind::BalanceSheet => {
                debug!(statement = %kind, "No current/non-current split");
                notes.push(SPLIT_UNAVAILABLE.to_string());
                Strategy::Unclassified
            }
            _ => Strategy::Classified,
        };
        let rules = self.book.rules(kind, strategy)?;

        let mut assignments = Vec::new();
        let mut skipped = Vec::new();
        let mut unmapped = Vec::new();
        let mut taken_min: HashSet<&str> = HashSet::new();

        for (&id, (item, candidate)) in ids.iter().zip(&candidates) {
            if item.values.is_empty() {
                continue;
            }
            if let Some(field) = controls.field_at(item.line) {
                assignments.push(Assignment::new(id, field));
                continue;
            }
            if kind == StatementKind::BalanceSheet
                && !item.calc_parent.as_deref().is_none_or(is_control_tag)
            {
                debug!(line = item.line, tag = %item.tag, "Carried by a calculation parent, skipping");
                skipped.push(SourceItem::new(item, false));
                continue;
            }

            let target = match_rule(rules, candidate, &controls, &taken_min).or_else(|| {
                (kind == StatementKind::CashFlow)
                    .then(|| cash_flow_section(item.line, &controls))
                    .flatten()
            });
            match target {
                Some((target, select_min)) => {
                    if select_min {
                        taken_min.insert(target);
                    }
                    assignments.push(Assignment::new(id, target));
                }
                None => unmapped.push(SourceItem::new(item, false)),
            }
        }

        split_stockholders_equity(&mut assignments, tree);
        let ancestors = mapped_ancestors(tree, &assignments, &controls);
        let mut fields = aggregate(tree, &assignments, &ancestors);

        let (strategy, status) = if kind == StatementKind::BalanceSheet {
            let current = statement.current_period().map(|p| p.key());
            let status = derive_balance_sheet(
                &mut fields,
                strategy,
                current,
                statement.metadata.sic,
                &self.config,
            );
            if let (true, Some(current)) = (status.is_mapped(), current) {
                for period in unbalanced_periods(&fields, &current, self.config.equation_tolerance) {
                    notes.push(format!("{UNBALANCED_PERIOD}: {period}"));
                }
            }
            (Some(strategy), status)
        } else {
            (None, MappingStatus::Mapped)
        };

        info!(
            statement = %kind,
            controls = controls.len(),
            fields = fields.len(),
            skipped = skipped.len(),
            unmapped = unmapped.len(),
            mapped = status.is_mapped(),
            "Mapped statement"
        );

        Some(StandardizedStatement {
            kind,
            periods: statement.periods.clone(),
            fields,
            controls,
            strategy,
            status,
            notes,
            skipped,
            unmapped,
            metadata: statement.metadata.clone(),
        })
    }

    /// Maps every statement that has rule tables.
    pub fn map_all(&self, statements: &[ReconstructedStatement]) -> Vec<StandardizedStatement> {
        statements.iter().filter_map(|s| self.map(s)).collect()
    }
}

/// First rule matching `candidate`. A `min{}` rule whose field is already
/// taken is passed over.
fn match_rule(
    rules: &RuleSet,
    candidate: &Candidate,
    controls: &ControlLines,
    taken_min: &HashSet<&str>,
) -> Option<(&'static str, bool)> {
    rules
        .iter()
        .filter(|rule| {
            !rule.pattern.select_min()
                || !(taken_min.contains(rule.target) || controls.contains(rule.target))
        })
        .find(|rule| rule.pattern.matches(candidate, controls))
        .map(|rule| (rule.target, rule.pattern.select_min()))
}

/// The `other_*_activities` field of the cash flow section holding `line`.
fn cash_flow_section(line: u32, controls: &ControlLines) -> Option<(&'static str, bool)> {
    let mut start = 0;
    for &(control, other) in cash_flow::SECTIONS {
        let Some(end) = controls.line(control) else {
            continue;
        };
        if line > start && line < end {
            return Some((other, false));
        }
        start = end;
    }
    None
}
