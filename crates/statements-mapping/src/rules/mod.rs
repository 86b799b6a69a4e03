//! Ordered mapping rule tables.
//!
//! Each statement type has a table of control totals (canonical tags plus a
//! fallback label pattern) and an ordered table of `(target, pattern)` item
//! rules. [`RuleBook::new`] compiles every table once.

use serde::{Deserialize, Serialize};
use statements_core::{Result, StatementKind, same_concept};

use crate::controls::ControlLines;
use crate::normalize::LabelNormalizer;
use crate::pattern::{Candidate, Pattern};

/// Balance sheet tables.
pub mod balance;
/// Cash flow statement tables.
pub mod cash_flow;
/// Income statement tables.
pub mod income;
/// Balance sheet tables for statements without a current/non-current split.
pub mod unclassified;

/// An ordered `(target, pattern)` table.
pub type RuleTable = &'static [(&'static str, &'static str)];

/// A control total: canonical tags tried first, then a label pattern.
#[derive(Debug, Clone, Copy)]
pub struct ControlSpec {
    /// Standard field name of the control.
    pub field: &'static str,
    /// Canonical tags, without namespace prefix.
    pub tags: &'static [&'static str],
    /// Fallback label pattern.
    pub pattern: &'static str,
}

/// Balance sheet mapping strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Current and non-current totals are both presented.
    Classified,
    /// No current/non-current split.
    Unclassified,
}

/// A compiled item rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Standard field the rule maps to.
    pub target: &'static str,
    /// Compiled pattern.
    pub pattern: Pattern,
}

/// An ordered list of compiled item rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compiles tables in order, each table's rules in order.
    pub fn compile(tables: &[RuleTable], normalizer: &LabelNormalizer) -> Result<Self> {
        let rules = tables
            .iter()
            .flat_map(|table| table.iter())
            .map(|&(target, source)| {
                Ok(Rule {
                    target,
                    pattern: Pattern::parse(source, normalizer)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A compiled control total rule.
#[derive(Debug, Clone)]
pub struct ControlRule {
    /// Standard field name of the control.
    pub field: &'static str,
    /// Canonical tags.
    pub tags: &'static [&'static str],
    /// Compiled fallback label pattern.
    pub pattern: Pattern,
}

impl ControlRule {
    /// True if `tag` is one of the canonical tags.
    #[must_use]
    pub fn is_canonical(&self, tag: &str) -> bool {
        self.tags.iter().any(|canonical| same_concept(tag, canonical))
    }

    /// True if the label pattern matches.
    #[must_use]
    pub fn matches_label(&self, candidate: &Candidate, controls: &ControlLines) -> bool {
        self.pattern.matches(candidate, controls)
    }
}

fn compile_controls(
    specs: &[ControlSpec],
    normalizer: &LabelNormalizer,
) -> Result<Vec<ControlRule>> {
    specs
        .iter()
        .map(|def| {
            Ok(ControlRule {
                field: def.field,
                tags: def.tags,
                pattern: Pattern::parse(def.pattern, normalizer)?,
            })
        })
        .collect()
}

/// Every rule table, compiled.
#[derive(Debug, Clone)]
pub struct RuleBook {
    balance_sheet_controls: Vec<ControlRule>,
    income_statement_controls: Vec<ControlRule>,
    cash_flow_controls: Vec<ControlRule>,
    balance_sheet: RuleSet,
    unclassified: RuleSet,
    income_statement: RuleSet,
    cash_flow: RuleSet,
}

impl RuleBook {
    /// Compiles all tables.
    pub fn new(normalizer: &LabelNormalizer) -> Result<Self> {
        Ok(Self {
            balance_sheet_controls: compile_controls(balance::CONTROLS, normalizer)?,
            income_statement_controls: compile_controls(income::CONTROLS, normalizer)?,
            cash_flow_controls: compile_controls(cash_flow::CONTROLS, normalizer)?,
            balance_sheet: RuleSet::compile(balance::RULES, normalizer)?,
            unclassified: RuleSet::compile(unclassified::RULES, normalizer)?,
            income_statement: RuleSet::compile(income::RULES, normalizer)?,
            cash_flow: RuleSet::compile(cash_flow::RULES, normalizer)?,
        })
    }

    /// Control totals of a statement type, in priority order. Empty for
    /// statement types that are not mapped.
    #[must_use]
    pub fn controls(&self, kind: StatementKind) -> &[ControlRule] {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet_controls,
            StatementKind::IncomeStatement => &self.income_statement_controls,
            StatementKind::CashFlow => &self.cash_flow_controls,
            _ => &[],
        }
    }

    /// Item rules of a statement type. `strategy` only matters for balance
    /// sheets.
    #[must_use]
    pub fn rules(&self, kind: StatementKind, strategy: Strategy) -> Option<&RuleSet> {
        match (kind, strategy) {
            (StatementKind::BalanceSheet, Strategy::Classified) => Some(&self.balance_sheet),
            (StatementKind::BalanceSheet, Strategy::Unclassified) => Some(&self.unclassified),
            (StatementKind::IncomeStatement, _) => Some(&self.income_statement),
            (StatementKind::CashFlow, _) => Some(&self.cash_flow),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Predicate;

    fn positions(predicate: &Predicate, out: &mut Vec<String>) {
        match predicate {
            Predicate::And(terms) | Predicate::Or(terms) => {
                terms.iter().for_each(|t| positions(t, out));
            }
            Predicate::Not(inner) => positions(inner, out),
            Predicate::Position(_, field) => out.push(field.clone()),
            _ => {}
        }
    }

    #[test]
    fn test_all_tables_compile() {
        let book = RuleBook::new(&LabelNormalizer::new().unwrap()).unwrap();
        assert_eq!(book.controls(StatementKind::BalanceSheet).len(), 9);
        assert!(book.controls(StatementKind::Equity).is_empty());
        assert!(book.rules(StatementKind::Equity, Strategy::Classified).is_none());
        assert!(!book.rules(StatementKind::CashFlow, Strategy::Classified).unwrap().is_empty());
    }

    #[test]
    fn test_positions_reference_controls() {
        let book = RuleBook::new(&LabelNormalizer::new().unwrap()).unwrap();
        for kind in [
            StatementKind::BalanceSheet,
            StatementKind::IncomeStatement,
            StatementKind::CashFlow,
        ] {
            let controls: Vec<_> = book.controls(kind).iter().map(|c| c.field).collect();
            for strategy in [Strategy::Classified, Strategy::Unclassified] {
                for rule in book.rules(kind, strategy).unwrap().iter() {
                    let mut fields = Vec::new();
                    positions(rule.pattern.predicate(), &mut fields);
                    for field in fields {
                        assert!(
                            controls.contains(&field.as_str()),
                            "{kind} rule {} refers to {field}",
                            rule.target
                        );
                    }
                }
            }
        }
    }
}
