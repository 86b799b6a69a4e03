//! Statement validation.
//!
//! Two families of checks run on a reconstructed statement:
//!
//! - roll-up checks: a roll-up node equals the weighted sum of its calculation
//!   children, for every period where all children have values;
//! - statement equations: `Assets = Liabilities and Equity` and the
//!   current/non-current splits on the balance sheet, and
//!   `opening cash + net change = ending cash` on the cash flow statement.
//!
//! Failures are reported, never raised. The caller decides what to do with an
//! unbalanced statement.

use serde::{Deserialize, Serialize};
use statements_core::{PeriodKey, StatementKind, local_name};
use tracing::warn;

use crate::hierarchy::{NodeId, StatementTree};
use crate::values::is_opening_item;

/// Relative difference of `other` from `reference`: `|reference - other| / |reference|`.
///
/// Two zeros are equal. A non-zero amount against a zero reference is
/// infinitely far off.
#[must_use]
pub fn relative_difference(reference: f64, other: f64) -> f64 {
    if reference == 0.0 {
        if other == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        (reference - other).abs() / reference.abs()
    }
}

/// Returns true if `other` is within a relative tolerance of `reference`.
#[must_use]
pub fn within_tolerance(reference: f64, other: f64, tolerance: f64) -> bool {
    relative_difference(reference, other) < tolerance
}

/// A roll-up node whose children do not add up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollupIssue {
    /// Tag of the roll-up node.
    pub tag: String,
    /// Presentation label of the roll-up node.
    pub label: String,
    /// Period checked.
    pub period: PeriodKey,
    /// Value reported for the node.
    pub reported: f64,
    /// Weighted sum of the children.
    pub computed: f64,
    /// `|reported - computed| / |reported|`.
    pub relative_diff: f64,
}

/// Outcome of one statement equation for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquationCheck {
    /// Human-readable equation, e.g. `Assets = LiabilitiesAndStockholdersEquity`.
    pub equation: String,
    /// Period checked.
    pub period: PeriodKey,
    /// Left-hand side.
    pub lhs: f64,
    /// Right-hand side.
    pub rhs: f64,
    /// Whether the sides agree within tolerance.
    pub passed: bool,
}

impl EquationCheck {
    fn new(equation: &str, period: PeriodKey, lhs: f64, rhs: f64, tolerance: f64) -> Self {
        Self {
            equation: equation.to_string(),
            period,
            lhs,
            rhs,
            passed: within_tolerance(lhs, rhs, tolerance),
        }
    }

    /// `lhs - rhs`.
    #[must_use]
    pub fn difference(&self) -> f64 {
        self.lhs - self.rhs
    }
}

/// All validation findings for a statement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Roll-ups that failed the tolerance check.
    pub rollup_issues: Vec<RollupIssue>,
    /// Number of roll-up checks performed.
    pub rollups_checked: usize,
    /// Statement equations evaluated.
    pub equations: Vec<EquationCheck>,
}

impl ValidationReport {
    /// Returns true if every roll-up and equation check passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rollup_issues.is_empty() && self.equations.iter().all(|e| e.passed)
    }

    /// Equations that failed.
    pub fn failed_equations(&self) -> impl Iterator<Item = &EquationCheck> {
        self.equations.iter().filter(|e| !e.passed)
    }
}

/// Validates roll-ups and statement equations.
#[must_use]
pub fn validate(
    kind: StatementKind,
    tree: &StatementTree,
    rollup_tolerance: f64,
    equation_tolerance: f64,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_rollups(tree, rollup_tolerance, &mut report);
    match kind {
        StatementKind::BalanceSheet => balance_sheet_equations(tree, equation_tolerance, &mut report),
        StatementKind::CashFlow => cash_flow_equation(tree, equation_tolerance, &mut report),
        _ => {}
    }

    for issue in &report.rollup_issues {
        warn!(
            statement = %kind,
            tag = %issue.tag,
            period = %issue.period,
            reported = issue.reported,
            computed = issue.computed,
            "Roll-up does not match its children"
        );
    }
    for check in report.failed_equations() {
        warn!(
            statement = %kind,
            equation = %check.equation,
            period = %check.period,
            lhs = check.lhs,
            rhs = check.rhs,
            "Statement equation violated"
        );
    }
    report
}

fn validate_rollups(tree: &StatementTree, tolerance: f64, report: &mut ValidationReport) {
    for id in tree.ids() {
        let node = tree.node(id);
        if !node.is_roll_up || node.is_virtual() {
            continue;
        }
        let children: Option<Vec<_>> = node
            .calc_children
            .iter()
            .map(|c| tree.find_tag(&c.tag).map(|child| (child, c.weight)))
            .collect();
        let Some(children) = children else {
            continue;
        };

        for (&period, &reported) in &node.values {
            let computed: Option<f64> = children
                .iter()
                .map(|&(child, weight)| tree.node(child).values.get(&period).map(|v| v * weight))
                .sum();
            let Some(computed) = computed else {
                continue;
            };
            report.rollups_checked += 1;

            let relative_diff = relative_difference(reported, computed);
            if relative_diff >= tolerance {
                report.rollup_issues.push(RollupIssue {
                    tag: node.tag.clone(),
                    label: node.label.clone(),
                    period,
                    reported,
                    computed,
                    relative_diff,
                });
            }
        }
    }
}

fn balance_sheet_equations(tree: &StatementTree, tolerance: f64, report: &mut ValidationReport) {
    let assets = tree.find_tag("Assets");
    let total = tree
        .find_tag("LiabilitiesAndStockholdersEquity")
        .or_else(|| tree.find_tag("LiabilitiesAndEquity"));

    if let (Some(assets), Some(total)) = (assets, total) {
        for (&period, &lhs) in &tree.node(assets).values {
            if let Some(&rhs) = tree.node(total).values.get(&period) {
                report.equations.push(EquationCheck::new(
                    "Assets = LiabilitiesAndStockholdersEquity",
                    period,
                    lhs,
                    rhs,
                    tolerance,
                ));
            }
        }
    }

    split_equation(tree, "Assets", "AssetsCurrent", "AssetsNoncurrent", tolerance, report);
    split_equation(
        tree,
        "Liabilities",
        "LiabilitiesCurrent",
        "LiabilitiesNoncurrent",
        tolerance,
        report,
    );
}

fn split_equation(
    tree: &StatementTree,
    total: &str,
    current: &str,
    noncurrent: &str,
    tolerance: f64,
    report: &mut ValidationReport,
) {
    let (Some(t), Some(c), Some(n)) = (
        tree.find_tag(total),
        tree.find_tag(current),
        tree.find_tag(noncurrent),
    ) else {
        return;
    };
    let equation = format!("{} = {} + {}", total, current, noncurrent);
    for (&period, &lhs) in &tree.node(t).values {
        let (Some(cv), Some(nv)) = (
            tree.node(c).values.get(&period),
            tree.node(n).values.get(&period),
        ) else {
            continue;
        };
        report
            .equations
            .push(EquationCheck::new(&equation, period, lhs, cv + nv, tolerance));
    }
}

/// Finds the opening cash, net change and ending cash nodes of a cash flow
/// statement.
fn cash_nodes(tree: &StatementTree) -> Option<(NodeId, NodeId, NodeId)> {
    let is_cash = |id: NodeId| {
        let node = tree.node(id);
        node.is_instant()
            && (node.label.to_lowercase().contains("cash")
                || node.tag.to_lowercase().contains("cash"))
    };

    let ids: Vec<NodeId> = tree
        .ids()
        .filter(|&id| !tree.node(id).is_virtual())
        .collect();
    let opening = ids
        .iter()
        .copied()
        .find(|&id| is_cash(id) && is_opening_item(tree.node(id), true))?;
    let ending = ids
        .iter()
        .copied()
        .filter(|&id| is_cash(id) && !is_opening_item(tree.node(id), true))
        .max_by_key(|&id| tree.node(id).line)?;
    let change = ids
        .iter()
        .copied()
        .filter(|&id| local_name(&tree.node(id).tag).contains("PeriodIncreaseDecrease"))
        .max_by_key(|&id| {
            let tag = tree.node(id).tag.to_lowercase();
            (tag.contains("cash"), !tag.contains("excludingexchangerateeffect"))
        })?;
    Some((opening, change, ending))
}

fn cash_flow_equation(tree: &StatementTree, tolerance: f64, report: &mut ValidationReport) {
    let Some((opening, change, ending)) = cash_nodes(tree) else {
        return;
    };
    for (&period, &closing) in &tree.node(ending).values {
        let (Some(open), Some(delta)) = (
            tree.node(opening).values.get(&period),
            tree.node(change).values.get(&period),
        ) else {
            continue;
        };
        report.equations.push(EquationCheck::new(
            "OpeningCash + NetChange = EndingCash",
            period,
            open + delta,
            closing,
            tolerance,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::{AncestorLookup, mark_roll_ups};
    use chrono::NaiveDate;
    use statements_core::{CalcGraphBuilder, FactKind, PresentationRow, TagInfo};
    use std::collections::HashMap;

    fn key() -> PeriodKey {
        PeriodKey::instant(NaiveDate::from_ymd_opt(2024, 6, 29).unwrap())
    }

    fn tree(kind: StatementKind, rows: &[(u32, u32, &str, &str)]) -> StatementTree {
        let rows: Vec<_> = rows
            .iter()
            .map(|&(line, indent, tag, label)| PresentationRow {
                adsh: "a".to_string(),
                report: 2,
                line,
                statement: kind,
                indent,
                tag: tag.to_string(),
                label: label.to_string(),
                negating: false,
            })
            .collect();
        let tags: HashMap<_, _> = rows
            .iter()
            .map(|r| (r.tag.clone(), TagInfo::new(r.tag.clone(), FactKind::Instant)))
            .collect();
        let refs: Vec<_> = rows.iter().collect();
        StatementTree::build(kind, &refs, &tags).unwrap()
    }

    fn set(tree: &mut StatementTree, tag: &str, value: f64) {
        let id = tree.find_tag(tag).unwrap();
        tree.node_mut(id).values.insert(key(), value);
    }

    #[test]
    fn test_relative_difference() {
        assert_eq!(relative_difference(0.0, 0.0), 0.0);
        assert!(within_tolerance(554_818_000_000.0, 554_818_000_000.0, 0.001));
        assert!(within_tolerance(1000.0, 1000.9, 0.001));
        assert!(!within_tolerance(1000.0, 1002.0, 0.001));
        // Measured against the reference amount, not the average of both.
        assert_eq!(relative_difference(1000.0, 1001.0), 0.001);
        assert!(!within_tolerance(1000.0, 1001.0, 0.001));
        assert_eq!(relative_difference(0.0, 5.0), f64::INFINITY);
    }

    #[test]
    fn test_balance_sheet_equations() {
        let mut t = tree(
            StatementKind::BalanceSheet,
            &[
                (1, 0, "Assets", "Total assets"),
                (2, 1, "AssetsCurrent", "Total current assets"),
                (3, 1, "AssetsNoncurrent", "Total non-current assets"),
                (4, 0, "LiabilitiesAndStockholdersEquity", "Total liabilities and equity"),
            ],
        );
        set(&mut t, "Assets", 554_818_000_000.0);
        set(&mut t, "AssetsCurrent", 200_000_000_000.0);
        set(&mut t, "AssetsNoncurrent", 354_818_000_000.0);
        set(&mut t, "LiabilitiesAndStockholdersEquity", 554_818_000_000.0);

        let report = validate(StatementKind::BalanceSheet, &t, 0.001, 0.001);
        assert_eq!(report.equations.len(), 2);
        assert!(report.is_clean());
        assert_eq!(report.equations[0].difference(), 0.0);
    }

    #[test]
    fn test_unbalanced_balance_sheet_is_reported() {
        let mut t = tree(
            StatementKind::BalanceSheet,
            &[
                (1, 0, "Assets", "Total assets"),
                (2, 0, "LiabilitiesAndStockholdersEquity", "Total liabilities and equity"),
            ],
        );
        set(&mut t, "Assets", 100.0);
        set(&mut t, "LiabilitiesAndStockholdersEquity", 90.0);
        let report = validate(StatementKind::BalanceSheet, &t, 0.001, 0.001);
        assert!(!report.is_clean());
        assert_eq!(report.failed_equations().count(), 1);
    }

    #[test]
    fn test_rollup_validation() {
        let mut t = tree(
            StatementKind::BalanceSheet,
            &[
                (1, 0, "AssetsCurrent", "Total current assets"),
                (2, 1, "Cash", "Cash"),
                (3, 1, "AccountsReceivableNetCurrent", "Receivables"),
                (4, 1, "AllowanceForDoubtfulAccounts", "Allowance"),
            ],
        );
        set(&mut t, "AssetsCurrent", 140.0);
        set(&mut t, "Cash", 100.0);
        set(&mut t, "AccountsReceivableNetCurrent", 50.0);
        set(&mut t, "AllowanceForDoubtfulAccounts", 10.0);

        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("us-gaap_AssetsCurrent", "us-gaap_Cash", 1.0, 1.0);
        builder.add_arc("us-gaap_AssetsCurrent", "us-gaap_AccountsReceivableNetCurrent", 1.0, 2.0);
        builder.add_arc("us-gaap_AssetsCurrent", "us-gaap_AllowanceForDoubtfulAccounts", -1.0, 3.0);
        let graph = builder.build();
        mark_roll_ups(&mut t, &graph, &AncestorLookup::new(&graph));

        let report = validate(StatementKind::BalanceSheet, &t, 0.001, 0.001);
        assert_eq!(report.rollups_checked, 1);
        assert!(report.rollup_issues.is_empty());

        set(&mut t, "Cash", 120.0);
        let report = validate(StatementKind::BalanceSheet, &t, 0.001, 0.001);
        assert_eq!(report.rollup_issues.len(), 1);
        assert_eq!(report.rollup_issues[0].computed, 160.0);
    }

    #[test]
    fn test_rollup_skipped_when_child_missing() {
        let mut t = tree(
            StatementKind::BalanceSheet,
            &[
                (1, 0, "AssetsCurrent", "Total current assets"),
                (2, 1, "Cash", "Cash"),
            ],
        );
        set(&mut t, "AssetsCurrent", 140.0);
        set(&mut t, "Cash", 100.0);
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("AssetsCurrent", "Cash", 1.0, 1.0);
        builder.add_arc("AssetsCurrent", "InventoryNet", 1.0, 2.0);
        let graph = builder.build();
        mark_roll_ups(&mut t, &graph, &AncestorLookup::new(&graph));

        let report = validate(StatementKind::BalanceSheet, &t, 0.001, 0.001);
        assert_eq!(report.rollups_checked, 0);
    }
}
