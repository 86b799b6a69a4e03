//! Roll-up marking and calculation ancestor lookup.
//!
//! A line item is a roll-up when its tag is a parent in the calculation graph.
//! [`AncestorLookup`] inverts the graph so each child tag knows its immediate
//! parents, and walks upwards to the nearest structural control total.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use statements_core::{CalcGraph, local_name};
use tracing::debug;

use crate::hierarchy::StatementTree;

/// Tags of the structural control totals of a balance sheet, lowercase and
/// without namespace prefix.
pub const CONTROL_ITEM_TAGS: &[&str] = &[
    "assetscurrent",
    "assetsnoncurrent",
    "assetsnoncurrentexcludingpropertyplantandequipment",
    "assetsnoncurrentotherthanpropertyplantandequipmentandfinanceassets",
    "assets",
    "liabilitiescurrent",
    "liabilitiesnoncurrent",
    "liabilitiesotherthanlongtermdebtnoncurrent",
    "liabilities",
    "stockholdersequity",
    "stockholdersequityincludingportionattributabletononcontrollinginterest",
    "equity",
    "equityincludingportionattributabletononcontrollinginterest",
    "liabilitiesandstockholdersequity",
    "assetsnet",
    "liabilitiesandequity",
];

/// Returns true if `tag` is a structural control total.
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    let normalized = local_name(tag).to_ascii_lowercase();
    CONTROL_ITEM_TAGS.contains(&normalized.as_str())
}

/// Child-to-parents index over a calculation graph.
///
/// The graph merges every calculation role of a filing, so a child can sit
/// under a statement total and a note subtotal at once. All parents are kept,
/// in graph order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorLookup {
    parents: HashMap<String, Vec<String>>,
}

impl AncestorLookup {
    /// Builds the lookup from a calculation graph.
    #[must_use]
    pub fn new(graph: &CalcGraph) -> Self {
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();
        for (parent, children) in graph.iter() {
            for child in children {
                let entry = parents.entry(local_name(&child.tag).to_string()).or_default();
                if !entry.iter().any(|p| p == parent) {
                    entry.push(parent.to_string());
                }
            }
        }
        Self { parents }
    }

    /// Number of child tags with a known parent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if the lookup is empty (no calculation graph).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// All calculation parents of `tag`.
    #[must_use]
    pub fn parents_of(&self, tag: &str) -> &[String] {
        self.parents.get(local_name(tag)).map_or(&[], Vec::as_slice)
    }

    /// Preferred calculation parent of `tag`: a control total if one of the
    /// parents is, otherwise the first parent.
    #[must_use]
    pub fn parent_of(&self, tag: &str) -> Option<&str> {
        let parents = self.parents_of(tag);
        parents
            .iter()
            .find(|p| is_control_tag(p))
            .or_else(|| parents.first())
            .map(String::as_str)
    }

    /// Preferred calculation parent of `tag` among those presented on
    /// `tree`. A control total wins, then the first parent on the tree, then
    /// [`parent_of`](Self::parent_of).
    #[must_use]
    pub fn parent_on(&self, tag: &str, tree: &StatementTree) -> Option<&str> {
        let parents = self.parents_of(tag);
        parents
            .iter()
            .find(|p| is_control_tag(p))
            .or_else(|| parents.iter().find(|p| tree.find_tag(p).is_some()))
            .map(String::as_str)
            .or_else(|| self.parent_of(tag))
    }

    /// Returns true if an item with this tag should be mapped: it has no
    /// calculation parent, or one of its parents is a control total. Deeper
    /// descendants are already counted in a mapped subtotal.
    #[must_use]
    pub fn should_map(&self, tag: &str) -> bool {
        let parents = self.parents_of(tag);
        parents.is_empty() || parents.iter().any(|p| is_control_tag(p))
    }

    /// Control-total ancestors of `tag` (excluding itself), nearest first.
    #[must_use]
    pub fn control_ancestors(&self, tag: &str) -> Vec<&str> {
        let mut found = Vec::new();
        let mut visited = HashSet::from([local_name(tag)]);
        let mut queue: VecDeque<&str> = self.parents_of(tag).iter().map(String::as_str).collect();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(local_name(current)) {
                continue;
            }
            if is_control_tag(current) {
                found.push(current);
            }
            queue.extend(self.parents_of(current).iter().map(String::as_str));
        }
        found
    }

    /// Nearest ancestor of `tag` (excluding itself) that is a control total.
    #[must_use]
    pub fn nearest_control_ancestor(&self, tag: &str) -> Option<&str> {
        self.control_ancestors(tag).into_iter().next()
    }
}

/// Marks roll-up nodes and records calculation relationships on every node.
pub fn mark_roll_ups(tree: &mut StatementTree, graph: &CalcGraph, lookup: &AncestorLookup) {
    let mut roll_ups = 0usize;
    for id in tree.ids() {
        let node = tree.node(id);
        if node.is_virtual() {
            continue;
        }
        let children = graph.children(&node.tag).to_vec();
        let calc_parent = lookup.parent_on(&node.tag, tree).map(str::to_string);
        let control_line = lookup
            .control_ancestors(&node.tag)
            .into_iter()
            .find_map(|ancestor| tree.find_tag(ancestor))
            .map(|ancestor| tree.node(ancestor).line);

        let node = tree.node_mut(id);
        node.is_roll_up = !children.is_empty();
        node.calc_children = children;
        node.calc_parent = calc_parent;
        node.control_ancestor_line = control_line;
        if node.is_roll_up {
            roll_ups += 1;
        }
    }
    debug!(roll_ups, "Marked roll-up nodes");
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{CalcGraphBuilder, PresentationRow, StatementKind};

    fn graph() -> CalcGraph {
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("us-gaap_Assets", "us-gaap_AssetsCurrent", 1.0, 1.0);
        builder.add_arc("us-gaap_AssetsCurrent", "us-gaap_CashAndCashEquivalentsAtCarryingValue", 1.0, 1.0);
        builder.add_arc("us-gaap_CashAndCashEquivalentsAtCarryingValue", "us-gaap_Cash", 1.0, 1.0);
        builder.add_arc("us-gaap_CashAndCashEquivalentsAtCarryingValue", "us-gaap_CashEquivalentsAtCarryingValue", 1.0, 2.0);
        builder.build()
    }

    fn row(line: u32, indent: u32, tag: &str, label: &str) -> PresentationRow {
        PresentationRow {
            adsh: "a".to_string(),
            report: 2,
            line,
            statement: StatementKind::BalanceSheet,
            indent,
            tag: tag.to_string(),
            label: label.to_string(),
            negating: false,
        }
    }

    #[test]
    fn test_control_tags() {
        assert!(is_control_tag("us-gaap_AssetsCurrent"));
        assert!(is_control_tag("LiabilitiesAndStockholdersEquity"));
        assert!(!is_control_tag("CashAndCashEquivalentsAtCarryingValue"));
    }

    #[test]
    fn test_should_map() {
        let lookup = AncestorLookup::new(&graph());
        // Parent is a control total.
        assert!(lookup.should_map("CashAndCashEquivalentsAtCarryingValue"));
        // No parent at all.
        assert!(lookup.should_map("Goodwill"));
        // Parent is an ordinary subtotal.
        assert!(!lookup.should_map("Cash"));
        assert!(!lookup.should_map("us-gaap_Cash"));
    }

    #[test]
    fn test_nearest_control_ancestor() {
        let lookup = AncestorLookup::new(&graph());
        assert_eq!(
            lookup.nearest_control_ancestor("Cash"),
            Some("us-gaap_AssetsCurrent")
        );
        assert_eq!(lookup.nearest_control_ancestor("AssetsCurrent"), Some("us-gaap_Assets"));
        assert_eq!(lookup.nearest_control_ancestor("Assets"), None);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("A", "B", 1.0, 1.0);
        builder.add_arc("B", "A", 1.0, 1.0);
        let lookup = AncestorLookup::new(&builder.build());
        assert_eq!(lookup.nearest_control_ancestor("A"), None);
    }

    #[test]
    fn test_control_parent_preferred() {
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("OtherSubtotal", "Cash", 1.0, 1.0);
        builder.add_arc("AssetsCurrent", "Cash", 1.0, 1.0);
        builder.add_arc("OtherSubtotal", "Deposits", 1.0, 2.0);
        let lookup = AncestorLookup::new(&builder.build());
        assert_eq!(lookup.parents_of("Cash").len(), 2);
        assert_eq!(lookup.parent_of("Cash"), Some("AssetsCurrent"));
        assert_eq!(lookup.parent_of("Deposits"), Some("OtherSubtotal"));
        assert!(lookup.parents_of("Goodwill").is_empty());
    }

    #[test]
    fn test_child_under_statement_total_and_note_subtotal() {
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("us-gaap_LiabilitiesCurrent", "us-gaap_ContractWithCustomerLiabilityCurrent", 1.0, 1.0);
        builder.add_arc("us-gaap_ContractWithCustomerLiability", "us-gaap_ContractWithCustomerLiabilityCurrent", 1.0, 1.0);
        builder.add_arc("us-gaap_Liabilities", "us-gaap_LiabilitiesCurrent", 1.0, 1.0);
        builder.add_arc("us-gaap_Liabilities", "us-gaap_LongTermDebtNoncurrent", 1.0, 2.0);
        builder.add_arc("acme_TotalDebt", "us-gaap_LongTermDebtNoncurrent", 1.0, 1.0);
        let lookup = AncestorLookup::new(&builder.build());

        assert!(lookup.should_map("ContractWithCustomerLiabilityCurrent"));
        assert_eq!(
            lookup.parent_of("ContractWithCustomerLiabilityCurrent"),
            Some("us-gaap_LiabilitiesCurrent")
        );
        assert_eq!(
            lookup.nearest_control_ancestor("ContractWithCustomerLiabilityCurrent"),
            Some("us-gaap_LiabilitiesCurrent")
        );
        assert!(lookup.should_map("LongTermDebtNoncurrent"));
        assert_eq!(lookup.parent_of("LongTermDebtNoncurrent"), Some("us-gaap_Liabilities"));
        assert_eq!(
            lookup.control_ancestors("ContractWithCustomerLiabilityCurrent"),
            vec!["us-gaap_LiabilitiesCurrent", "us-gaap_Liabilities"]
        );
    }

    #[test]
    fn test_mark_roll_ups_with_note_parent() {
        let rows = [
            row(1, 0, "LiabilitiesCurrent", "Total current liabilities"),
            row(2, 1, "ContractWithCustomerLiabilityCurrent", "Deferred revenue"),
        ];
        let refs: Vec<_> = rows.iter().collect();
        let mut tree =
            StatementTree::build(StatementKind::BalanceSheet, &refs, &HashMap::new()).unwrap();
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("us-gaap_ContractWithCustomerLiability", "us-gaap_ContractWithCustomerLiabilityCurrent", 1.0, 1.0);
        builder.add_arc("us-gaap_LiabilitiesCurrent", "us-gaap_ContractWithCustomerLiabilityCurrent", 1.0, 1.0);
        let graph = builder.build();
        mark_roll_ups(&mut tree, &graph, &AncestorLookup::new(&graph));

        let item = tree.node(tree.find_line(2).unwrap());
        assert_eq!(item.calc_parent.as_deref(), Some("us-gaap_LiabilitiesCurrent"));
        assert_eq!(item.control_ancestor_line, Some(1));
    }

    #[test]
    fn test_parent_on_tree_preferred() {
        let mut builder = CalcGraphBuilder::new();
        builder.add_arc("acme_DebtNote", "us-gaap_LongTermDebt", 1.0, 1.0);
        builder.add_arc("us-gaap_DebtInstrumentCarryingAmount", "us-gaap_LongTermDebt", 1.0, 1.0);
        let lookup = AncestorLookup::new(&builder.build());
        let rows = [
            row(1, 0, "DebtInstrumentCarryingAmount", "Total debt"),
            row(2, 1, "LongTermDebt", "Term debt"),
        ];
        let refs: Vec<_> = rows.iter().collect();
        let tree =
            StatementTree::build(StatementKind::BalanceSheet, &refs, &HashMap::new()).unwrap();

        assert_eq!(lookup.parent_of("LongTermDebt"), Some("acme_DebtNote"));
        assert_eq!(
            lookup.parent_on("LongTermDebt", &tree),
            Some("us-gaap_DebtInstrumentCarryingAmount")
        );
        assert!(!lookup.should_map("LongTermDebt"));
    }

    #[test]
    fn test_mark_roll_ups() {
        let rows: Vec<_> = [
            (1, 0, "AssetsCurrent", "Total current assets"),
            (2, 1, "CashAndCashEquivalentsAtCarryingValue", "Cash and cash equivalents"),
            (3, 2, "Cash", "Cash on hand"),
        ]
        .into_iter()
        .map(|(line, indent, tag, label)| row(line, indent, tag, label))
        .collect();
        let refs: Vec<_> = rows.iter().collect();
        let mut tree =
            StatementTree::build(StatementKind::BalanceSheet, &refs, &HashMap::new()).unwrap();
        let graph = graph();
        mark_roll_ups(&mut tree, &graph, &AncestorLookup::new(&graph));

        let items: Vec<_> = tree.line_items().collect();
        assert!(items[0].is_roll_up);
        assert!(items[1].is_roll_up);
        assert_eq!(items[1].calc_children.len(), 2);
        assert!(!items[2].is_roll_up);
        assert_eq!(
            items[2].calc_parent.as_deref(),
            Some("us-gaap_CashAndCashEquivalentsAtCarryingValue")
        );
        assert_eq!(items[2].control_ancestor_line, Some(1));
        assert_eq!(items[1].control_ancestor_line, Some(1));
    }
}
