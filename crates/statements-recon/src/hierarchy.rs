//! Presentation hierarchy.
//!
//! The presentation rows of a statement are a flat list ordered by line, each
//! with an indentation level. [`StatementTree::build`] turns them into a tree
//! held in an arena: nodes are addressed by [`NodeId`], children are owned
//! indices and the parent link is a plain index back into the arena.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use statements_core::{
    CalcChild, FactKind, PeriodValues, Polarity, PresentationRow, StatementKind, TagInfo,
    ValueType, same_concept,
};
use tracing::{debug, warn};

/// Index of a node in a [`StatementTree`].
pub type NodeId = usize;

/// Line number given to a synthesized root.
pub const VIRTUAL_ROOT_LINE: u32 = 0;

/// Level given to a synthesized root.
pub const VIRTUAL_ROOT_LEVEL: i32 = -1;

/// One line of a reconstructed statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Concept tag.
    pub tag: String,
    /// Presentation label.
    pub label: String,
    /// Line order within the statement.
    pub line: u32,
    /// Indentation level; -1 for a synthesized root.
    pub level: i32,
    /// True if the value is shown negated.
    pub negating: bool,
    /// Instant or duration, from the tag metadata.
    pub kind: FactKind,
    /// Credit/debit polarity, from the tag metadata.
    pub polarity: Option<Polarity>,
    /// Declared value type, from the tag metadata.
    pub value_type: ValueType,
    /// Amounts per statement period.
    pub values: PeriodValues,
    /// True if the tag is a parent in the calculation graph.
    pub is_roll_up: bool,
    /// Weighted calculation children, when `is_roll_up`.
    pub calc_children: Vec<CalcChild>,
    /// Immediate calculation parent tag, if any.
    pub calc_parent: Option<String>,
    /// Line of the nearest calculation ancestor that is a control total.
    pub control_ancestor_line: Option<u32>,
    /// Presentation children, in line order.
    pub children: Vec<NodeId>,
    /// Presentation parent.
    pub parent: Option<NodeId>,
}

impl LineItem {
    fn from_row(row: &PresentationRow, info: Option<&TagInfo>) -> Self {
        Self {
            tag: row.tag.clone(),
            label: row.label.clone(),
            line: row.line,
            level: i32::try_from(row.indent).unwrap_or(i32::MAX),
            negating: row.negating,
            kind: info.map_or_else(FactKind::default, |i| i.kind),
            polarity: info.and_then(|i| i.polarity),
            value_type: info.map_or_else(ValueType::default, |i| i.value_type),
            values: PeriodValues::new(),
            is_roll_up: false,
            calc_children: Vec::new(),
            calc_parent: None,
            control_ancestor_line: None,
            children: Vec::new(),
            parent: None,
        }
    }

    fn virtual_root(kind: StatementKind) -> Self {
        Self {
            tag: format!("{}_ROOT", kind.code()),
            label: format!("{} Statement", kind.code()),
            line: VIRTUAL_ROOT_LINE,
            level: VIRTUAL_ROOT_LEVEL,
            negating: false,
            kind: if kind.is_instant() {
                FactKind::Instant
            } else {
                FactKind::Duration
            },
            polarity: None,
            value_type: ValueType::default(),
            values: PeriodValues::new(),
            is_roll_up: false,
            calc_children: Vec::new(),
            calc_parent: None,
            control_ancestor_line: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Returns true for a synthesized root that has no presentation row.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.level == VIRTUAL_ROOT_LEVEL
    }

    /// Returns true if the tag reports point-in-time values.
    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.kind == FactKind::Instant
    }
}

/// Picks the presentation report for a statement type.
///
/// A filing can present the same statement type in several reports (for
/// example a parenthetical balance sheet). The report with the most rows is
/// chosen, ties going to the lowest report number. The returned rows are
/// sorted by line.
pub fn select_report<'a>(
    rows: impl IntoIterator<Item = &'a PresentationRow>,
) -> Option<(u32, Vec<&'a PresentationRow>)> {
    let mut reports: BTreeMap<u32, Vec<&PresentationRow>> = BTreeMap::new();
    for row in rows {
        reports.entry(row.report).or_default().push(row);
    }
    if reports.len() > 1 {
        debug!(reports = reports.len(), "Multiple presentation reports, keeping the largest");
    }

    // max_by_key returns the last maximum; iterate in reverse so ties keep
    // the lowest report number.
    let (report, mut rows) = reports.into_iter().rev().max_by_key(|(_, r)| r.len())?;
    rows.sort_by_key(|r| r.line);
    Some((report, rows))
}

/// Arena-backed presentation tree of one statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatementTree {
    nodes: Vec<LineItem>,
    root: NodeId,
}

impl StatementTree {
    /// Builds the tree from rows already sorted by line.
    ///
    /// Returns `None` for an empty statement.
    pub fn build(
        kind: StatementKind,
        rows: &[&PresentationRow],
        tags: &HashMap<String, TagInfo>,
    ) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let mut builder = TreeBuilder::new(kind);
        if rows.iter().all(|r| r.indent == 0) {
            debug!(statement = %kind, rows = rows.len(), "Flat presentation, adding virtual root");
            let root = builder.virtual_root();
            for row in rows {
                let id = builder.push(LineItem::from_row(row, tags.get(&row.tag)));
                builder.attach(root, id);
            }
        } else {
            for row in rows {
                builder.place(LineItem::from_row(row, tags.get(&row.tag)));
            }
        }
        builder.finish()
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, including a synthesized root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &LineItem {
        &self.nodes[id]
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> &mut LineItem {
        &mut self.nodes[id]
    }

    /// Node ids in depth-first presentation order, starting at the root.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        out
    }

    /// Every real (non-virtual) line item, in line order.
    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        let mut items: Vec<_> = self.nodes.iter().filter(|n| !n.is_virtual()).collect();
        items.sort_by_key(|n| n.line);
        items.into_iter()
    }

    /// Ids of every node, virtual root included.
    pub fn ids(&self) -> std::ops::Range<NodeId> {
        0..self.nodes.len()
    }

    /// First node whose tag names the same concept as `tag`.
    #[must_use]
    pub fn find_tag(&self, tag: &str) -> Option<NodeId> {
        self.ids()
            .find(|&id| !self.nodes[id].is_virtual() && same_concept(&self.nodes[id].tag, tag))
    }

    /// Node at a statement line.
    #[must_use]
    pub fn find_line(&self, line: u32) -> Option<NodeId> {
        self.ids()
            .find(|&id| !self.nodes[id].is_virtual() && self.nodes[id].line == line)
    }

    /// Depth of a node below the root.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }
}

// ===== Builder =====

#[derive(Debug)]
struct TreeBuilder {
    kind: StatementKind,
    nodes: Vec<LineItem>,
    root: Option<NodeId>,
    // stack[level] is the most recent node seen at that level
    stack: Vec<Option<NodeId>>,
}

impl TreeBuilder {
    const fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            root: None,
            stack: Vec::new(),
        }
    }

    fn push(&mut self, item: LineItem) -> NodeId {
        self.nodes.push(item);
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
    }

    /// Returns the virtual root, synthesizing it if needed. An existing real
    /// root becomes its first child.
    fn virtual_root(&mut self) -> NodeId {
        match self.root {
            Some(root) if self.nodes[root].is_virtual() => root,
            existing => {
                let root = self.push(LineItem::virtual_root(self.kind));
                if let Some(old) = existing {
                    self.attach(root, old);
                }
                self.root = Some(root);
                root
            }
        }
    }

    fn place(&mut self, item: LineItem) {
        let level = usize::try_from(item.level).unwrap_or(0);
        let line = item.line;
        let id = self.push(item);

        if level == 0 {
            match self.root {
                None => self.root = Some(id),
                Some(_) => {
                    debug!(statement = %self.kind, line, "Second top-level row, adding virtual root");
                    let root = self.virtual_root();
                    self.attach(root, id);
                }
            }
        } else {
            match self.stack.get(level - 1).copied().flatten() {
                Some(parent) => self.attach(parent, id),
                None => {
                    warn!(
                        statement = %self.kind,
                        line,
                        level,
                        tag = %self.nodes[id].tag,
                        "Orphan presentation row, attaching to root"
                    );
                    let root = match self.root {
                        Some(root) => root,
                        None => self.virtual_root(),
                    };
                    self.attach(root, id);
                }
            }
        }

        self.stack.truncate(level);
        self.stack.resize(level + 1, None);
        self.stack[level] = Some(id);
    }

    fn finish(self) -> Option<StatementTree> {
        let root = self.root?;
        Some(StatementTree {
            nodes: self.nodes,
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(report: u32, line: u32, indent: u32, tag: &str, label: &str) -> PresentationRow {
        PresentationRow {
            adsh: "0000320193-24-000081".to_string(),
            report,
            line,
            statement: StatementKind::BalanceSheet,
            indent,
            tag: tag.to_string(),
            label: label.to_string(),
            negating: false,
        }
    }

    fn build(rows: &[PresentationRow]) -> StatementTree {
        let refs: Vec<_> = rows.iter().collect();
        StatementTree::build(StatementKind::BalanceSheet, &refs, &HashMap::new()).unwrap()
    }

    fn labels(tree: &StatementTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.node(id).label.clone()).collect()
    }

    #[test]
    fn test_nested_rows() {
        let rows = vec![
            row(2, 1, 0, "Assets", "Assets"),
            row(2, 2, 1, "AssetsCurrent", "Current assets"),
            row(2, 3, 2, "Cash", "Cash"),
            row(2, 4, 2, "InventoryNet", "Inventories"),
            row(2, 5, 1, "PropertyPlantAndEquipmentNet", "PP&E"),
        ];
        let tree = build(&rows);
        let root = tree.root();
        assert_eq!(tree.node(root).tag, "Assets");
        assert_eq!(
            labels(&tree, &tree.node(root).children),
            vec!["Current assets", "PP&E"]
        );
        let current = tree.node(root).children[0];
        assert_eq!(labels(&tree, &tree.node(current).children), vec!["Cash", "Inventories"]);
        assert_eq!(tree.node(tree.node(current).children[0]).parent, Some(current));
        assert_eq!(tree.depth(tree.node(current).children[1]), 2);
    }

    #[test]
    fn test_flat_presentation_gets_virtual_root() {
        let rows = vec![
            row(4, 1, 0, "Revenues", "Revenue"),
            row(4, 2, 0, "CostOfRevenue", "Cost of revenue"),
            row(4, 3, 0, "NetIncomeLoss", "Net income"),
        ];
        let refs: Vec<_> = rows.iter().collect();
        let tree =
            StatementTree::build(StatementKind::IncomeStatement, &refs, &HashMap::new()).unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.tag, "IS_ROOT");
        assert_eq!(root.label, "IS Statement");
        assert_eq!(root.level, -1);
        assert_eq!(root.line, 0);
        assert_eq!(root.children.len(), 3);
        assert_eq!(tree.line_items().count(), 3);
    }

    #[test]
    fn test_second_top_level_row_synthesizes_root() {
        let rows = vec![
            row(2, 1, 0, "Assets", "Total assets"),
            row(2, 2, 1, "AssetsCurrent", "Current assets"),
            row(2, 3, 0, "LiabilitiesAndStockholdersEquity", "Total liabilities and equity"),
            row(2, 4, 1, "Liabilities", "Total liabilities"),
        ];
        let tree = build(&rows);
        let root = tree.node(tree.root());
        assert!(root.is_virtual());
        assert_eq!(
            labels(&tree, &root.children),
            vec!["Total assets", "Total liabilities and equity"]
        );
        let le = root.children[1];
        assert_eq!(labels(&tree, &tree.node(le).children), vec!["Total liabilities"]);
    }

    #[test]
    fn test_orphan_attached_to_root() {
        let rows = vec![
            row(2, 1, 0, "Assets", "Assets"),
            row(2, 2, 3, "Orphan", "Deeply indented"),
            row(2, 3, 1, "AssetsCurrent", "Current assets"),
        ];
        let tree = build(&rows);
        assert_eq!(tree.line_items().count(), 3);
        let root = tree.node(tree.root());
        assert_eq!(
            labels(&tree, &root.children),
            vec!["Deeply indented", "Current assets"]
        );
    }

    #[test]
    fn test_select_report_prefers_largest_then_lowest() {
        let rows = vec![
            row(3, 1, 0, "Assets", "a"),
            row(2, 2, 0, "Assets", "b"),
            row(2, 1, 0, "Cash", "c"),
            row(3, 2, 0, "Cash", "d"),
            row(5, 1, 0, "Cash", "e"),
        ];
        let (report, selected) = select_report(&rows).unwrap();
        assert_eq!(report, 2);
        assert_eq!(
            selected.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            vec!["c", "b"]
        );
        assert!(select_report(Vec::<PresentationRow>::new().iter()).is_none());
    }

    #[test]
    fn test_find_tag_ignores_prefix() {
        let rows = vec![row(2, 1, 0, "Assets", "Assets"), row(2, 2, 1, "Cash", "Cash")];
        let tree = build(&rows);
        assert_eq!(tree.find_tag("us-gaap_Cash"), Some(1));
        assert_eq!(tree.find_line(2), Some(1));
        assert!(tree.find_tag("Goodwill").is_none());
    }

    #[test]
    fn test_preorder() {
        let rows = vec![
            row(2, 1, 0, "Assets", "A"),
            row(2, 2, 1, "AssetsCurrent", "B"),
            row(2, 3, 2, "Cash", "C"),
            row(2, 4, 1, "Goodwill", "D"),
        ];
        let tree = build(&rows);
        assert_eq!(labels(&tree, &tree.preorder()), vec!["A", "B", "C", "D"]);
    }
}
