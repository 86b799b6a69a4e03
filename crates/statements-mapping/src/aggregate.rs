//! Aggregation of mapped line items into standard fields.

use std::collections::{BTreeMap, HashMap};

use statements_recon::{NodeId, StatementTree, is_control_tag};
use tracing::debug;

use crate::controls::ControlLines;
use crate::standardized::{SourceItem, StandardField};

/// A line item assigned to a standard field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Node of the line item.
    pub node: NodeId,
    /// Target field.
    pub target: String,
}

impl Assignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(node: NodeId, target: impl Into<String>) -> Self {
        Self {
            node,
            target: target.into(),
        }
    }
}

/// When several lines map to `total_stockholders_equity`, the first line
/// keeps it and the later ones become `total_equity`.
pub fn split_stockholders_equity(assignments: &mut [Assignment], tree: &StatementTree) {
    let mut matches: Vec<&mut Assignment> = assignments
        .iter_mut()
        .filter(|a| a.target == "total_stockholders_equity")
        .collect();
    if matches.len() < 2 {
        return;
    }
    matches.sort_by_key(|a| tree.node(a.node).line);
    for assignment in matches.into_iter().skip(1) {
        debug!(
            line = tree.node(assignment.node).line,
            "Reassigning stockholders' equity line to total_equity"
        );
        assignment.target = "total_equity".to_string();
    }
}

/// For each assignment, the target of its nearest mapped non-control
/// ancestor, following the calculation chain and then the presentation
/// chain. Both walks stop at the first control total.
#[must_use]
pub fn mapped_ancestors(
    tree: &StatementTree,
    assignments: &[Assignment],
    controls: &ControlLines,
) -> Vec<Option<String>> {
    let mapped: HashMap<NodeId, &str> = assignments
        .iter()
        .filter(|a| controls.field_at(tree.node(a.node).line).is_none())
        .map(|a| (a.node, a.target.as_str()))
        .collect();
    let is_control = |id: NodeId| controls.field_at(tree.node(id).line).is_some();

    assignments
        .iter()
        .map(|assignment| {
            let node = tree.node(assignment.node);

            let mut hops = 0;
            let mut current = node.calc_parent.as_deref();
            while let Some(parent_tag) = current {
                if is_control_tag(parent_tag) || hops > tree.len() {
                    break;
                }
                let Some(parent) = tree.find_tag(parent_tag) else {
                    break;
                };
                if is_control(parent) {
                    break;
                }
                if let Some(target) = mapped.get(&parent) {
                    return Some((*target).to_string());
                }
                current = tree.node(parent).calc_parent.as_deref();
                hops += 1;
            }

            let mut current = node.parent;
            while let Some(parent) = current {
                let item = tree.node(parent);
                if item.is_virtual() || is_control(parent) {
                    break;
                }
                if let Some(target) = mapped.get(&parent) {
                    return Some((*target).to_string());
                }
                current = item.parent;
            }
            None
        })
        .collect()
}

/// Sums assigned line items per field and period.
///
/// `ancestors` comes from [`mapped_ancestors`]. A line whose mapped ancestor
/// has the same target is only recorded as a source, since the ancestor
/// already carries its amount. Periods summing to zero are dropped.
#[must_use]
pub fn aggregate(
    tree: &StatementTree,
    assignments: &[Assignment],
    ancestors: &[Option<String>],
) -> BTreeMap<String, StandardField> {
    let mut fields: BTreeMap<String, StandardField> = BTreeMap::new();
    for (assignment, ancestor) in assignments.iter().zip(ancestors) {
        let item = tree.node(assignment.node);
        let field = fields
            .entry(assignment.target.clone())
            .or_insert_with(StandardField::mapped);
        field.sources.push(SourceItem::new(item, ancestor.is_some()));
        if ancestor.as_deref() == Some(assignment.target.as_str()) {
            continue;
        }
        for (period, value) in &item.values {
            *field.values.entry(*period).or_insert(0.0) += value;
            if ancestor.is_some() {
                *field.nested.entry(*period).or_insert(0.0) += value;
            }
        }
    }
    for field in fields.values_mut() {
        field.values.retain(|_, v| *v != 0.0);
        field.nested.retain(|_, v| *v != 0.0);
    }
    fields
}
