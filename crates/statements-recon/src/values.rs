//! Binding numeric facts to line items.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use statements_core::{FilingData, NumericFact, Period, PeriodKey, local_name};
use tracing::trace;

use crate::hierarchy::{LineItem, StatementTree};
use crate::periods::infer_opening_date;

/// Unit preferred when a tag reports the same period in several units.
pub const PREFERRED_UNIT: &str = "USD";

const OPENING_MARKERS: [&str; 2] = ["begin", "start of"];

/// Returns true if a line item carries an opening balance.
///
/// Only instant items of duration statements qualify; they are recognized by
/// a label (or tag) mentioning the beginning of the period.
#[must_use]
pub fn is_opening_item(item: &LineItem, duration_statement: bool) -> bool {
    if !duration_statement || !item.is_instant() {
        return false;
    }
    let label = item.label.to_lowercase();
    let tag = item.tag.to_lowercase();
    OPENING_MARKERS
        .iter()
        .any(|m| label.contains(m) || tag.contains(m))
}

/// Consolidated facts of a filing indexed by tag (without namespace prefix).
#[derive(Debug)]
pub struct FactIndex<'a> {
    by_tag: HashMap<&'a str, Vec<&'a NumericFact>>,
}

impl<'a> FactIndex<'a> {
    /// Indexes the consolidated facts of a filing.
    #[must_use]
    pub fn new(data: &'a FilingData) -> Self {
        let mut by_tag: HashMap<&str, Vec<&NumericFact>> = HashMap::new();
        for fact in data.facts.iter().filter(|f| f.is_consolidated()) {
            by_tag.entry(local_name(&fact.tag)).or_default().push(fact);
        }
        Self { by_tag }
    }

    /// Value of `tag` for the period ending `end` spanning `quarters`.
    ///
    /// A fact in [`PREFERRED_UNIT`] wins over other units.
    #[must_use]
    pub fn value(&self, tag: &str, end: NaiveDate, quarters: u8) -> Option<f64> {
        let facts = self.by_tag.get(local_name(tag))?;
        let mut matching = facts
            .iter()
            .filter(|f| f.end == end && f.quarters == quarters);
        let first = matching.next()?;
        if first.unit == PREFERRED_UNIT {
            return Some(first.value);
        }
        Some(
            matching
                .find(|f| f.unit == PREFERRED_UNIT)
                .map_or(first.value, |f| f.value),
        )
    }

    /// Returns true if any fact of `tag` exists.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.by_tag.contains_key(local_name(tag))
    }
}

/// Attaches per-period values to every node of the tree.
///
/// Values are keyed by the statement period they belong to:
///
/// - duration items read the fact for the period's end and duration;
/// - instant items read the instant fact at the period end;
/// - opening-balance items of duration statements read the instant fact at
///   the inferred opening date, never at the period end.
pub fn attach_values(
    tree: &mut StatementTree,
    facts: &FactIndex<'_>,
    periods: &[Period],
    instants: &BTreeSet<NaiveDate>,
    days_per_month: f64,
) {
    let duration_statement = periods.iter().any(|p| !p.is_instant());
    let openings: HashMap<PeriodKey, Option<NaiveDate>> = periods
        .iter()
        .map(|p| {
            (
                p.key(),
                infer_opening_date(p.end, p.quarters, instants, days_per_month),
            )
        })
        .collect();

    for id in tree.ids() {
        let node = tree.node(id);
        if node.is_virtual() {
            continue;
        }
        let opening = is_opening_item(node, duration_statement);
        let instant = node.is_instant();

        let mut values = Vec::new();
        for period in periods {
            let value = if opening {
                openings
                    .get(&period.key())
                    .copied()
                    .flatten()
                    .and_then(|date| facts.value(&node.tag, date, 0))
            } else if instant || period.is_instant() {
                facts.value(&node.tag, period.end, 0)
            } else {
                facts.value(&node.tag, period.end, period.quarters)
            };
            if let Some(value) = value {
                values.push((period.key(), value));
            }
        }

        trace!(tag = %node.tag, opening, values = values.len(), "Attached values");
        tree.node_mut(id).values.extend(values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{
        FactKind, FilingId, PresentationRow, StatementKind, Submission, TagInfo,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fact(tag: &str, end: NaiveDate, quarters: u8, unit: &str, value: f64) -> NumericFact {
        NumericFact {
            adsh: "a".to_string(),
            tag: tag.to_string(),
            end,
            quarters,
            unit: unit.to_string(),
            segments: None,
            coregistrant: None,
            value,
        }
    }

    fn row(line: u32, tag: &str, label: &str) -> PresentationRow {
        PresentationRow {
            adsh: "a".to_string(),
            report: 7,
            line,
            statement: StatementKind::CashFlow,
            indent: 1,
            tag: tag.to_string(),
            label: label.to_string(),
            negating: false,
        }
    }

    #[test]
    fn test_preferred_unit() {
        let mut data = FilingData::new(Submission::new(FilingId::new(1, "a")));
        data.facts = vec![
            fact("Revenues", date(2024, 6, 30), 1, "EUR", 5.0),
            fact("Revenues", date(2024, 6, 30), 1, "USD", 7.0),
            fact("us-gaap_Other", date(2024, 6, 30), 1, "shares", 9.0),
        ];
        let index = FactIndex::new(&data);
        assert_eq!(index.value("Revenues", date(2024, 6, 30), 1), Some(7.0));
        assert_eq!(index.value("Other", date(2024, 6, 30), 1), Some(9.0));
        assert_eq!(index.value("Revenues", date(2024, 6, 30), 2), None);
        assert!(index.has_tag("us-gaap_Revenues"));
    }

    #[test]
    fn test_opening_item_detection() {
        let mut tags = HashMap::new();
        tags.insert("Cash".to_string(), TagInfo::new("Cash", FactKind::Instant));
        let rows = [
            row(1, "Cash", "Cash, beginning of period"),
            row(2, "Cash", "Cash, end of period"),
            row(3, "Depreciation", "Beginning depreciation"),
        ];
        let refs: Vec<_> = rows.iter().collect();
        let tree = StatementTree::build(StatementKind::CashFlow, &refs, &tags).unwrap();
        let items: Vec<_> = tree.line_items().collect();
        assert!(is_opening_item(items[0], true));
        assert!(!is_opening_item(items[0], false));
        assert!(!is_opening_item(items[1], true));
        // Duration tag, never an opening balance.
        assert!(!is_opening_item(items[2], true));
    }

    #[test]
    fn test_opening_balance_uses_inferred_date() {
        let mut tags = HashMap::new();
        tags.insert("Cash".to_string(), TagInfo::new("Cash", FactKind::Instant));
        let rows = [
            row(1, "Cash", "Cash at beginning of period"),
            row(2, "CashPeriodIncreaseDecrease", "Net change"),
            row(3, "Cash", "Cash at end of period"),
        ];
        let refs: Vec<_> = rows.iter().collect();
        let mut tree = StatementTree::build(StatementKind::CashFlow, &refs, &tags).unwrap();

        let data = FilingData {
            facts: vec![
                fact("Cash", date(2023, 12, 31), 0, "USD", 100.0),
                fact("Cash", date(2024, 6, 30), 0, "USD", 130.0),
                fact("CashPeriodIncreaseDecrease", date(2024, 6, 30), 2, "USD", 30.0),
            ],
            ..Default::default()
        };
        let index = FactIndex::new(&data);
        let instants: BTreeSet<_> = [date(2023, 12, 31), date(2024, 6, 30)].into_iter().collect();
        let periods = vec![Period::new(date(2024, 6, 30), 2)];
        attach_values(&mut tree, &index, &periods, &instants, 30.4);

        let key = periods[0].key();
        let items: Vec<_> = tree.line_items().collect();
        assert_eq!(items[0].values.get(&key), Some(&100.0));
        assert_eq!(items[1].values.get(&key), Some(&30.0));
        assert_eq!(items[2].values.get(&key), Some(&130.0));
    }
}
