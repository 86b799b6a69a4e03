//! Statement reconstruction.
//!
//! [`Reconstructor`] runs the per-statement steps in order: pick the
//! presentation report, build the hierarchy, discover periods, attach values,
//! mark roll-ups against the calculation graph and validate.

use std::collections::HashSet;

use statements_core::{CalcGraph, FilingData, ReconConfig, StatementKind};
use tracing::{debug, info};

use crate::hierarchy::{StatementTree, select_report};
use crate::periods::{discover_periods, instant_dates};
use crate::rollup::{AncestorLookup, mark_roll_ups};
use crate::statement::{ReconstructedStatement, StatementMetadata};
use crate::validate::validate;
use crate::values::{FactIndex, attach_values};

/// Rebuilds statements of a filing.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    config: ReconConfig,
}

impl Reconstructor {
    /// Creates a reconstructor with the given configuration.
    #[must_use]
    pub const fn new(config: ReconConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Reconstructs one statement type. Returns `None` when the filing does
    /// not present it.
    ///
    /// An empty `graph` is allowed: roll-up marking and validation are then
    /// no-ops.
    pub fn reconstruct(
        &self,
        data: &FilingData,
        kind: StatementKind,
        graph: &CalcGraph,
    ) -> Option<ReconstructedStatement> {
        let adsh = data.filing().map(|f| f.adsh.as_str()).unwrap_or_default();
        let Some((report, rows)) = select_report(data.rows_for(kind)) else {
            debug!(adsh = %adsh, statement = %kind, "Statement not presented");
            return None;
        };

        let mut tree = StatementTree::build(kind, &rows, &data.tags)?;

        let statement_tags: HashSet<&str> = rows.iter().map(|r| r.tag.as_str()).collect();
        let periods = discover_periods(kind, data, &statement_tags);

        let facts = FactIndex::new(data);
        let instants = instant_dates(data);
        attach_values(
            &mut tree,
            &facts,
            &periods,
            &instants,
            self.config.days_per_month,
        );

        let lookup = AncestorLookup::new(graph);
        mark_roll_ups(&mut tree, graph, &lookup);

        let validation = validate(
            kind,
            &tree,
            self.config.rollup_tolerance,
            self.config.equation_tolerance,
        );

        info!(
            adsh = %adsh,
            statement = %kind,
            report,
            rows = rows.len(),
            periods = periods.len(),
            clean = validation.is_clean(),
            "Reconstructed statement"
        );

        Some(ReconstructedStatement {
            kind,
            periods,
            tree,
            validation,
            metadata: StatementMetadata::new(data.submission.as_ref(), report),
        })
    }

    /// Reconstructs every statement type the filing presents.
    pub fn reconstruct_all(
        &self,
        data: &FilingData,
        graph: &CalcGraph,
    ) -> Vec<ReconstructedStatement> {
        StatementKind::ALL
            .iter()
            .filter_map(|&kind| self.reconstruct(data, kind, graph))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use statements_core::{
        FactKind, FilingId, NumericFact, PeriodKey, PresentationRow, Submission, TagInfo,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fact(tag: &str, end: NaiveDate, quarters: u8, value: f64) -> NumericFact {
        NumericFact {
            adsh: "0000320193-24-000081".to_string(),
            tag: tag.to_string(),
            end,
            quarters,
            unit: "USD".to_string(),
            segments: None,
            coregistrant: None,
            value,
        }
    }

    fn row(kind: StatementKind, line: u32, indent: u32, tag: &str, label: &str) -> PresentationRow {
        PresentationRow {
            adsh: "0000320193-24-000081".to_string(),
            report: 6,
            line,
            statement: kind,
            indent,
            tag: tag.to_string(),
            label: label.to_string(),
            negating: false,
        }
    }

    fn filing() -> FilingData {
        let mut data = FilingData::new(
            Submission::new(FilingId::new(320193, "0000320193-24-000081")).with_sic(3571),
        );
        for tag in [
            "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents",
            "Assets",
        ] {
            data.tags
                .insert(tag.to_string(), TagInfo::new(tag, FactKind::Instant));
        }
        data
    }

    #[test]
    fn test_cash_flow_roll_forward() {
        let cash = "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents";
        let change = "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalentsPeriodIncreaseDecreaseIncludingExchangeRateEffect";
        let kind = StatementKind::CashFlow;
        let mut data = filing();
        data.presentation = vec![
            row(kind, 1, 0, cash, "Cash, cash equivalents and restricted cash, beginning balances"),
            row(kind, 2, 0, "NetCashProvidedByUsedInOperatingActivities", "Cash generated by operating activities"),
            row(kind, 3, 0, change, "Decrease in cash, cash equivalents and restricted cash"),
            row(kind, 4, 0, cash, "Cash, cash equivalents and restricted cash, ending balances"),
        ];
        data.facts = vec![
            fact(cash, date(2023, 9, 30), 0, 73_332_000_000.0),
            fact(cash, date(2024, 6, 29), 0, 71_673_000_000.0),
            fact("NetCashProvidedByUsedInOperatingActivities", date(2024, 6, 29), 3, 91_443_000_000.0),
            fact(change, date(2024, 6, 29), 3, -1_659_000_000.0),
        ];

        let statement = Reconstructor::default()
            .reconstruct(&data, kind, &CalcGraph::new())
            .unwrap();
        let period = PeriodKey::new(date(2024, 6, 29), 3);
        assert_eq!(statement.periods.len(), 1);
        assert_eq!(statement.periods[0].label, "Nine Months Ended Jun 29, 2024");

        let items: Vec<_> = statement.line_items().collect();
        assert_eq!(items[0].values.get(&period), Some(&73_332_000_000.0));
        assert_eq!(items[3].values.get(&period), Some(&71_673_000_000.0));

        let equation = &statement.validation.equations[0];
        assert_eq!(equation.lhs, 71_673_000_000.0);
        assert_eq!(equation.rhs, 71_673_000_000.0);
        assert!(equation.passed);
        assert!(statement.root().is_virtual());
    }

    #[test]
    fn test_retail_fiscal_year_opening_balance() {
        let cash = "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents";
        let kind = StatementKind::CashFlow;
        let mut data = filing();
        data.presentation = vec![
            row(kind, 1, 0, "NetCashProvidedByUsedInOperatingActivities", "Net cash provided by operating activities"),
            row(kind, 2, 0, cash, "Cash at beginning of period"),
            row(kind, 3, 0, cash, "Cash at end of period"),
        ];
        data.facts = vec![
            fact("NetCashProvidedByUsedInOperatingActivities", date(2024, 7, 31), 2, 5.0),
            fact("NetCashProvidedByUsedInOperatingActivities", date(2023, 7, 31), 2, 4.0),
            fact(cash, date(2023, 1, 31), 0, 10.0),
            fact(cash, date(2023, 7, 31), 0, 11.0),
            fact(cash, date(2024, 1, 31), 0, 12.0),
            fact(cash, date(2024, 7, 31), 0, 13.0),
        ];

        let statement = Reconstructor::default()
            .reconstruct(&data, kind, &CalcGraph::new())
            .unwrap();
        let current = PeriodKey::new(date(2024, 7, 31), 2);
        let prior = PeriodKey::new(date(2023, 7, 31), 2);
        let opening = statement.item(cash).unwrap();
        assert_eq!(opening.label, "Cash at beginning of period");
        assert_eq!(opening.values.get(&current), Some(&12.0));
        assert_eq!(opening.values.get(&prior), Some(&10.0));

        let ending: Vec<_> = statement.line_items().collect();
        assert_eq!(ending[2].values.get(&current), Some(&13.0));
    }

    #[test]
    fn test_metadata_and_missing_statement() {
        let mut data = filing();
        let kind = StatementKind::BalanceSheet;
        data.presentation = vec![row(kind, 1, 0, "Assets", "Total assets")];
        data.facts = vec![fact("Assets", date(2024, 6, 29), 0, 331_612_000_000.0)];

        let reconstructor = Reconstructor::default();
        let statement = reconstructor
            .reconstruct(&data, kind, &CalcGraph::new())
            .unwrap();
        assert_eq!(statement.metadata.report, 6);
        assert_eq!(statement.metadata.sic, Some(3571));
        assert_eq!(
            statement.metadata.viewer_url.as_deref(),
            Some("https://www.sec.gov/cgi-bin/viewer?action=view&cik=0000320193&accession_number=0000320193-24-000081&xbrl_type=v")
        );

        assert!(reconstructor
            .reconstruct(&data, StatementKind::IncomeStatement, &CalcGraph::new())
            .is_none());
        assert_eq!(reconstructor.reconstruct_all(&data, &CalcGraph::new()).len(), 1);
    }

    #[test]
    fn test_statement_serializes() {
        let mut data = filing();
        let kind = StatementKind::BalanceSheet;
        data.presentation = vec![row(kind, 1, 0, "Assets", "Total assets")];
        data.facts = vec![fact("Assets", date(2024, 6, 29), 0, 1.0)];
        let statement = Reconstructor::default()
            .reconstruct(&data, kind, &CalcGraph::new())
            .unwrap();
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["kind"], "BalanceSheet");
        assert_eq!(json["periods"][0]["label"], "As of Jun 29, 2024");
    }
}
