//! Reporting period discovery.
//!
//! The periods of a statement are read off the facts of a representative tag
//! (total assets for the balance sheet, revenue for the income statement, and
//! so on). Balance sheet periods are instants; every other statement uses
//! durations measured in quarters.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDate};
use statements_core::{FilingData, NumericFact, Period, PeriodKey, StatementKind, same_concept};
use tracing::debug;

/// Tags whose facts define the periods of a statement type, by priority.
#[must_use]
pub const fn representative_tags(kind: StatementKind) -> &'static [&'static str] {
    match kind {
        StatementKind::BalanceSheet => &[
            "Assets",
            "AssetsCurrent",
            "LiabilitiesAndStockholdersEquity",
        ],
        StatementKind::IncomeStatement => &[
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
            "NetIncomeLoss",
        ],
        StatementKind::CashFlow => &[
            "NetCashProvidedByUsedInOperatingActivities",
            "NetCashProvidedByUsedInInvestingActivities",
            "NetCashProvidedByUsedInFinancingActivities",
        ],
        StatementKind::Equity | StatementKind::ComprehensiveIncome => &[
            "StockholdersEquity",
            "ComprehensiveIncomeNetOfTax",
            "NetIncomeLoss",
        ],
    }
}

fn period_keys<'a>(
    kind: StatementKind,
    facts: impl Iterator<Item = &'a NumericFact>,
) -> BTreeSet<PeriodKey> {
    facts
        .filter(|f| f.is_consolidated())
        .filter(|f| f.is_instant() == kind.is_instant())
        .map(|f| PeriodKey::new(f.end, f.quarters))
        .collect()
}

fn sorted(keys: BTreeSet<PeriodKey>) -> Vec<Period> {
    let mut keys: Vec<_> = keys.into_iter().collect();
    keys.sort_by(|a, b| b.end.cmp(&a.end).then(a.quarters.cmp(&b.quarters)));
    keys.into_iter().map(Period::from).collect()
}

/// Discovers the reporting periods of a statement.
///
/// `statement_tags` are the tags presented on the statement. The first
/// representative tag that is presented and has consolidated facts defines
/// the periods; when none does, every presented tag contributes. The result is
/// sorted by end date descending, then duration ascending.
pub fn discover_periods(
    kind: StatementKind,
    data: &FilingData,
    statement_tags: &HashSet<&str>,
) -> Vec<Period> {
    let presented =
        |tag: &str| statement_tags.iter().any(|t| same_concept(t, tag));

    for &tag in representative_tags(kind) {
        if !presented(tag) {
            continue;
        }
        let keys = period_keys(kind, data.facts.iter().filter(|f| same_concept(&f.tag, tag)));
        if !keys.is_empty() {
            debug!(statement = %kind, tag, periods = keys.len(), "Periods from representative tag");
            return sorted(keys);
        }
    }

    let keys = period_keys(
        kind,
        data.facts.iter().filter(|f| presented(&f.tag)),
    );
    debug!(statement = %kind, periods = keys.len(), "Periods from all statement tags");
    sorted(keys)
}

/// Distinct end dates of the filing's consolidated instant facts.
pub fn instant_dates(data: &FilingData) -> BTreeSet<NaiveDate> {
    data.facts
        .iter()
        .filter(|f| f.is_consolidated() && f.is_instant())
        .map(|f| f.end)
        .collect()
}

/// Infers the opening-balance date of a duration period.
///
/// The opening date is approximated as `end - round(quarters * 3 * days_per_month)`
/// and snapped to the nearest observed instant date strictly before `end`.
/// Ties go to the earlier date. Returns `None` for instants or when no earlier
/// instant exists.
pub fn infer_opening_date(
    end: NaiveDate,
    quarters: u8,
    instants: &BTreeSet<NaiveDate>,
    days_per_month: f64,
) -> Option<NaiveDate> {
    if quarters == 0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let days = (f64::from(quarters) * 3.0 * days_per_month).round() as i64;
    let approx = end - Duration::days(days);

    instants
        .range(..end)
        .min_by_key(|d| ((**d - approx).num_days().abs(), **d))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{FilingId, Submission};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fact(tag: &str, end: NaiveDate, quarters: u8) -> NumericFact {
        NumericFact {
            adsh: "0000320193-24-000081".to_string(),
            tag: tag.to_string(),
            end,
            quarters,
            unit: "USD".to_string(),
            segments: None,
            coregistrant: None,
            value: 1.0,
        }
    }

    fn filing(facts: Vec<NumericFact>) -> FilingData {
        let mut data = FilingData::new(Submission::new(FilingId::new(
            320193,
            "0000320193-24-000081",
        )));
        data.facts = facts;
        data
    }

    #[test]
    fn test_balance_sheet_instants() {
        let mut segment = fact("Assets", date(2022, 9, 24), 0);
        segment.segments = Some("Segment=Americas;".to_string());
        let data = filing(vec![
            fact("Assets", date(2023, 9, 30), 0),
            fact("Assets", date(2024, 6, 29), 0),
            segment,
            fact("Revenues", date(2024, 6, 29), 1),
        ]);
        let tags: HashSet<&str> = ["Assets", "Cash"].into_iter().collect();
        let periods = discover_periods(StatementKind::BalanceSheet, &data, &tags);
        assert_eq!(
            periods.iter().map(Period::key).collect::<Vec<_>>(),
            vec![
                PeriodKey::instant(date(2024, 6, 29)),
                PeriodKey::instant(date(2023, 9, 30))
            ]
        );
        assert_eq!(periods[0].label, "As of Jun 29, 2024");
    }

    #[test]
    fn test_duration_ordering_and_order_independence() {
        let facts = vec![
            fact("Revenues", date(2023, 7, 1), 1),
            fact("Revenues", date(2024, 6, 29), 3),
            fact("Revenues", date(2024, 6, 29), 1),
            fact("Revenues", date(2023, 7, 1), 3),
        ];
        let mut reversed = facts.clone();
        reversed.reverse();
        let tags: HashSet<&str> = ["Revenues"].into_iter().collect();

        let a = discover_periods(StatementKind::IncomeStatement, &filing(facts), &tags);
        let b = discover_periods(StatementKind::IncomeStatement, &filing(reversed), &tags);
        assert_eq!(a, b);
        assert_eq!(
            a.iter().map(|p| (p.end, p.quarters)).collect::<Vec<_>>(),
            vec![
                (date(2024, 6, 29), 1),
                (date(2024, 6, 29), 3),
                (date(2023, 7, 1), 1),
                (date(2023, 7, 1), 3),
            ]
        );
    }

    #[test]
    fn test_falls_back_to_statement_tags() {
        let data = filing(vec![
            fact("NetCashProvidedByUsedInOperatingActivities", date(2024, 6, 29), 3),
            fact("PaymentsOfDividends", date(2024, 6, 29), 2),
            fact("Unrelated", date(2024, 3, 30), 1),
        ]);
        // The representative tag has facts but is not presented.
        let tags: HashSet<&str> = ["PaymentsOfDividends"].into_iter().collect();
        let periods = discover_periods(StatementKind::CashFlow, &data, &tags);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].label, "Six Months Ended Jun 29, 2024");
    }

    #[test]
    fn test_opening_date_for_february_fiscal_year() {
        let instants: BTreeSet<_> = [
            date(2023, 1, 31),
            date(2023, 7, 31),
            date(2024, 1, 31),
            date(2024, 7, 31),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            infer_opening_date(date(2024, 7, 31), 2, &instants, 30.4),
            Some(date(2024, 1, 31))
        );
        assert_eq!(
            infer_opening_date(date(2024, 7, 31), 4, &instants, 30.4),
            Some(date(2023, 7, 31))
        );
    }

    #[test]
    fn test_opening_date_is_strictly_earlier() {
        let instants: BTreeSet<_> = [date(2024, 6, 29)].into_iter().collect();
        assert_eq!(infer_opening_date(date(2024, 6, 29), 1, &instants, 30.4), None);
        assert_eq!(infer_opening_date(date(2024, 6, 29), 0, &instants, 30.4), None);
    }

    #[test]
    fn test_opening_date_tie_prefers_earlier() {
        // 1 quarter at 30.0 days/month is 90 days before Jul 1 -> Apr 2.
        let instants: BTreeSet<_> = [date(2024, 3, 31), date(2024, 4, 4)]
            .into_iter()
            .collect();
        assert_eq!(
            infer_opening_date(date(2024, 7, 1), 1, &instants, 30.0),
            Some(date(2024, 3, 31))
        );
    }
}
