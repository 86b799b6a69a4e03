//! Balance sheet validation, derivation and residuals.
//!
//! Runs after aggregation, in a fixed order: financial sector escape, the
//! accounting equation on the current period, total liabilities, the
//! non-current totals and finally the `other_*` residuals of each section.

use std::collections::BTreeMap;

use statements_core::{PeriodKey, PeriodValues, ReconConfig};
use statements_recon::within_tolerance;
use tracing::{debug, warn};

use crate::rules::Strategy;
use crate::standardized::{MappingStatus, Provenance, StandardField};

/// Status reason for balance sheets of the financial sector.
pub const FINANCIAL_SECTOR: &str = "skipped: financial sector";

/// Note recorded when a current total is missing.
pub const SPLIT_UNAVAILABLE: &str = "split unavailable";

/// Note prefix for a comparative period left without derived figures because
/// its accounting equation does not hold.
pub const UNBALANCED_PERIOD: &str = "unbalanced period";

/// Components of total current assets.
pub const CURRENT_ASSET_FIELDS: &[&str] = &[
    "cash_and_cash_equivalents",
    "cash_and_short_term_investments",
    "cash_cash_equivalent_and_restricted_cash",
    "short_term_investments",
    "account_receivables_net",
    "other_receivables",
    "inventory",
    "prepaids",
];

/// Components of total non-current assets.
pub const NON_CURRENT_ASSET_FIELDS: &[&str] = &[
    "property_plant_equipment_net",
    "finance_lease_right_of_use_assets",
    "operating_lease_right_of_use_assets",
    "lease_assets",
    "long_term_investments",
    "goodwill",
    "intangible_assets",
    "goodwill_and_intangible_assets",
    "deferred_tax_assets",
];

/// Components of total current liabilities.
pub const CURRENT_LIABILITY_FIELDS: &[&str] = &[
    "account_payables",
    "accrued_payroll",
    "accrued_expenses",
    "short_term_debt",
    "deferred_revenue",
    "tax_payables",
    "dividends_payable",
    "finance_lease_obligations_current",
    "operating_lease_obligations_current",
    "lease_obligation_current",
];

/// Components of total non-current liabilities.
pub const NON_CURRENT_LIABILITY_FIELDS: &[&str] = &[
    "long_term_debt",
    "pension_and_postretirement_benefits",
    "deferred_revenue_non_current",
    "deferred_tax_liabilities_non_current",
    "tax_payables_non_current",
    "finance_lease_obligations_non_current",
    "operating_lease_obligations_non_current",
    "lease_obligation_non_current",
    "commitments_and_contingencies",
];

/// Components of total stockholders' equity, treasury stock excluded.
pub const EQUITY_FIELDS: &[&str] = &[
    "common_stock",
    "preferred_stock",
    "additional_paid_in_capital",
    "retained_earnings",
    "accumulated_other_comprehensive_income_loss",
];

/// Contra-equity components, subtracted from the equity sum.
pub const CONTRA_EQUITY_FIELDS: &[&str] = &["treasury_stock"];

/// Non-controlling interest components, part of stockholders' equity only
/// when no separate total equity is presented.
pub const NON_CONTROLLING_FIELDS: &[&str] = &["minority_interest", "redeemable_non_controlling_interests"];

/// Asset components specific to bank balance sheets.
pub const BANK_ASSET_FIELDS: &[&str] = &[
    "loans_receivable",
    "investment_securities",
    "federal_funds_sold",
    "interest_bearing_deposits_at_banks",
];

/// Liability components that only appear without a current split.
pub const COMBINED_LIABILITY_FIELDS: &[&str] = &[
    "finance_lease_obligations",
    "operating_lease_obligations",
    "lease_obligations",
    "customer_deposits",
];

fn value(fields: &BTreeMap<String, StandardField>, name: &str, period: &PeriodKey) -> Option<f64> {
    fields.get(name)?.value(period)
}

fn values(fields: &BTreeMap<String, StandardField>, name: &str) -> Option<PeriodValues> {
    fields.get(name).map(|f| f.values.clone())
}

fn halt(invariant: &str, figures: impl IntoIterator<Item = (&'static str, f64)>) -> MappingStatus {
    let figures: BTreeMap<String, f64> = figures
        .into_iter()
        .map(|(name, v)| (name.to_string(), v))
        .collect();
    warn!(invariant, ?figures, "Balance sheet mapping halted");
    MappingStatus::Halted {
        invariant: invariant.to_string(),
        figures,
    }
}

/// `a − b` for the periods both have.
fn difference(a: &PeriodValues, b: &PeriodValues) -> PeriodValues {
    a.iter()
        .filter_map(|(period, x)| b.get(period).map(|y| (*period, x - y)))
        .collect()
}

/// Inserts a derived total unless the statement presents it.
fn derive(fields: &mut BTreeMap<String, StandardField>, name: &str, derived: PeriodValues) {
    if fields.contains_key(name) || derived.is_empty() {
        return;
    }
    debug!(field = name, "Derived total");
    fields.insert(
        name.to_string(),
        StandardField::computed(derived, Provenance::Derived),
    );
}

/// Computes `total − Σ components + Σ contra` per period of the total and
/// stores it as `residual` when its magnitude exceeds `epsilon`.
fn residual(
    fields: &mut BTreeMap<String, StandardField>,
    residual: &str,
    total: &str,
    components: &[&[&str]],
    contra: &[&str],
    epsilon: f64,
) {
    let Some(totals) = values(fields, total) else {
        return;
    };
    let mut out = PeriodValues::new();
    for (period, total) in &totals {
        let basis = |name: &&str| {
            fields
                .get(*name)
                .and_then(|f| f.residual_basis(period))
                .unwrap_or(0.0)
        };
        let sum: f64 = components.iter().flat_map(|c| c.iter()).map(basis).sum();
        let contra: f64 = contra.iter().map(basis).sum();
        let remainder = total - (sum - contra);
        if remainder.abs() > epsilon {
            out.insert(*period, remainder);
        }
    }
    if !out.is_empty() {
        fields.insert(
            residual.to_string(),
            StandardField::computed(out, Provenance::Residual),
        );
    }
}

/// Periods other than `current` where total assets and total liabilities and
/// equity are both mapped but disagree beyond `tolerance`.
#[must_use]
pub fn unbalanced_periods(
    fields: &BTreeMap<String, StandardField>,
    current: &PeriodKey,
    tolerance: f64,
) -> Vec<PeriodKey> {
    let (Some(assets), Some(total)) = (
        fields.get("total_assets"),
        fields.get("total_liabilities_and_total_equity"),
    ) else {
        return Vec::new();
    };
    assets
        .values
        .iter()
        .filter(|(period, _)| *period != current)
        .filter_map(|(period, &ta)| {
            let tle = total.value(period)?;
            (!within_tolerance(ta, tle, tolerance)).then_some(*period)
        })
        .collect()
}

/// Drops `periods` from every derived and residual field.
fn exclude_periods(fields: &mut BTreeMap<String, StandardField>, periods: &[PeriodKey]) {
    if periods.is_empty() {
        return;
    }
    fields.retain(|_, field| {
        if field.provenance == Provenance::Mapped {
            return true;
        }
        field.values.retain(|period, _| !periods.contains(period));
        !field.values.is_empty()
    });
}

/// Validates a mapped balance sheet and fills in derived totals and
/// residuals. `current` is the most recent period; comparative periods that
/// fail the accounting equation get no derived figures (see
/// [`unbalanced_periods`]).
pub fn derive_balance_sheet(
    fields: &mut BTreeMap<String, StandardField>,
    strategy: Strategy,
    current: Option<PeriodKey>,
    sic: Option<u32>,
    config: &ReconConfig,
) -> MappingStatus {
    if config.is_financial_sic(sic) {
        debug!(?sic, "Financial sector balance sheet, residuals skipped");
        return MappingStatus::Skipped(FINANCIAL_SECTOR.to_string());
    }

    // ===== Accounting equation =====
    let Some(period) = current else {
        return halt("balance sheet has a reporting period", []);
    };
    let total_assets = value(fields, "total_assets", &period);
    let total_le = value(fields, "total_liabilities_and_total_equity", &period);
    let (ta, tle) = match (total_assets, total_le) {
        (Some(ta), Some(tle)) => (ta, tle),
        _ => {
            let figures = [
                total_assets.map(|v| ("total_assets", v)),
                total_le.map(|v| ("total_liabilities_and_total_equity", v)),
            ];
            return halt(
                "total_assets and total_liabilities_and_total_equity present",
                figures.into_iter().flatten(),
            );
        }
    };
    if !within_tolerance(ta, tle, config.equation_tolerance) {
        return halt(
            "total_assets = total_liabilities_and_total_equity",
            [
                ("total_assets", ta),
                ("total_liabilities_and_total_equity", tle),
                ("difference", ta - tle),
            ],
        );
    }

    let unbalanced = unbalanced_periods(fields, &period, config.equation_tolerance);
    if !unbalanced.is_empty() {
        warn!(periods = ?unbalanced, "Comparative periods fail the accounting equation");
    }

    // ===== Total liabilities =====
    if !fields.contains_key("total_liabilities") {
        let equity = values(fields, "total_equity").or_else(|| values(fields, "total_stockholders_equity"));
        let Some(equity) = equity else {
            return halt(
                "total_liabilities, total_equity or total_stockholders_equity present",
                [("total_assets", ta), ("total_liabilities_and_total_equity", tle)],
            );
        };
        let tle_values = values(fields, "total_liabilities_and_total_equity").unwrap_or_default();
        derive(fields, "total_liabilities", difference(&tle_values, &equity));
    }

    let epsilon = config.residual_epsilon;
    let mut equity_components: Vec<&[&str]> = vec![EQUITY_FIELDS];
    if !fields.contains_key("total_equity") {
        equity_components.push(NON_CONTROLLING_FIELDS);
    }

    match strategy {
        Strategy::Classified => {
            // ===== Non-current totals =====
            let ta = values(fields, "total_assets").unwrap_or_default();
            let tca = values(fields, "total_current_assets").unwrap_or_default();
            derive(fields, "total_non_current_assets", difference(&ta, &tca));
            let tl = values(fields, "total_liabilities").unwrap_or_default();
            let tcl = values(fields, "total_current_liabilities").unwrap_or_default();
            derive(fields, "total_non_current_liabilities", difference(&tl, &tcl));

            // ===== Residuals =====
            residual(fields, "other_current_assets", "total_current_assets", &[CURRENT_ASSET_FIELDS], &[], epsilon);
            residual(
                fields,
                "other_non_current_assets",
                "total_non_current_assets",
                &[NON_CURRENT_ASSET_FIELDS],
                &[],
                epsilon,
            );
            residual(
                fields,
                "other_current_liabilities",
                "total_current_liabilities",
                &[CURRENT_LIABILITY_FIELDS],
                &[],
                epsilon,
            );
            residual(
                fields,
                "other_non_current_liabilities",
                "total_non_current_liabilities",
                &[NON_CURRENT_LIABILITY_FIELDS],
                &[],
                epsilon,
            );
        }
        Strategy::Unclassified => {
            residual(
                fields,
                "other_assets",
                "total_assets",
                &[CURRENT_ASSET_FIELDS, NON_CURRENT_ASSET_FIELDS, BANK_ASSET_FIELDS],
                &[],
                epsilon,
            );
            residual(
                fields,
                "other_liabilities",
                "total_liabilities",
                &[
                    CURRENT_LIABILITY_FIELDS,
                    NON_CURRENT_LIABILITY_FIELDS,
                    COMBINED_LIABILITY_FIELDS,
                ],
                &[],
                epsilon,
            );
        }
    }
    residual(
        fields,
        "other_total_stockholders_equity",
        "total_stockholders_equity",
        &equity_components,
        CONTRA_EQUITY_FIELDS,
        epsilon,
    );
    exclude_periods(fields, &unbalanced);
    MappingStatus::Mapped
}
