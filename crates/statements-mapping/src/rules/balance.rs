use super::{ControlSpec, RuleTable};

/// Structural totals, in identification order.
pub const CONTROLS: &[ControlSpec] = &[
    ControlSpec {
        field: "total_current_assets",
        tags: &["AssetsCurrent"],
        pattern: "[contains 'total current assets'] or \
                  ([contains 'current assets'] and not [contains 'other' or 'non current' or 'noncurrent'])",
    },
    ControlSpec {
        field: "total_non_current_assets",
        tags: &["AssetsNoncurrent"],
        pattern: "[contains 'total'] and [contains 'non current assets' or 'noncurrent assets']",
    },
    ControlSpec {
        field: "total_assets",
        tags: &["Assets"],
        pattern: "[equals to 'total assets' or 'assets total']",
    },
    ControlSpec {
        field: "total_current_liabilities",
        tags: &["LiabilitiesCurrent"],
        pattern: "[contains 'total current liabilities'] or \
                  ([contains 'current liabilities'] and not [contains 'other' or 'non current' or 'noncurrent'])",
    },
    ControlSpec {
        field: "total_non_current_liabilities",
        tags: &["LiabilitiesNoncurrent"],
        pattern: "[contains 'total'] and \
                  [contains 'non current liabilit' or 'noncurrent liabilit' or 'long term liabilit']",
    },
    ControlSpec {
        field: "total_liabilities",
        tags: &["Liabilities"],
        pattern: "[equals to 'total liabilities' or 'liabilities total']",
    },
    ControlSpec {
        field: "total_stockholders_equity",
        tags: &["StockholdersEquity"],
        pattern: "([contains 'total'] and [contains 'equity'] and not [contains 'other' or 'liabilit'] \
                  and not [equals to 'total equity']) or [contains 'total stockholders' or 'total shareholders']",
    },
    ControlSpec {
        field: "total_equity",
        tags: &["StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest"],
        pattern: "[equals to 'total equity' or 'equity total']",
    },
    ControlSpec {
        field: "total_liabilities_and_total_equity",
        tags: &["LiabilitiesAndStockholdersEquity"],
        pattern: "[contains 'liabilit'] and [contains 'equity' or 'shareholder' or 'stockholder' or 'deficit']",
    },
];

/// Items above total current assets.
pub const CURRENT_ASSETS: RuleTable = &[
    (
        "cash_cash_equivalent_and_restricted_cash",
        "[contains 'cash'] and [contains 'restricted'] and [position_before # total_current_assets]",
    ),
    (
        "cash_and_short_term_investments",
        "[contains 'cash and short term'] and [position_before # total_current_assets]",
    ),
    (
        "cash_and_cash_equivalents",
        "[contains 'cash'] and [position_before # total_current_assets]",
    ),
    (
        "short_term_investments",
        "[contains 'investment' or 'marketable securities'] and [position_before # total_current_assets]",
    ),
    (
        "account_receivables_net",
        "[contains 'trade' or 'account' or 'notes'] and [contains 'receivable'] \
         and not [contains 'non trade' or 'nontrade'] and [position_before # total_current_assets]",
    ),
    (
        "other_receivables",
        "[contains 'receivable'] and [position_before # total_current_assets]",
    ),
    (
        "inventory",
        "[contains 'inventor'] and [position_before # total_current_assets]",
    ),
    (
        "prepaids",
        "[contains 'prepaid'] and [position_before # total_current_assets]",
    ),
];

/// Items between total current assets and total assets.
pub const NON_CURRENT_ASSETS: RuleTable = &[
    (
        "property_plant_equipment_net",
        "[contains 'ppe' or 'property' or 'plant' or 'equipment'] and [contains 'net' or 'less'] \
         and not [contains 'gross' or 'cost'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "long_term_investments",
        "[contains 'investment' or 'marketable securities'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "goodwill_and_intangible_assets",
        "[contains 'goodwill'] and [contains 'intangible'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "goodwill",
        "[contains 'goodwill'] and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "intangible_assets",
        "[contains 'intangible'] and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "finance_lease_right_of_use_assets",
        "[contains 'finance' or 'capital'] and [contains 'lease'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "operating_lease_right_of_use_assets",
        "[contains 'operating'] and [contains 'lease'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "lease_assets",
        "[contains 'lease' or 'right of use'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
    (
        "deferred_tax_assets",
        "[contains 'deferred'] and [contains 'tax'] \
         and [position_after # total_current_assets] and [position_before # total_assets]",
    ),
];

/// Equity items, tried before liabilities for everything after total assets.
pub const EQUITY: RuleTable = &[
    (
        "treasury_stock",
        "[tag contains 'commonstock'] and [negating] and [position_after # total_assets]",
    ),
    (
        "common_stock",
        "(([contains 'common stock' or 'common shares' or 'capital stock' or 'ordinary shares' or 'share capital'] \
         and [contains 'par' or 'issued' or 'authorized' or 'outstanding' or 'value' or 'cost' or 'stated'] \
         and not [contains 'treasury' or 'purchase'] and [datatype = monetary]) \
         or [tag contains 'commonstockvalue' or 'commonstocksincludingadditionalpaidincapital'] \
         or [equals to 'common stock' or 'common shares']) and [position_after # total_assets]",
    ),
    (
        "preferred_stock",
        "[contains 'preferred stock' or 'preferred shares' or 'preference shares'] \
         and [datatype = monetary] and [position_after # total_assets]",
    ),
    (
        "additional_paid_in_capital",
        "[contains 'additional' or 'paid in' or 'excess' or 'surplus'] \
         and [contains 'capital' or 'proceeds' or 'fund' or 'amount'] and [position_after # total_assets]",
    ),
    (
        "retained_earnings",
        "[contains 'accumulated' or 'retained' or 'employed' or 'reinvest'] \
         and [contains 'earning' or 'deficit' or 'profit'] and [position_after # total_assets]",
    ),
    (
        "accumulated_other_comprehensive_income_loss",
        "[contains 'accumulated other comprehensive' or 'other comprehensive'] and [position_after # total_assets]",
    ),
    (
        "treasury_stock",
        "(([contains 'treasury' or 'repurchase' or 'purchase'] and [contains 'stock' or 'share']) \
         or [contains 'esop' or 'employee stock ownership' or 'option']) and [position_after # total_assets]",
    ),
    (
        "redeemable_non_controlling_interests",
        "[contains 'noncontrolling interests in subsidiaries' or 'redeemable noncontrolling' \
         or 'redeemable non controlling'] and [position_after # total_assets]",
    ),
    (
        "minority_interest",
        "[contains 'noncontrolling' or 'non controlling' or 'minority interest'] \
         and [position_after # total_assets]",
    ),
    (
        "total_stockholders_equity",
        "[contains 'stockholder' or 'shareholder' or 'owner'] and [contains 'equity' or 'deficit'] \
         and not [contains 'liabilit'] and [position_after # total_assets]",
    ),
    (
        "total_equity",
        "[equals to 'total equity' or 'total deficit'] and [position_after # total_assets]",
    ),
];

/// Items between total assets and total current liabilities.
pub const CURRENT_LIABILITIES: RuleTable = &[
    (
        "account_payables",
        "[contains 'account' or 'trade'] and [contains 'payable'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "accrued_payroll",
        "[contains 'employ' or 'compensation' or 'wages' or 'salaries' or 'payroll'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "accrued_expenses",
        "[contains 'accrued'] and not [contains 'payroll' or 'tax' or 'wages' or 'salaries'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "deferred_revenue",
        "[contains 'unearned' or 'unexpired' or 'deferred income' or 'deferred revenue' or 'advance' \
         or 'contract liabilit'] and not [contains 'tax'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "finance_lease_obligations_current",
        "[contains 'finance lease' or 'capital lease'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "operating_lease_obligations_current",
        "[contains 'operating lease'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "lease_obligation_current",
        "[contains 'lease'] and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "short_term_debt",
        "(([contains 'borrowing' or 'debt' or 'notes' or 'loan' or 'commercial paper'] \
         and not [contains 'long term']) or [contains 'current maturities' or 'current portion']) \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "dividends_payable",
        "[contains 'dividend'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
    (
        "tax_payables",
        "[contains 'payable' or 'accrued' or 'liabilit' or 'obligation'] and [contains 'tax'] \
         and not [contains 'deferred'] \
         and [position_after # total_assets] and [position_before # total_current_liabilities]",
    ),
];

/// Items after total current liabilities.
pub const NON_CURRENT_LIABILITIES: RuleTable = &[
    (
        "finance_lease_obligations_non_current",
        "[contains 'finance lease' or 'capital lease'] and [position_after # total_current_liabilities]",
    ),
    (
        "operating_lease_obligations_non_current",
        "[contains 'operating lease'] and [position_after # total_current_liabilities]",
    ),
    (
        "lease_obligation_non_current",
        "[contains 'lease'] and [position_after # total_current_liabilities]",
    ),
    (
        "deferred_tax_liabilities_non_current",
        "[contains 'deferred'] and [contains 'tax'] and [position_after # total_current_liabilities]",
    ),
    (
        "long_term_debt",
        "[contains 'notes payable' or 'borrowing' or 'debt' or 'term debt' or 'long term obligation' \
         or 'loan' or 'senior notes' or 'convertible notes'] and [position_after # total_current_liabilities]",
    ),
    (
        "pension_and_postretirement_benefits",
        "[contains 'pension' or 'retirement' or 'employ'] and [contains 'liabilit' or 'obligation' or 'benefit'] \
         and [position_after # total_current_liabilities]",
    ),
    (
        "deferred_revenue_non_current",
        "[contains 'deferred revenue' or 'unearned' or 'deferred income' or 'contract liabilit'] \
         and [position_after # total_current_liabilities]",
    ),
    (
        "tax_payables_non_current",
        "[contains 'tax'] and [contains 'payable' or 'liabilit' or 'obligation' or 'accrued'] \
         and [position_after # total_current_liabilities]",
    ),
    (
        "commitments_and_contingencies",
        "[contains 'commitment' or 'contingenc'] and [position_after # total_current_liabilities]",
    ),
    (
        "total_liabilities",
        "[equals to 'total liabilities' or 'liabilities'] and [position_after # total_current_liabilities]",
    ),
];

/// Classified balance sheet rules in evaluation order.
pub const RULES: &[RuleTable] = &[
    CURRENT_ASSETS,
    NON_CURRENT_ASSETS,
    EQUITY,
    CURRENT_LIABILITIES,
    NON_CURRENT_LIABILITIES,
];
