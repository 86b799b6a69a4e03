use super::{ControlSpec, RuleTable};

/// Anchor lines of a cash flow statement.
pub const CONTROLS: &[ControlSpec] = &[
    ControlSpec {
        field: "net_income",
        tags: &["NetIncomeLoss", "ProfitLoss"],
        pattern: "[contains 'net income' or 'net loss' or 'net earnings' or 'net profit'] \
                  and not [contains 'other' or 'operating' or 'per share'] and [period = duration]",
    },
    ControlSpec {
        field: "net_cash_provided_by_operating_activities",
        tags: &[
            "NetCashProvidedByUsedInOperatingActivities",
            "NetCashProvidedByUsedInOperatingActivitiesContinuingOperations",
        ],
        pattern: "([contains 'cash'] and [contains 'operating' or 'operations'] \
                  and not [contains 'other' or 'discontinued' or 'paid' or 'lease']) \
                  or [contains 'total operating']",
    },
    ControlSpec {
        field: "net_cash_provided_by_investing_activities",
        tags: &[
            "NetCashProvidedByUsedInInvestingActivities",
            "NetCashProvidedByUsedInInvestingActivitiesContinuingOperations",
        ],
        pattern: "([contains 'cash'] and [contains 'investing'] and not [contains 'other' or 'discontinued']) \
                  or [contains 'total investing']",
    },
    ControlSpec {
        field: "net_cash_provided_by_financing_activities",
        tags: &[
            "NetCashProvidedByUsedInFinancingActivities",
            "NetCashProvidedByUsedInFinancingActivitiesContinuingOperations",
        ],
        pattern: "([contains 'cash'] and [contains 'financing'] and not [contains 'other' or 'discontinued']) \
                  or [contains 'total financing']",
    },
    ControlSpec {
        field: "cash_at_beginning_of_period",
        tags: &[],
        pattern: "[period = instant] and ([contains 'cash'] or [tag contains 'cash']) \
                  and [contains 'begin' or 'start']",
    },
    ControlSpec {
        field: "cash_at_end_of_period",
        tags: &[],
        pattern: "[period = instant] and ([contains 'cash'] or [tag contains 'cash']) \
                  and [contains 'end' or 'ending' or 'close'] and not [contains 'begin']",
    },
];

/// Activity sections, in statement order: the net cash control closing the
/// section and the field collecting its unmapped lines.
pub const SECTIONS: &[(&str, &str)] = &[
    ("net_cash_provided_by_operating_activities", "other_operating_activities"),
    ("net_cash_provided_by_investing_activities", "other_investing_activities"),
    ("net_cash_provided_by_financing_activities", "other_financing_activities"),
];

/// Adjustments and working capital changes above net cash from operations.
pub const OPERATING: RuleTable = &[
    (
        "depreciation_and_amortization",
        "[contains 'depreciation'] and [contains 'amortization'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "depreciation",
        "[contains 'depreciation' or 'depletion'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "amortization",
        "[contains 'amortization'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "impairments",
        "[contains 'impairment' or 'write down' or 'write off' or 'restructuring'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "pension_and_postretirement",
        "[contains 'pension' or 'postretirement' or 'retirement'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "stock_based_compensation",
        "[contains 'stock' or 'share' or 'equity'] and [contains 'compensation' or 'based'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "non_operating_expense_income",
        "[contains 'non operating' or 'nonoperating'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "investment_gains_losses",
        "[contains 'gain' or 'loss'] and [contains 'investment' or 'securities' or 'sale' or 'disposal'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "deferred_income_tax",
        "[contains 'deferred'] and [contains 'tax'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "other_adjustments",
        "[equals to 'other' or 'other net' or 'other items' or 'other non cash items' or 'other adjustments' \
         or 'other noncash items'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "change_in_other_working_capital",
        "[contains 'working capital'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "vendor_receivables",
        "[contains 'vendor'] and [contains 'receivable'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "accounts_receivables",
        "[contains 'receivable'] and not [contains 'other'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "inventory",
        "[contains 'inventor'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "prepaids",
        "[contains 'prepaid'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "accounts_payables",
        "[contains 'account' or 'trade'] and [contains 'payable'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "income_taxes_payable",
        "[contains 'tax'] and [contains 'payable'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "accrued_expenses",
        "[contains 'accrued'] and not [contains 'tax'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "unearned_revenue",
        "[contains 'unearned' or 'deferred revenue' or 'contract liabilit'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "income_taxes",
        "[contains 'income tax'] and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "other_assets",
        "[contains 'other'] and [contains 'asset'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
    (
        "other_liabilities",
        "[contains 'other'] and [contains 'liabilit'] \
         and [position_before # net_cash_provided_by_operating_activities]",
    ),
];

/// Lines between net cash from operations and net cash from investing.
pub const INVESTING: RuleTable = &[
    (
        "investments_in_property_plant_and_equipment",
        "(([contains 'purchase' or 'acquisition' or 'payments for' or 'additions' or 'expenditure'] \
         and [contains 'property' or 'equipment' or 'plant' or 'fixed assets']) \
         or [contains 'capital expenditure']) \
         and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
    (
        "proceeds_from_sales_of_ppe",
        "[contains 'proceeds' or 'sale' or 'disposal'] and [contains 'property' or 'equipment' or 'plant' \
         or 'fixed assets'] and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
    (
        "acquisitions_of_business_net",
        "[contains 'acquisition' or 'acquired' or 'business combination'] \
         and [contains 'business' or 'net of cash' or 'companies' or 'subsidiar'] \
         and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
    (
        "proceeds_from_divestiture",
        "[contains 'divestiture' or 'disposition of business' or 'sale of business' or 'sale of businesses'] \
         and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
    (
        "purchases_of_investments",
        "[contains 'purchase' or 'payments for' or 'acquisition'] \
         and [contains 'investment' or 'securities' or 'marketable'] \
         and not [contains 'strategic' or 'non marketable' or 'equity method'] \
         and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
    (
        "sales_maturities_of_investments",
        "[contains 'proceeds' or 'sale' or 'maturit' or 'redemption'] \
         and [contains 'investment' or 'securities' or 'marketable'] \
         and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
    (
        "other_aquisitons_and_investments",
        "[contains 'investment' or 'acquisition'] \
         and [position_after # net_cash_provided_by_operating_activities] \
         and [position_before # net_cash_provided_by_investing_activities]",
    ),
];

/// Lines between net cash from investing and net cash from financing.
pub const FINANCING: RuleTable = &[
    (
        "commercial_paper_net",
        "[contains 'commercial paper'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "finance_lease_repayment",
        "[contains 'finance lease' or 'capital lease'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "financing_obligations_repayment",
        "[contains 'financing obligation'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "issuance_costs",
        "[contains 'issuance cost' or 'financing cost' or 'debt cost'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "short_term_debt_issuance",
        "[contains 'proceeds' or 'issuance'] and [contains 'short term'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "short_term_debt_repayment",
        "[contains 'repayment' or 'payment' or 'retirement'] and [contains 'short term'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "change_in_short_term_debt_net",
        "[contains 'short term'] and [contains 'debt' or 'borrowing'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "term_debt_issuance",
        "[contains 'term debt'] and not [contains 'long term'] and [contains 'proceeds' or 'issuance'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "term_debt_repayment",
        "[contains 'term debt'] and not [contains 'long term'] and [contains 'repayment' or 'payment'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "change_in_term_debt",
        "[contains 'term debt'] and not [contains 'long term'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "long_term_net_debt_issuance",
        "[contains 'proceeds' or 'issuance'] \
         and [contains 'debt' or 'borrowing' or 'notes' or 'senior' or 'loan'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "long_term_net_debt_repayment",
        "[contains 'repayment' or 'payment' or 'retirement' or 'redemption'] \
         and [contains 'debt' or 'borrowing' or 'notes' or 'senior' or 'loan'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "change_in_long_term_debt_net",
        "[contains 'debt' or 'borrowing'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "taxes_on_share_settlement",
        "[contains 'tax'] and [contains 'share' or 'equity' or 'stock' or 'award' or 'vesting' or 'withh'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "common_stock_repurchased",
        "[contains 'repurchase' or 'buyback' or 'treasury' or 'purchase of common' or 'purchases of common'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "common_stock_dividends_paid",
        "[contains 'dividend'] and [contains 'common'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "preferred_stock_dividends_paid",
        "[contains 'dividend'] and [contains 'preferred'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "dividends_paid",
        "[contains 'dividend'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "preferred_stock_issuance",
        "[contains 'preferred'] and [contains 'issuance' or 'proceeds'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "net_preferred_stock_issuance",
        "[contains 'preferred'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "proceeds_from_issuance_of_stock_sp",
        "[contains 'stock plan' or 'employee stock' or 'option' or 'stock purchase plan'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "common_stock_issuance",
        "[contains 'stock' or 'shares'] and [contains 'issuance' or 'proceeds' or 'issued'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "net_common_stock_issuance",
        "[contains 'common stock'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
    (
        "net_stock_issuance",
        "[contains 'stock' or 'shares'] and [contains 'net'] \
         and [position_after # net_cash_provided_by_investing_activities] \
         and [position_before # net_cash_provided_by_financing_activities]",
    ),
];

/// Lines outside the activity sections.
pub const OTHER: RuleTable = &[
    (
        "effect_of_foreign_exchanges_rate_changes_on_cash",
        "[contains 'exchange rate' or 'foreign exchange' or 'currency'] and [period = duration] \
         and [position_after # net_cash_provided_by_financing_activities]",
    ),
    (
        "net_change_in_cash",
        "[contains 'increase' or 'decrease' or 'change'] and [contains 'cash'] and [period = duration] \
         and [position_after # net_cash_provided_by_financing_activities]",
    ),
    (
        "income_taxes_paid",
        "[contains 'tax'] and [contains 'paid' or 'payments'] \
         and [position_after # net_cash_provided_by_financing_activities]",
    ),
    (
        "interest_paid",
        "[contains 'interest'] and [contains 'paid' or 'payments'] \
         and [position_after # net_cash_provided_by_financing_activities]",
    ),
];

/// Cash flow statement rules in evaluation order.
pub const RULES: &[RuleTable] = &[OPERATING, INVESTING, FINANCING, OTHER];
