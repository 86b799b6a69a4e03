use super::{RuleTable, balance};

/// Assets of an unclassified balance sheet. Current and non-current variants
/// are told apart by label.
pub const ASSETS: RuleTable = &[
    (
        "cash_cash_equivalent_and_restricted_cash",
        "[contains 'cash'] and [contains 'restricted'] and [position_before # total_assets]",
    ),
    (
        "cash_and_short_term_investments",
        "[contains 'cash and short term'] and [position_before # total_assets]",
    ),
    (
        "federal_funds_sold",
        "[contains 'federal funds' or 'reverse repurchase' or 'resale agreements'] \
         and [position_before # total_assets]",
    ),
    (
        "interest_bearing_deposits_at_banks",
        "[contains 'deposit'] and [contains 'bank' or 'interest bearing'] and [position_before # total_assets]",
    ),
    (
        "cash_and_cash_equivalents",
        "[contains 'cash'] and not [contains 'surrender'] and [position_before # total_assets]",
    ),
    (
        "loans_receivable",
        "[contains 'loan'] and [position_before # total_assets]",
    ),
    (
        "investment_securities",
        "[contains 'securities'] and [contains 'available for sale' or 'held to maturity' or 'investment'] \
         and [position_before # total_assets]",
    ),
    (
        "short_term_investments",
        "[contains 'investment' or 'marketable securities'] and [contains 'current' or 'short term'] \
         and not [contains 'non current' or 'noncurrent' or 'long term'] and [position_before # total_assets]",
    ),
    (
        "long_term_investments",
        "[contains 'investment' or 'marketable securities'] and [position_before # total_assets]",
    ),
    (
        "account_receivables_net",
        "[contains 'trade' or 'account' or 'notes'] and [contains 'receivable'] \
         and not [contains 'non trade' or 'nontrade'] and [position_before # total_assets]",
    ),
    (
        "other_receivables",
        "[contains 'receivable'] and [position_before # total_assets]",
    ),
    (
        "inventory",
        "[contains 'inventor'] and [position_before # total_assets]",
    ),
    (
        "prepaids",
        "[contains 'prepaid'] and [position_before # total_assets]",
    ),
    (
        "property_plant_equipment_net",
        "[contains 'ppe' or 'property' or 'plant' or 'equipment'] and [contains 'net' or 'less'] \
         and not [contains 'gross' or 'cost'] and [position_before # total_assets]",
    ),
    (
        "goodwill_and_intangible_assets",
        "[contains 'goodwill'] and [contains 'intangible'] and [position_before # total_assets]",
    ),
    (
        "goodwill",
        "[contains 'goodwill'] and [position_before # total_assets]",
    ),
    (
        "intangible_assets",
        "[contains 'intangible'] and [position_before # total_assets]",
    ),
    (
        "finance_lease_right_of_use_assets",
        "[contains 'finance' or 'capital'] and [contains 'lease'] and [position_before # total_assets]",
    ),
    (
        "operating_lease_right_of_use_assets",
        "[contains 'operating'] and [contains 'lease'] and [position_before # total_assets]",
    ),
    (
        "lease_assets",
        "[contains 'lease' or 'right of use'] and [position_before # total_assets]",
    ),
    (
        "deferred_tax_assets",
        "[contains 'deferred'] and [contains 'tax'] and [position_before # total_assets]",
    ),
];

/// Liabilities of an unclassified balance sheet.
pub const LIABILITIES: RuleTable = &[
    (
        "customer_deposits",
        "[contains 'deposit'] and [position_after # total_assets]",
    ),
    (
        "account_payables",
        "[contains 'account' or 'trade'] and [contains 'payable'] and [position_after # total_assets]",
    ),
    (
        "accrued_payroll",
        "[contains 'employ' or 'compensation' or 'wages' or 'salaries' or 'payroll'] \
         and not [contains 'pension' or 'retirement'] and [position_after # total_assets]",
    ),
    (
        "accrued_expenses",
        "[contains 'accrued'] and not [contains 'payroll' or 'tax' or 'wages' or 'salaries'] \
         and [position_after # total_assets]",
    ),
    (
        "deferred_tax_liabilities_non_current",
        "[contains 'deferred'] and [contains 'tax'] and [position_after # total_assets]",
    ),
    (
        "deferred_revenue",
        "[contains 'unearned' or 'unexpired' or 'deferred income' or 'deferred revenue' or 'advance' \
         or 'contract liabilit'] and [position_after # total_assets]",
    ),
    (
        "finance_lease_obligations",
        "[contains 'finance lease' or 'capital lease'] and [position_after # total_assets]",
    ),
    (
        "operating_lease_obligations",
        "[contains 'operating lease'] and [position_after # total_assets]",
    ),
    (
        "lease_obligations",
        "[contains 'lease'] and [position_after # total_assets]",
    ),
    (
        "short_term_debt",
        "[contains 'borrowing' or 'debt' or 'notes' or 'loan' or 'commercial paper'] \
         and [contains 'short term' or 'current portion' or 'current maturities' or 'commercial paper'] \
         and [position_after # total_assets]",
    ),
    (
        "long_term_debt",
        "[contains 'notes payable' or 'borrowing' or 'debt' or 'term debt' or 'long term obligation' \
         or 'loan' or 'senior notes' or 'convertible notes'] and [position_after # total_assets]",
    ),
    (
        "dividends_payable",
        "[contains 'dividend'] and [position_after # total_assets]",
    ),
    (
        "tax_payables",
        "[contains 'payable' or 'accrued' or 'liabilit' or 'obligation'] and [contains 'tax'] \
         and [position_after # total_assets]",
    ),
    (
        "pension_and_postretirement_benefits",
        "[contains 'pension' or 'retirement'] and [contains 'liabilit' or 'obligation' or 'benefit'] \
         and [position_after # total_assets]",
    ),
    (
        "commitments_and_contingencies",
        "[contains 'commitment' or 'contingenc'] and [position_after # total_assets]",
    ),
    (
        "total_liabilities",
        "[equals to 'total liabilities' or 'liabilities'] and [position_after # total_assets]",
    ),
];

/// Unclassified balance sheet rules in evaluation order.
pub const RULES: &[RuleTable] = &[ASSETS, balance::EQUITY, LIABILITIES];
