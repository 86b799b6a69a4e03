use super::{ControlSpec, RuleTable};

/// Anchor lines of an income statement.
pub const CONTROLS: &[ControlSpec] = &[
    ControlSpec {
        field: "revenue",
        tags: &[
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
        ],
        pattern: "[contains 'revenue' or 'sales'] and not [contains 'marketing' or 'admin' or 'general' \
                  or 'cost' or 'deferred' or 'expense'] and [datatype = monetary]",
    },
    ControlSpec {
        field: "operating_income",
        tags: &["OperatingIncomeLoss"],
        pattern: "[contains 'operating' or 'operation' or 'continuing'] \
                  and [contains 'income' or 'loss' or 'profit' or 'earnings'] \
                  and not [contains 'before' or 'other' or 'non operating' or 'nonoperating' or 'discontinued'] \
                  and [datatype = monetary]",
    },
    ControlSpec {
        field: "income_tax_expense",
        tags: &["IncomeTaxExpenseBenefit"],
        pattern: "[contains 'tax'] and [contains 'provision' or 'benefit' or 'expense' or 'income'] \
                  and not [contains 'before' or 'net of tax' or 'after tax'] and [datatype = monetary]",
    },
    ControlSpec {
        field: "net_income",
        tags: &["NetIncomeLoss", "ProfitLoss"],
        pattern: "[contains 'net income' or 'net loss' or 'net profit' or 'net earnings'] \
                  and not [contains 'other' or 'continuing' or 'operating' or 'per share'] \
                  and [datatype = monetary]",
    },
    ControlSpec {
        field: "eps",
        tags: &["EarningsPerShareBasic", "EarningsPerShareBasicAndDiluted"],
        pattern: "[contains 'basic'] and [datatype = perShare]",
    },
    ControlSpec {
        field: "eps_diluted",
        tags: &["EarningsPerShareDiluted"],
        pattern: "[contains 'diluted'] and [datatype = perShare]",
    },
    ControlSpec {
        field: "weighted_average_shares_outstanding",
        tags: &["WeightedAverageNumberOfSharesOutstandingBasic"],
        pattern: "[contains 'basic'] and [datatype = shares]",
    },
    ControlSpec {
        field: "weighted_average_shares_outstanding_diluted",
        tags: &["WeightedAverageNumberOfDilutedSharesOutstanding"],
        pattern: "[contains 'diluted'] and [datatype = shares]",
    },
];

/// Income statement line items.
pub const ITEMS: RuleTable = &[
    (
        "revenue",
        "[contains 'revenue' or 'sales'] and not [contains 'cost' or 'marketing' or 'admin' or 'general' \
         or 'deferred' or 'expense'] and [datatype = monetary] and [position_before # operating_income]",
    ),
    (
        "cost_of_revenue",
        "[contains 'cost of' or 'costs of'] and [contains 'revenue' or 'sales' or 'goods' or 'products' \
         or 'services'] and [position_before # operating_income]",
    ),
    (
        "gross_profit",
        "[contains 'gross profit' or 'gross margin']",
    ),
    (
        "cost_and_expenses",
        "[contains 'costs and expenses' or 'cost and expenses' or 'total expenses' or 'total costs'] \
         and [position_before # operating_income]",
    ),
    (
        "research_and_development_expenses",
        "[contains 'research' or 'product development' or 'technology and development'] \
         and [position_before # operating_income]",
    ),
    (
        "selling_general_and_administrative_expenses",
        "(([contains 'selling' or 'sales'] and [contains 'general' or 'administrative']) or [contains 'sg&a']) \
         and [position_before # operating_income]",
    ),
    (
        "sales_and_marketing_expenses",
        "[contains 'marketing' or 'selling'] and [position_before # operating_income]",
    ),
    (
        "general_and_administrative_expenses",
        "[contains 'general' or 'administrative'] and [position_before # operating_income]",
    ),
    (
        "depreciation_and_amortization",
        "[contains 'depreciation' or 'amortization'] and [position_before # operating_income]",
    ),
    (
        "operating_expenses",
        "[contains 'operating expenses' or 'operating costs'] and not [contains 'other' or 'non operating'] \
         and [position_before # operating_income]",
    ),
    (
        "other_expenses",
        "[contains 'other'] and [contains 'expense' or 'charges'] and [position_before # operating_income]",
    ),
    (
        "operating_income",
        "[contains 'operating' or 'operations'] and [contains 'income' or 'loss' or 'profit'] \
         and not [contains 'non operating' or 'nonoperating' or 'other' or 'before' or 'discontinued' \
         or 'continuing'] and [datatype = monetary]",
    ),
    (
        "interest_income",
        "[contains 'interest'] and [contains 'income'] and not [contains 'expense' or 'net']",
    ),
    (
        "interest_expense",
        "[contains 'interest'] and [contains 'expense'] and not [contains 'income']",
    ),
    (
        "net_interest_income",
        "[contains 'interest'] and [contains 'net']",
    ),
    (
        "total_other_income_expenses_net",
        "[contains 'other'] and [contains 'income' or 'expense'] and [contains 'total' or 'net'] \
         and [position_after # operating_income] and [position_before # income_tax_expense]",
    ),
    (
        "non_operating_income",
        "[contains 'non operating' or 'nonoperating' or 'other income' or 'other expense' or 'other gains' \
         or 'other losses'] and [position_after # operating_income] and [position_before # income_tax_expense]",
    ),
    (
        "income_before_tax",
        "[contains 'before'] and [contains 'tax']",
    ),
    (
        "income_tax_expense",
        "[contains 'tax'] and [contains 'provision' or 'benefit' or 'expense' or 'income'] \
         and not [contains 'before' or 'net of'] and [datatype = monetary]",
    ),
    (
        "net_income_from_continuing_operations",
        "[contains 'continuing'] and [datatype = monetary]",
    ),
    (
        "net_income_from_discontinued_operations",
        "[contains 'discontinued'] and [datatype = monetary]",
    ),
    (
        "net_income_attributed_to_non_controlling_interests",
        "[contains 'noncontrolling' or 'non controlling' or 'minority'] and [datatype = monetary]",
    ),
    (
        "net_income_attributable_to_controlling_interests",
        "[contains 'attributable'] and [contains 'net income' or 'net loss' or 'net earnings'] \
         and [datatype = monetary]",
    ),
    (
        "net_income",
        "[contains 'net income' or 'net loss' or 'net earnings' or 'net profit'] and [datatype = monetary]",
    ),
    (
        "eps",
        "min{[contains 'basic'] and [datatype = perShare] and [position_after # net_income]}",
    ),
    (
        "eps_diluted",
        "min{[contains 'diluted'] and [datatype = perShare] and [position_after # net_income]}",
    ),
    (
        "weighted_average_shares_outstanding",
        "min{[contains 'basic'] and [datatype = shares] and [position_after # net_income]}",
    ),
    (
        "weighted_average_shares_outstanding_diluted",
        "min{[contains 'diluted'] and [datatype = shares] and [position_after # net_income]}",
    ),
];

/// Income statement rules in evaluation order.
pub const RULES: &[RuleTable] = &[ITEMS];
