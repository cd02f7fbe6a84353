//! Standard chart used to populate an empty store

use rust_decimal::Decimal;

use crate::models::{AccountBalance, AccountRecord, BalanceMap};
use crate::types::{AccountKind, RootType};

fn group(
    name: &str,
    parent: Option<&str>,
    root_type: RootType,
    expanded: bool,
    children: Vec<AccountRecord>,
) -> AccountRecord {
    AccountRecord {
        name: name.to_string(),
        parent_account: parent.map(str::to_string),
        root_type,
        account_type: AccountKind::Group,
        is_group: true,
        children,
        expanded,
    }
}

fn detail(name: &str, parent: &str, root_type: RootType) -> AccountRecord {
    AccountRecord {
        name: name.to_string(),
        parent_account: Some(parent.to_string()),
        root_type,
        account_type: AccountKind::Detail,
        is_group: false,
        children: vec![],
        expanded: false,
    }
}

/// Five-root chart: Assets, Liabilities, Income, Expenses, Equity
pub fn default_chart() -> Vec<AccountRecord> {
    use RootType::*;

    vec![
        group(
            "Assets",
            None,
            Asset,
            true,
            vec![
                group(
                    "Current Assets",
                    Some("Assets"),
                    Asset,
                    true,
                    vec![
                        detail("Cash & Bank", "Current Assets", Asset),
                        detail("Accounts Receivable", "Current Assets", Asset),
                        detail("Inventory", "Current Assets", Asset),
                    ],
                ),
                group(
                    "Fixed Assets",
                    Some("Assets"),
                    Asset,
                    false,
                    vec![
                        detail("Property, Plant & Equipment", "Fixed Assets", Asset),
                        detail("Accumulated Depreciation", "Fixed Assets", Asset),
                    ],
                ),
            ],
        ),
        group(
            "Liabilities",
            None,
            Liability,
            false,
            vec![
                group(
                    "Current Liabilities",
                    Some("Liabilities"),
                    Liability,
                    false,
                    vec![
                        detail("Accounts Payable", "Current Liabilities", Liability),
                        detail("Short-term Debt", "Current Liabilities", Liability),
                    ],
                ),
                group(
                    "Long-term Liabilities",
                    Some("Liabilities"),
                    Liability,
                    false,
                    vec![detail("Long-term Debt", "Long-term Liabilities", Liability)],
                ),
            ],
        ),
        group(
            "Income",
            None,
            Income,
            false,
            vec![
                detail("Sales Revenue", "Income", Income),
                detail("Service Income", "Income", Income),
            ],
        ),
        group(
            "Expenses",
            None,
            Expense,
            false,
            vec![
                detail("Cost of Goods Sold", "Expenses", Expense),
                detail("Salary Expense", "Expenses", Expense),
                detail("Utilities Expense", "Expenses", Expense),
            ],
        ),
        group(
            "Equity",
            None,
            Equity,
            false,
            vec![
                detail("Share Capital", "Equity", Equity),
                detail("Retained Earnings", "Equity", Equity),
            ],
        ),
    ]
}

/// Opening totals matching [`default_chart`]
pub fn default_balances() -> BalanceMap {
    let totals: [(&str, i64, i64); 15] = [
        ("Cash & Bank", 50_000, 0),
        ("Accounts Receivable", 80_000, 0),
        ("Inventory", 120_000, 0),
        ("Property, Plant & Equipment", 500_000, 0),
        ("Accumulated Depreciation", 0, 100_000),
        ("Accounts Payable", 0, 40_000),
        ("Short-term Debt", 0, 100_000),
        ("Long-term Debt", 0, 200_000),
        ("Sales Revenue", 0, 500_000),
        ("Service Income", 0, 150_000),
        ("Cost of Goods Sold", 300_000, 0),
        ("Salary Expense", 120_000, 0),
        ("Utilities Expense", 50_000, 0),
        ("Share Capital", 0, 500_000),
        ("Retained Earnings", 0, 130_000),
    ];

    totals
        .iter()
        .map(|(name, debit, credit)| {
            (
                name.to_string(),
                AccountBalance::new(*name, Decimal::from(*debit), Decimal::from(*credit)),
            )
        })
        .collect()
}
