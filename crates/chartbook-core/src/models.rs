//! Core data models for the chart of accounts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{AccountKind, RootType};

/// Account as held in the forest
///
/// Parent/child links live in the [`Forest`](crate::Forest) arena, not here,
/// and expand/collapse state lives in [`ViewState`](crate::ViewState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique key across the whole forest
    pub name: String,
    pub root_type: RootType,
    pub kind: AccountKind,
}

impl Account {
    pub fn new(name: impl Into<String>, root_type: RootType, kind: AccountKind) -> Self {
        Self {
            name: name.into(),
            root_type,
            kind,
        }
    }

    /// Create a group account
    pub fn group(name: impl Into<String>, root_type: RootType) -> Self {
        Self::new(name, root_type, AccountKind::Group)
    }

    /// Create a detail (leaf) account
    pub fn detail(name: impl Into<String>, root_type: RootType) -> Self {
        Self::new(name, root_type, AccountKind::Detail)
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }
}

/// Persisted shape of an account, nested the same way the forest is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub name: String,
    #[serde(default)]
    pub parent_account: Option<String>,
    pub root_type: RootType,
    pub account_type: AccountKind,
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AccountRecord>,
    #[serde(default)]
    pub expanded: bool,
}

/// Debit and credit totals for one account, as produced by the ledger feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    #[serde(default)]
    pub account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credit: Decimal,
}

impl AccountBalance {
    pub fn new(account: impl Into<String>, total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            account: account.into(),
            total_debit,
            total_credit,
        }
    }
}

/// Account name -> debit/credit totals; a missing entry means a zero balance
pub type BalanceMap = BTreeMap<String, AccountBalance>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_constructors() {
        let group = Account::group("Assets", RootType::Asset);
        assert!(group.is_group());
        let detail = Account::detail("Cash", RootType::Asset);
        assert!(!detail.is_group());
        assert_eq!(detail.kind, AccountKind::Detail);
    }

    #[test]
    fn test_record_parses_original_layout() {
        let json = r#"{
            "name": "Assets",
            "parentAccount": null,
            "rootType": "Asset",
            "accountType": "Group",
            "isGroup": true,
            "balance": 0,
            "expanded": true,
            "children": [
                {
                    "name": "Cash",
                    "parentAccount": "Assets",
                    "rootType": "Asset",
                    "accountType": "Detail",
                    "isGroup": false,
                    "balance": 50000
                }
            ]
        }"#;
        let record: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Assets");
        assert!(record.expanded);
        assert_eq!(record.children.len(), 1);
        assert_eq!(record.children[0].parent_account.as_deref(), Some("Assets"));
        assert!(!record.children[0].expanded);
    }

    #[test]
    fn test_detail_record_omits_children() {
        let record = AccountRecord {
            name: "Cash".to_string(),
            parent_account: Some("Assets".to_string()),
            root_type: RootType::Asset,
            account_type: AccountKind::Detail,
            is_group: false,
            children: vec![],
            expanded: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("children").is_none());
        assert_eq!(json["accountType"], "Detail");
        assert_eq!(json["parentAccount"], "Assets");
    }

    #[test]
    fn test_balance_accepts_numbers() {
        let json = r#"{ "account": "Cash", "totalDebit": 50000, "totalCredit": 0.5 }"#;
        let balance: AccountBalance = serde_json::from_str(json).unwrap();
        assert_eq!(balance.total_debit, Decimal::from(50000));
        assert_eq!(balance.total_credit, Decimal::new(5, 1));
    }
}
