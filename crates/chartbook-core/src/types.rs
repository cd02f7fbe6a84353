//! Basic types for the chart of accounts

use serde::{Deserialize, Serialize};

/// Top-level financial category of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootType {
    /// Cash, receivables, inventory, fixed assets
    Asset,
    /// Payables and debt
    Liability,
    /// Revenue
    Income,
    /// Costs
    Expense,
    /// Owner's equity
    Equity,
}

impl RootType {
    pub const ALL: [RootType; 5] = [
        RootType::Asset,
        RootType::Liability,
        RootType::Income,
        RootType::Expense,
        RootType::Equity,
    ];

    /// Whether a positive balance is conventionally a credit.
    ///
    /// This is the only place the debit/credit convention is decided; the
    /// signed amount and the Dr./Cr. suffix are both derived from it.
    pub fn is_credit_normal(self) -> bool {
        matches!(
            self,
            RootType::Liability | RootType::Income | RootType::Equity
        )
    }
}

impl std::str::FromStr for RootType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" | "assets" => Ok(RootType::Asset),
            "liability" | "liabilities" => Ok(RootType::Liability),
            "income" => Ok(RootType::Income),
            "expense" | "expenses" => Ok(RootType::Expense),
            "equity" => Ok(RootType::Equity),
            _ => Err(format!("Invalid root type: {}", s)),
        }
    }
}

impl std::fmt::Display for RootType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootType::Asset => write!(f, "Asset"),
            RootType::Liability => write!(f, "Liability"),
            RootType::Income => write!(f, "Income"),
            RootType::Expense => write!(f, "Expense"),
            RootType::Equity => write!(f, "Equity"),
        }
    }
}

/// Whether an account organizes children or carries postings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    /// Non-leaf account; may have any number of children
    Group,
    /// Leaf account; never has children
    Detail,
}

impl AccountKind {
    pub fn is_group(self) -> bool {
        self == AccountKind::Group
    }
}

impl Default for AccountKind {
    fn default() -> Self {
        AccountKind::Detail
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "group" => Ok(AccountKind::Group),
            "detail" | "ledger" => Ok(AccountKind::Detail),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Group => write!(f, "Group"),
            AccountKind::Detail => write!(f, "Detail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_normal_classification() {
        assert!(RootType::Liability.is_credit_normal());
        assert!(RootType::Income.is_credit_normal());
        assert!(RootType::Equity.is_credit_normal());
        assert!(!RootType::Asset.is_credit_normal());
        assert!(!RootType::Expense.is_credit_normal());
    }

    #[test]
    fn test_root_type_from_str() {
        assert_eq!("assets".parse::<RootType>().unwrap(), RootType::Asset);
        assert_eq!("Liability".parse::<RootType>().unwrap(), RootType::Liability);
        assert_eq!("EXPENSES".parse::<RootType>().unwrap(), RootType::Expense);
        assert!("capital".parse::<RootType>().is_err());
    }

    #[test]
    fn test_root_type_serde_names() {
        assert_eq!(serde_json::to_string(&RootType::Equity).unwrap(), "\"Equity\"");
        let parsed: RootType = serde_json::from_str("\"Income\"").unwrap();
        assert_eq!(parsed, RootType::Income);
    }

    #[test]
    fn test_account_kind() {
        assert!(AccountKind::Group.is_group());
        assert!(!AccountKind::Detail.is_group());
        assert_eq!("group".parse::<AccountKind>().unwrap(), AccountKind::Group);
        assert_eq!(AccountKind::Detail.to_string(), "Detail");
    }
}
