//! Debit/credit sign convention
//!
//! Raw totals come from an external ledger feed. Turning them into a balance
//! only needs the account's root type: credit-normal accounts report
//! `credit - debit`, debit-normal accounts report `debit - credit`.

use rust_decimal::Decimal;
use serde::Serialize;

use chartbook_config::{CurrencyConfig, SymbolPosition};
use chartbook_utils::format_amount;

use crate::forest::{AccountId, Forest};
use crate::models::BalanceMap;
use crate::types::RootType;

/// A balance together with the side it is normally reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignedBalance {
    pub amount: Decimal,
    pub is_credit: bool,
}

impl SignedBalance {
    pub fn zero(root_type: RootType) -> Self {
        Self {
            amount: Decimal::ZERO,
            is_credit: root_type.is_credit_normal(),
        }
    }

    /// Apply the convention of `root_type` to raw totals
    pub fn from_totals(root_type: RootType, total_debit: Decimal, total_credit: Decimal) -> Self {
        let is_credit = root_type.is_credit_normal();
        let amount = if is_credit {
            total_credit - total_debit
        } else {
            total_debit - total_credit
        };
        Self { amount, is_credit }
    }

    pub fn suffix(&self) -> &'static str {
        if self.is_credit {
            "Cr."
        } else {
            "Dr."
        }
    }

    /// Render as `$50,000.00 Dr.`; the magnitude is shown, the side is in the suffix
    pub fn display(&self, currency: &CurrencyConfig) -> String {
        let number = format_amount(
            self.amount.abs(),
            currency.decimal_places,
            &currency.thousands_separator,
            &currency.decimal_separator,
        );
        match currency.symbol_position {
            SymbolPosition::Before => format!("{}{} {}", currency.symbol, number, self.suffix()),
            SymbolPosition::After => format!("{} {} {}", number, currency.symbol, self.suffix()),
        }
    }
}

/// Resolves balances out of a name -> totals map
#[derive(Debug, Clone, Copy)]
pub struct BalanceResolver<'a> {
    balances: &'a BalanceMap,
}

impl<'a> BalanceResolver<'a> {
    pub fn new(balances: &'a BalanceMap) -> Self {
        Self { balances }
    }

    /// Balance of a single account; no feed entry means zero
    pub fn resolve(&self, name: &str, root_type: RootType) -> SignedBalance {
        match self.balances.get(name) {
            Some(b) => SignedBalance::from_totals(root_type, b.total_debit, b.total_credit),
            None => SignedBalance::zero(root_type),
        }
    }

    /// Own balance plus the balances of every descendant, all under the
    /// convention of `id`'s root type
    pub fn rollup(&self, forest: &Forest, id: AccountId) -> SignedBalance {
        let Some(account) = forest.get(id) else {
            return SignedBalance::zero(RootType::Asset);
        };
        let root_type = account.root_type;
        let own = self.resolve(&account.name, root_type).amount;
        let amount = forest
            .descendants(id)
            .into_iter()
            .filter_map(|d| forest.get(d))
            .map(|d| self.resolve(&d.name, root_type).amount)
            .fold(own, |acc, x| acc + x);
        SignedBalance {
            amount,
            is_credit: root_type.is_credit_normal(),
        }
    }
}
