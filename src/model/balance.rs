use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::currency::CurrencyCode;
use crate::model::monetary::MonetaryAmount;

/// Whether a balance query should fold in amounts currently tied up in open orders, and whether
/// to compute a portfolio-wide equivalent in a reference currency.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BalanceOptions {
    pub include_in_use: bool,
    pub equivalent_currency: Option<CurrencyCode>,
}

/// At most one entry per currency. Iterates in currency order for JSON; callers that want the
/// "richest currency first" ordering for human-facing reports should sort by `equivalent_value`
/// themselves once it's populated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalancePortfolio {
    balances: BTreeMap<CurrencyCode, MonetaryAmount>,
    equivalent: Option<MonetaryAmount>,
}

impl BalancePortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, amount: MonetaryAmount) {
        self.balances.insert(amount.currency_code(), amount);
    }

    pub fn get(&self, currency: CurrencyCode) -> MonetaryAmount {
        self.balances.get(&currency).copied().unwrap_or_else(|| MonetaryAmount::zero(currency))
    }

    pub fn currencies(&self) -> impl Iterator<Item = CurrencyCode> + '_ {
        self.balances.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn set_equivalent(&mut self, equivalent: MonetaryAmount) {
        self.equivalent = Some(equivalent);
    }

    pub fn equivalent(&self) -> Option<MonetaryAmount> {
        self.equivalent
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &MonetaryAmount)> {
        self.balances.iter()
    }
}
