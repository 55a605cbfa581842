use std::collections::HashMap;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::model::currency::CurrencyCode;
use crate::model::monetary::MonetaryAmount;
use crate::model::order::FeeType;

/// Whether multi-hop path discovery may cross fiat/stablecoin bridges or must stay on a strict,
/// direct-equivalence path.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PathFindingMode {
    Strict,
    AllowFiatStableCoinBridge,
}

/// Static, per-exchange-account configuration the core reads to make trading decisions: fees,
/// dust thresholds, and a few feature toggles. Built once per account at startup, analogous to
/// the teacher's connection `Properties`.
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ExchangeConfig {
    #[builder(default)]
    pub maker_fee_ratio: f64,
    #[builder(default)]
    pub taker_fee_ratio: f64,
    #[builder(default)]
    pub dust_thresholds: HashMap<CurrencyCode, MonetaryAmount>,
    #[builder(default = "true")]
    pub multi_trade_allowed_by_default: bool,
    #[builder(default)]
    pub place_simulate_real_order: bool,
    #[builder(default)]
    pub preferred_payment_currencies: Vec<CurrencyCode>,
    #[builder(default = "Duration::from_secs(1)")]
    pub api_call_refresh_frequency: Duration,
    #[builder(default = "Duration::from_secs(5)")]
    pub withdraw_refresh_time: Duration,
}

impl ExchangeConfig {
    pub fn apply_fee(&self, amount: MonetaryAmount, fee_type: FeeType) -> MonetaryAmount {
        let ratio = match fee_type {
            FeeType::Maker => self.maker_fee_ratio,
            FeeType::Taker => self.taker_fee_ratio,
        };
        let kept = 1.0 - ratio;
        MonetaryAmount::from_f64(amount.to_f64() * kept, amount.currency_code(), amount.nb_decimals().max(8), crate::model::RoundingMode::Down)
            .unwrap_or(amount)
    }

    pub fn dust_threshold(&self, currency: CurrencyCode) -> Option<MonetaryAmount> {
        self.dust_thresholds.get(&currency).copied()
    }
}
