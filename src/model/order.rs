use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::currency::CurrencyCode;
use crate::model::market::{Market, TradeSide};
use crate::model::monetary::MonetaryAmount;

/// Opaque per-exchange order identifier.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PriceStrategy {
    Maker,
    Nibble,
    Taker,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TradeTimeoutAction {
    Cancel,
    ForceMatch,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TradeMode {
    Real,
    Simulation,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TradeSyncPolicy {
    Synchronous,
    Asynchronous,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TradeTypePolicy {
    Default,
    ForceMulti,
    ForceSingle,
}

/// The fee an `applyFee` call subtracts; maker orders generally have a lower fee than taker.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FeeType {
    Maker,
    Taker,
}

#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TradeOptions {
    #[builder(default = "PriceStrategy::Maker")]
    pub price_strategy: PriceStrategy,
    #[builder(default = "TradeTimeoutAction::Cancel")]
    pub timeout_action: TradeTimeoutAction,
    #[builder(default = "TradeMode::Real")]
    pub mode: TradeMode,
    #[builder(default = "Duration::from_secs(30)")]
    pub max_trade_time: Duration,
    #[builder(default = "Duration::from_secs(5)")]
    pub min_time_between_price_updates: Duration,
    #[builder(default = "TradeTypePolicy::Default")]
    pub type_policy: TradeTypePolicy,
    #[builder(default = "TradeSyncPolicy::Synchronous")]
    pub sync_policy: TradeSyncPolicy,
    #[builder(default)]
    pub fixed_price: Option<MonetaryAmount>,
    #[builder(default)]
    pub relative_price: Option<f64>,
}

impl TradeOptionsBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(Some(rel)) = self.relative_price {
            if rel == 0.0 {
                return Err("relativePrice must be nonzero when set".into());
            }
        }
        Ok(())
    }
}

impl TradeOptions {
    /// The portion of `maxTradeTime` reserved for the emergency fallback, a small derived
    /// fraction rather than a user-supplied knob.
    pub fn emergency_buffer(&self) -> Duration {
        self.max_trade_time / 10
    }

    pub fn is_multi_trade_allowed(&self, allowed_by_default: bool) -> bool {
        match self.type_policy {
            TradeTypePolicy::ForceMulti => true,
            TradeTypePolicy::ForceSingle => false,
            TradeTypePolicy::Default => allowed_by_default,
        }
    }
}

/// (Market, side, per-order user reference). `user_ref` is derived from the placement time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TradeContext {
    pub market: Market,
    pub side: TradeSide,
    pub user_ref: i64,
}

impl TradeContext {
    pub fn new(market: Market, side: TradeSide, placed_at_unix_secs: i64) -> Self {
        Self {
            market,
            side,
            user_ref: placed_at_unix_secs,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeInfo {
    pub context: TradeContext,
    pub options: TradeOptions,
}

/// (from consumed, to received). Invariant: both non-negative, currencies match the leg.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TradedAmounts {
    pub from: MonetaryAmount,
    pub to: MonetaryAmount,
}

impl TradedAmounts {
    pub fn zero(from_currency: CurrencyCode, to_currency: CurrencyCode) -> Self {
        Self {
            from: MonetaryAmount::zero(from_currency),
            to: MonetaryAmount::zero(to_currency),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.from.is_neg() || self.to.is_neg() {
            return Err(Error::InvalidAmount("traded amounts must be non-negative".into()));
        }
        Ok(())
    }

    pub fn accumulate(&mut self, other: &TradedAmounts) {
        self.from += other.from;
        self.to += other.to;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub traded: TradedAmounts,
    pub is_closed: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderInfo {
    pub info: OrderInfo,
    pub order_id: OrderId,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TradeResultState {
    Complete,
    Partial,
    Untouched,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub requested_from: MonetaryAmount,
    pub traded: TradedAmounts,
}

impl TradeResult {
    pub fn state(&self) -> TradeResultState {
        if self.traded.from.is_zero() {
            TradeResultState::Untouched
        } else if self.requested_from <= self.traded.from {
            TradeResultState::Complete
        } else {
            TradeResultState::Partial
        }
    }
}
