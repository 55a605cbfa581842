use async_trait::async_trait;

use crate::exchange::config::{ExchangeConfig, PathFindingMode};
use crate::model::currency::CurrencyCode;
use crate::model::market::Market;
use crate::model::monetary::MonetaryAmount;
use crate::model::order_book::MarketOrderBook;
use crate::Result;

/// Read-only market data, consumed by every component above it (SingleTrade, MultiTrade, the
/// Orchestrator, the dust sweeper). Every method is load-bearing: unlike the teacher's `Exchange`
/// trait, there is no default `NotImplemented` body to fall back on.
#[async_trait]
pub trait PublicMarketView: Send + Sync {
    async fn tradable_markets(&self) -> Result<Vec<Market>>;

    async fn order_book(&self, market: Market, depth: u32) -> Result<MarketOrderBook>;

    /// Convert `amount` into `target` using current market prices, without walking a specific
    /// order book (used for coarse end-amount estimates).
    async fn average_convert(&self, amount: MonetaryAmount, target: CurrencyCode) -> Result<MonetaryAmount>;

    /// Shortest sequence of markets connecting `from` to `to`, empty if they are the same
    /// currency, `Err(ConversionPathUnavailable)` if no path exists under `mode`.
    async fn find_markets_path(&self, from: CurrencyCode, to: CurrencyCode, mode: PathFindingMode) -> Result<Vec<Market>>;

    async fn withdraw_fee(&self, currency: CurrencyCode) -> Result<MonetaryAmount>;

    fn exchange_config(&self) -> &ExchangeConfig;
}

#[cfg(test)]
mod test {
    // Coverage for path-finding and conversion lives in `tests/` against the mock implementation,
    // since a real exercise of this trait needs a populated market graph.
}
