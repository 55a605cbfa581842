use std::sync::Arc;

use tracing::{debug, instrument};

use crate::engine::single_trade;
use crate::error::Result;
use crate::exchange::config::PathFindingMode;
use crate::exchange::private::PrivateAccount;
use crate::exchange::public::PublicMarketView;
use crate::model::currency::CurrencyCode;
use crate::model::monetary::MonetaryAmount;
use crate::model::order::{TradeOptions, TradeResult, TradeTypePolicy, TradedAmounts};

/// Resolves a multi-market conversion path from `from`'s currency to `to_cur` and chains
/// `single_trade::execute` across each leg, feeding one leg's output into the next's input.
#[instrument(skip(public, private, options))]
pub async fn execute(
    public: Arc<dyn PublicMarketView>,
    private: Arc<dyn PrivateAccount>,
    from: MonetaryAmount,
    to_cur: CurrencyCode,
    options: &TradeOptions,
) -> Result<TradeResult> {
    let multi_allowed = options.is_multi_trade_allowed(public.exchange_config().multi_trade_allowed_by_default)
        || matches!(options.type_policy, TradeTypePolicy::ForceMulti);

    let path = public.find_markets_path(from.currency_code(), to_cur, PathFindingMode::Strict).await?;

    if path.is_empty() {
        return Ok(TradeResult {
            requested_from: from,
            traded: TradedAmounts::zero(from.currency_code(), to_cur),
        });
    }

    if path.len() > 1 && !multi_allowed {
        return Err(crate::error::Error::MultiTradeNotAllowed);
    }

    let mut current = from;
    let mut total = TradedAmounts::zero(from.currency_code(), to_cur);

    for (i, market) in path.iter().enumerate() {
        let leg_to_cur = market.opposite(current.currency_code()).unwrap_or(to_cur);
        debug!(leg = i, %market, %current, "starting multi-trade leg");
        let result = single_trade::execute(public.clone(), private.clone(), current, leg_to_cur, options, *market).await?;
        if result.traded.to.is_zero() {
            debug!(leg = i, "leg yielded zero, aborting remaining path");
            total.from = from - current + result.traded.from;
            return Ok(TradeResult { requested_from: from, traded: total });
        }
        current = result.traded.to;
        if i == 0 {
            total.from = result.traded.from;
        }
    }

    total.to = current;
    Ok(TradeResult { requested_from: from, traded: total })
}
