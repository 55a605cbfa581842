use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::exchange::public::PublicMarketView;
use crate::exchange::private::PrivateAccount;
use crate::model::currency::CurrencyCode;
use crate::model::market::{Market, TradeSide};
use crate::model::monetary::MonetaryAmount;
use crate::model::order::{
    FeeType, PriceStrategy, TradeContext, TradeInfo, TradeMode, TradeOptions, TradeResult, TradeSyncPolicy,
    TradeTimeoutAction, TradedAmounts,
};

fn trade_side(from_currency: CurrencyCode, market: Market) -> TradeSide {
    if from_currency == market.quote() {
        TradeSide::Buy
    } else {
        TradeSide::Sell
    }
}

fn user_ref() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn compute_price(public: &dyn PublicMarketView, market: Market, strategy: PriceStrategy, from: MonetaryAmount) -> Result<MonetaryAmount> {
    let book = public.order_book(market, 20).await?;
    let price = match strategy {
        PriceStrategy::Taker => book.compute_avg_price_for_taker_amount(from),
        PriceStrategy::Maker | PriceStrategy::Nibble => book.average_price(),
    };
    price.ok_or_else(|| Error::MarketNotFound(format!("no liquidity on {market}")))
}

fn compute_volume(from: MonetaryAmount, price: MonetaryAmount, market: Market) -> Result<MonetaryAmount> {
    if from.currency_code() == market.quote() {
        Ok((from.to_neutral() / price.to_neutral()).truncate(18))
    } else {
        Ok(from)
    }
}

fn price_moved_against_us(side: TradeSide, last: MonetaryAmount, new_price: MonetaryAmount) -> bool {
    match side {
        TradeSide::Sell => new_price < last,
        TradeSide::Buy => new_price > last,
    }
}

/// Drives one (from, to, market) leg to completion under `options`'s deadline, per the Compute /
/// Placed / Closed state machine: initial placement, then a poll loop that reposts on adverse
/// price moves and falls back to a taker order once the emergency buffer is reached.
#[instrument(skip(public, private, options), fields(market = %market))]
pub async fn execute(
    public: Arc<dyn PublicMarketView>,
    private: Arc<dyn PrivateAccount>,
    from: MonetaryAmount,
    to_cur: CurrencyCode,
    options: &TradeOptions,
    market: Market,
) -> Result<TradeResult> {
    let side = trade_side(from.currency_code(), market);
    let start = Instant::now();
    let mut remaining = from;
    let mut traded = TradedAmounts::zero(from.currency_code(), to_cur);

    let mut strategy = options.price_strategy;
    let mut price = compute_price(public.as_ref(), market, strategy, remaining).await?;
    let mut volume = compute_volume(remaining, price, market)?;

    if matches!(options.mode, TradeMode::Simulation) && !private.is_simulated_order_supported() && !public.exchange_config().place_simulate_real_order {
        let fee_type = match strategy {
            PriceStrategy::Taker => FeeType::Taker,
            _ => FeeType::Maker,
        };
        let gross_to = if from.currency_code() == market.quote() {
            volume
        } else {
            volume.convert_to(price)?
        };
        let net_to = public.exchange_config().apply_fee(gross_to, fee_type);
        traded.from += remaining;
        traded.to += net_to;
        debug!(?traded, "simulated fill, order never placed");
        traded.validate()?;
        return Ok(TradeResult { requested_from: from, traded });
    }

    let context = TradeContext::new(market, side, user_ref());
    let info = TradeInfo { context, options: options.clone() };
    let mut placed = private.place_order(remaining, volume, price, info).await?;
    traded.accumulate(&placed.info.traded);
    remaining -= placed.info.traded.from;

    if placed.info.is_closed || matches!(options.sync_policy, TradeSyncPolicy::Asynchronous) {
        debug!(order_id = %placed.order_id, closed = placed.info.is_closed, "single trade leg done after initial placement");
        traded.validate()?;
        return Ok(TradeResult { requested_from: from, traded });
    }

    let mut last_price = price;
    let mut last_price_update = Instant::now();
    let emergency_buffer = options.emergency_buffer();

    loop {
        tokio::time::sleep(options.min_time_between_price_updates.min(Duration::from_secs(1))).await;

        let info_snapshot = private.query_order_info(&placed.order_id, context).await?;
        if info_snapshot.info.is_closed {
            traded.accumulate(&info_snapshot.info.traded.sub_delta(&placed.info.traded));
            placed.info = info_snapshot.info;
            debug!(order_id = %placed.order_id, "order closed while polling");
            break;
        }
        placed.info = info_snapshot.info;

        let elapsed = start.elapsed();
        let reached_emergency_time = elapsed + emergency_buffer > options.max_trade_time;

        let mut update_price_needed = false;
        if !reached_emergency_time && last_price_update.elapsed() > options.min_time_between_price_updates {
            let new_price = compute_price(public.as_ref(), market, strategy, remaining).await?;
            if price_moved_against_us(side, last_price, new_price) {
                update_price_needed = true;
                last_price = new_price;
            }
            last_price_update = Instant::now();
        }

        if reached_emergency_time || update_price_needed {
            let cancel_info = private.cancel_order(&placed.order_id, context).await?;
            let delta = cancel_info.info.traded.sub_delta(&placed.info.traded);
            traded.accumulate(&delta);
            remaining -= delta.from;
            debug!(order_id = %placed.order_id, %remaining, "order cancelled for reprice or deadline");

            if remaining.is_zero() {
                break;
            }

            if reached_emergency_time && elapsed > options.max_trade_time {
                break;
            }

            if reached_emergency_time && matches!(options.timeout_action, TradeTimeoutAction::ForceMatch) {
                strategy = PriceStrategy::Taker;
                let taker_price = compute_price(public.as_ref(), market, strategy, remaining).await?;
                let taker_volume = compute_volume(remaining, taker_price, market)?;
                let taker_info = TradeInfo { context, options: options.clone() };
                placed = private.place_order(remaining, taker_volume, taker_price, taker_info).await?;
                traded.accumulate(&placed.info.traded);
                remaining -= placed.info.traded.from;
                debug!(order_id = %placed.order_id, "emergency taker order placed");
                if placed.info.is_closed {
                    break;
                }
            } else {
                last_price = compute_price(public.as_ref(), market, strategy, remaining).await?;
                volume = compute_volume(remaining, last_price, market)?;
                let repost_info = TradeInfo { context, options: options.clone() };
                placed = private.place_order(remaining, volume, last_price, repost_info).await?;
                traded.accumulate(&placed.info.traded);
                remaining -= placed.info.traded.from;
                debug!(order_id = %placed.order_id, "order reposted at updated price");
                if placed.info.is_closed {
                    break;
                }
            }
        }

        if reached_emergency_time && elapsed > options.max_trade_time {
            break;
        }
    }

    traded.validate()?;
    Ok(TradeResult { requested_from: from, traded })
}

impl TradedAmounts {
    /// `self` is assumed to be a later cumulative snapshot of the same order than `previous`;
    /// returns the amounts traded since then.
    fn sub_delta(&self, previous: &TradedAmounts) -> TradedAmounts {
        TradedAmounts {
            from: self.from - previous.from,
            to: self.to - previous.to,
        }
    }
}
