use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::engine::single_trade;
use crate::error::Result;
use crate::exchange::private::PrivateAccount;
use crate::exchange::public::PublicMarketView;
use crate::model::balance::BalanceOptions;
use crate::model::currency::CurrencyCode;
use crate::model::market::Market;
use crate::model::monetary::MonetaryAmount;
use crate::model::order::{
    PriceStrategy, TradeOptionsBuilder, TradeResultState, TradeTimeoutAction, TradeTypePolicy, TradedAmounts,
};

/// Bounded number of (sell attempt, priming buy) rounds before giving up on a given currency's
/// dust, chosen so the multiplier sequence 1, 1.5, 2, ... 5.5 gets a fair run without looping
/// forever against an illiquid market.
const MAX_ITERATIONS: u32 = 10;

fn markets_for(tradable: &[Market], cur: CurrencyCode) -> Vec<Market> {
    let mut markets: Vec<Market> = tradable.iter().filter(|m| m.can_trade(cur)).copied().collect();
    markets.sort_by_key(|m| m.opposite(cur).map(|c| c.to_string()).unwrap_or_default());
    markets
}

fn pure_taker_options() -> crate::model::order::TradeOptions {
    TradeOptionsBuilder::default()
        .price_strategy(PriceStrategy::Taker)
        .timeout_action(TradeTimeoutAction::Cancel)
        .type_policy(TradeTypePolicy::ForceSingle)
        .max_trade_time(Duration::from_secs(15))
        .build()
        .expect("static taker options are always valid")
}

/// Iteratively sells off the dust of `cur` on `account`, priming with a small buy on an alternate
/// market when a direct sell isn't viable, per §4.I. Returns the list of trades it made plus the
/// final balance of `cur`.
#[instrument(skip(public, private))]
pub async fn execute(
    public: Arc<dyn PublicMarketView>,
    private: Arc<dyn PrivateAccount>,
    cur: CurrencyCode,
) -> Result<(Vec<TradedAmounts>, MonetaryAmount)> {
    let threshold = match public.exchange_config().dust_threshold(cur) {
        Some(t) => t,
        None => return Ok((Vec::new(), MonetaryAmount::zero(cur))),
    };

    let tradable = public.tradable_markets().await?;
    let markets = markets_for(&tradable, cur);
    let mut trades = Vec::new();
    let mut multiplier = 1.0f64;

    for iteration in 0..MAX_ITERATIONS {
        let balance = private.query_account_balance(BalanceOptions::default()).await?.get(cur);
        if balance >= threshold {
            debug!(iteration, %balance, "dust above threshold, nothing to do");
            return Ok((trades, balance));
        }

        let options = pure_taker_options();
        let mut sold = false;
        for market in &markets {
            let result = single_trade::execute(public.clone(), private.clone(), balance, market.opposite(cur).unwrap(), &options, *market).await?;
            if matches!(result.state(), TradeResultState::Complete) {
                trades.push(result.traded);
                sold = true;
                break;
            }
        }
        if sold {
            let new_balance = private.query_account_balance(BalanceOptions::default()).await?.get(cur);
            debug!(iteration, %new_balance, "direct sell succeeded");
            return Ok((trades, new_balance));
        }

        let prime_amount = MonetaryAmount::from_f64(threshold.to_f64() * multiplier, cur, threshold.nb_decimals().max(8), crate::model::RoundingMode::Up)?;
        let mut primed = false;
        for market in &markets {
            let quote = market.opposite(cur).unwrap();
            let from = prime_amount.convert_to(public.order_book(*market, 5).await?.lowest_ask().unwrap_or(MonetaryAmount::zero(quote)))?;
            if from.is_zero() {
                continue;
            }
            let result = single_trade::execute(public.clone(), private.clone(), from, cur, &options, *market).await?;
            if !result.traded.to.is_zero() {
                trades.push(result.traded);
                primed = true;
                debug!(iteration, %multiplier, "priming buy succeeded");
                break;
            }
        }

        if !primed {
            multiplier += 0.5;
        }
    }

    let final_balance = private.query_account_balance(BalanceOptions::default()).await?.get(cur);
    Ok((trades, final_balance))
}
