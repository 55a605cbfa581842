use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::currency::CurrencyCode;
use crate::model::market::Market;
use crate::model::monetary::MonetaryAmount;

/// Declares how many decimals volumes and prices carry on a given market, so a book built from
/// raw ticker data can be sanitized to the exchange's real precision.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolAndPriNbDecimals {
    pub volume: u32,
    pub price: u32,
}

/// One level of externally-supplied depth: a volume of base currency available at `price`, on
/// the ask side if `is_ask`, the bid side otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLine {
    pub amount: MonetaryAmount,
    pub price: MonetaryAmount,
    pub is_ask: bool,
}

/// An immutable snapshot of a market's price ladder. Internally stored as (price, signed volume)
/// pairs sorted ascending by price: positive volume is a bid, negative volume is an ask. Per the
/// invariant every bid price is strictly below every ask price, and every price level appears at
/// most once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketOrderBook {
    market: Market,
    decimals: VolAndPriNbDecimals,
    // (price, signed base volume), ascending by price.
    levels: Vec<(MonetaryAmount, MonetaryAmount)>,
    first_ask_index: usize,
}

impl MarketOrderBook {
    pub fn from_lines(market: Market, lines: impl IntoIterator<Item = OrderBookLine>, decimals: VolAndPriNbDecimals) -> Result<Self> {
        let mut levels: Vec<(MonetaryAmount, MonetaryAmount)> = Vec::new();
        for line in lines {
            if levels.iter().any(|(p, _)| *p == line.price) {
                return Err(Error::InvalidAmount(format!("duplicate order book price {}", line.price)));
            }
            let signed = if line.is_ask { -line.amount } else { line.amount };
            levels.push((line.price, signed));
        }
        levels.sort_by(|a, b| a.0.cmp(&b.0));

        let first_ask_index = levels.iter().position(|(_, v)| v.is_neg()).unwrap_or(levels.len());
        if let (Some(last_bid), Some(first_ask)) = (
            first_ask_index.checked_sub(1).and_then(|i| levels.get(i)),
            levels.get(first_ask_index),
        ) {
            if last_bid.0 >= first_ask.0 {
                return Err(Error::InvalidAmount("bid prices must be strictly below ask prices".into()));
            }
        }

        Ok(Self {
            market,
            decimals,
            levels,
            first_ask_index,
        })
    }

    /// Builds a synthetic book around a ticker's top-of-book, simulating `depth` levels on each
    /// side with a uniform price step of `ask_price - bid_price` and a volume step equal to the
    /// midpoint of `bid_volume` and `-ask_volume`.
    pub fn from_ticker(
        market: Market,
        ask_price: MonetaryAmount,
        ask_volume: MonetaryAmount,
        bid_price: MonetaryAmount,
        bid_volume: MonetaryAmount,
        decimals: VolAndPriNbDecimals,
        depth: u32,
    ) -> Result<Self> {
        let step_price = (ask_price.to_f64() - bid_price.to_f64()).abs();
        let step_volume = (bid_volume.to_f64() - ask_volume.to_f64()) / 2.0;
        let mode = crate::model::monetary::RoundingMode::Nearest;
        let mut lines = Vec::with_capacity(depth as usize * 2);
        for i in 0..depth {
            let i = i as f64;
            let bid_p = MonetaryAmount::from_f64(bid_price.to_f64() - step_price * i, bid_price.currency_code(), decimals.price, mode)?;
            let bid_v = MonetaryAmount::from_f64(bid_volume.to_f64() + step_volume * i, bid_volume.currency_code(), decimals.volume, mode)?;
            if !bid_v.is_zero() {
                lines.push(OrderBookLine {
                    amount: bid_v,
                    price: bid_p,
                    is_ask: false,
                });
            }
            let ask_p = MonetaryAmount::from_f64(ask_price.to_f64() + step_price * i, ask_price.currency_code(), decimals.price, mode)?;
            let ask_v = MonetaryAmount::from_f64(ask_volume.to_f64() + step_volume * i, ask_volume.currency_code(), decimals.volume, mode)?;
            if !ask_v.is_zero() {
                lines.push(OrderBookLine {
                    amount: ask_v,
                    price: ask_p,
                    is_ask: true,
                });
            }
        }
        Self::from_lines(market, lines, decimals)
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn decimals(&self) -> VolAndPriNbDecimals {
        self.decimals
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn bids(&self) -> &[(MonetaryAmount, MonetaryAmount)] {
        &self.levels[..self.first_ask_index]
    }

    fn asks(&self) -> &[(MonetaryAmount, MonetaryAmount)] {
        &self.levels[self.first_ask_index..]
    }

    pub fn highest_bid(&self) -> Option<MonetaryAmount> {
        self.bids().last().map(|(p, _)| *p)
    }

    pub fn lowest_ask(&self) -> Option<MonetaryAmount> {
        self.asks().first().map(|(p, _)| *p)
    }

    pub fn average_price(&self) -> Option<MonetaryAmount> {
        let bid = self.highest_bid()?;
        let ask = self.lowest_ask()?;
        Some((bid + ask) / MonetaryAmount::new(2, 0, CurrencyCode::neutral()))
    }

    pub fn compute_cumul_amount_bought_immediately_at(&self, price: MonetaryAmount) -> MonetaryAmount {
        self.asks()
            .iter()
            .take_while(|(p, _)| *p <= price)
            .fold(MonetaryAmount::zero(CurrencyCode::neutral()), |acc, (_, v)| acc + (-*v))
    }

    pub fn compute_cumul_amount_sold_immediately_at(&self, price: MonetaryAmount) -> MonetaryAmount {
        self.bids()
            .iter()
            .rev()
            .take_while(|(p, _)| *p >= price)
            .fold(MonetaryAmount::zero(CurrencyCode::neutral()), |acc, (_, v)| acc + *v)
    }

    /// Walks the ask side from the best price outward until `amount` of base currency would be
    /// bought, returning the worst price touched. `None` if the book lacks enough liquidity.
    pub fn compute_max_price_at_which_amount_would_be_bought_immediately(&self, amount: MonetaryAmount) -> Option<MonetaryAmount> {
        let mut remaining = amount;
        for (price, vol) in self.asks() {
            let available = -*vol;
            if available >= remaining {
                return Some(*price);
            }
            remaining -= available;
        }
        None
    }

    /// Symmetric to the bought-side query: walks the bid side from the best price outward.
    pub fn compute_max_price_at_which_amount_would_be_sold_immediately(&self, amount: MonetaryAmount) -> Option<MonetaryAmount> {
        let mut remaining = amount;
        for (price, vol) in self.bids().iter().rev() {
            if *vol >= remaining {
                return Some(*price);
            }
            remaining -= *vol;
        }
        None
    }

    /// Volume-weighted average price a taker would get filling `amount`. If `amount` is
    /// denominated in the base currency this simulates a market sell (walks the bid side); if
    /// denominated in the quote currency it simulates a market buy (walks the ask side,
    /// accumulating `price * volume` until the quote budget is exhausted).
    pub fn compute_avg_price_for_taker_amount(&self, amount: MonetaryAmount) -> Option<MonetaryAmount> {
        if amount.currency_code() == self.market.base() {
            let mut remaining = amount;
            let mut quote_total = MonetaryAmount::zero(CurrencyCode::neutral());
            let mut base_total = MonetaryAmount::zero(CurrencyCode::neutral());
            for (price, vol) in self.bids().iter().rev() {
                if remaining.is_zero() {
                    break;
                }
                let take = if *vol < remaining { *vol } else { remaining };
                quote_total += take.convert_to(*price).ok()?.to_neutral();
                base_total += take;
                remaining -= take;
            }
            if !remaining.is_zero() || base_total.is_zero() {
                return None;
            }
            Some((quote_total / base_total.to_neutral()).truncate(18))
        } else {
            let mut remaining_quote = amount;
            let mut quote_spent = MonetaryAmount::zero(CurrencyCode::neutral());
            let mut base_bought = MonetaryAmount::zero(CurrencyCode::neutral());
            for (price, vol) in self.asks() {
                if remaining_quote.is_zero() {
                    break;
                }
                let level_quote_value = (-*vol).convert_to(*price).ok()?.to_neutral();
                let take_quote = if level_quote_value < remaining_quote { level_quote_value } else { remaining_quote };
                let take_base = (take_quote / price.to_neutral()).truncate(18);
                quote_spent += take_quote;
                base_bought += take_base;
                remaining_quote -= take_quote;
            }
            if !remaining_quote.is_zero() || base_bought.is_zero() {
                return None;
            }
            Some((quote_spent / base_bought).truncate(18))
        }
    }

    /// Quick conversion using the simple bid/ask midpoint, rather than walking the book.
    pub fn convert_at_avg_price(&self, amount: MonetaryAmount) -> Option<MonetaryAmount> {
        let avg = self.average_price()?;
        if amount.currency_code() == self.market.base() {
            Some(amount.convert_to(avg).ok()?)
        } else {
            Some((amount.to_neutral() / avg.to_neutral()).truncate(18))
        }
    }

    pub fn convert_base_to_quote(&self, amount: MonetaryAmount) -> Option<MonetaryAmount> {
        self.convert_at_avg_price(amount)
    }

    pub fn convert_quote_to_base(&self, amount: MonetaryAmount) -> Option<MonetaryAmount> {
        let avg = self.average_price()?;
        Some((amount.to_neutral() / avg.to_neutral()).truncate(18))
    }
}
