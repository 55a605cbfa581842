mod support;

use std::sync::Arc;

use polyxchange::engine::dust_sweeper;
use polyxchange::exchange::ExchangeConfigBuilder;
use polyxchange::model::order_book::{MarketOrderBook, OrderBookLine, VolAndPriNbDecimals};
use polyxchange::model::{CurrencyCode, ExchangeName, Market, MonetaryAmount};
use support::{MockPrivateAccount, MockPublicMarketView};

fn btc_eur_book() -> MarketOrderBook {
    let market = Market::new(CurrencyCode::new("BTC"), CurrencyCode::new("EUR"));
    let lines = vec![
        OrderBookLine { amount: "10 BTC".parse().unwrap(), price: "29000 EUR".parse().unwrap(), is_ask: false },
        OrderBookLine { amount: "10 BTC".parse().unwrap(), price: "29100 EUR".parse().unwrap(), is_ask: true },
    ];
    MarketOrderBook::from_lines(market, lines, VolAndPriNbDecimals { volume: 8, price: 2 }).unwrap()
}

#[tokio::test]
async fn sweeps_dust_below_threshold_in_one_pass() {
    let btc = CurrencyCode::new("BTC");

    let mut config_builder = ExchangeConfigBuilder::default();
    config_builder.dust_thresholds(std::iter::once((btc, MonetaryAmount::new(1, 4, btc))).collect::<std::collections::HashMap<_, _>>());
    let config = config_builder.build().unwrap();

    let public = Arc::new(MockPublicMarketView::new(config).with_book(btc_eur_book()));
    let private = Arc::new(MockPrivateAccount::new(ExchangeName::new("mockexchange", "main")).with_balance(MonetaryAmount::new(5, 5, btc)));

    let (trades, final_balance) = dust_sweeper::execute(public, private, btc).await.unwrap();

    assert_eq!(trades.len(), 1);
    assert!(final_balance.is_zero());
}

#[tokio::test]
async fn leaves_balance_untouched_when_no_threshold_configured() {
    let btc = CurrencyCode::new("BTC");
    let config = ExchangeConfigBuilder::default().build().unwrap();
    let public = Arc::new(MockPublicMarketView::new(config).with_book(btc_eur_book()));
    let private = Arc::new(MockPrivateAccount::new(ExchangeName::new("mockexchange", "main")).with_balance(MonetaryAmount::new(5, 5, btc)));

    let (trades, final_balance) = dust_sweeper::execute(public, private, btc).await.unwrap();

    assert!(trades.is_empty());
    assert!(final_balance.is_zero());
}
