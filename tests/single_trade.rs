mod support;

use std::sync::Arc;
use std::time::Duration;

use polyxchange::engine::single_trade;
use polyxchange::exchange::ExchangeConfigBuilder;
use polyxchange::model::order::{TradeOptionsBuilder, TradeResultState};
use polyxchange::model::order_book::{MarketOrderBook, OrderBookLine, VolAndPriNbDecimals};
use polyxchange::model::{CurrencyCode, ExchangeName, Market, MonetaryAmount};
use support::{MockPrivateAccount, MockPublicMarketView};

fn btc_eur_book() -> MarketOrderBook {
    let market = Market::new(CurrencyCode::new("BTC"), CurrencyCode::new("EUR"));
    let lines = vec![
        OrderBookLine { amount: "1 BTC".parse().unwrap(), price: "29000 EUR".parse().unwrap(), is_ask: false },
        OrderBookLine { amount: "2 BTC".parse().unwrap(), price: "29100 EUR".parse().unwrap(), is_ask: true },
    ];
    MarketOrderBook::from_lines(market, lines, VolAndPriNbDecimals { volume: 8, price: 2 }).unwrap()
}

#[tokio::test]
async fn maker_sell_fills_immediately() {
    let eur = CurrencyCode::new("EUR");
    let btc = CurrencyCode::new("BTC");
    let market = Market::new(btc, eur);

    let config = ExchangeConfigBuilder::default().build().unwrap();
    let public = Arc::new(MockPublicMarketView::new(config).with_book(btc_eur_book()));
    let private = Arc::new(MockPrivateAccount::new(ExchangeName::new("mockexchange", "main")).with_balance(MonetaryAmount::new(1, 0, btc)));

    let options = TradeOptionsBuilder::default().build().unwrap();
    let from = MonetaryAmount::new(1, 0, btc);

    let result = single_trade::execute(public, private, from, eur, &options, market).await.unwrap();

    assert_eq!(result.state(), TradeResultState::Complete);
    assert_eq!(result.traded.from, from);
    assert!(result.traded.to > MonetaryAmount::zero(eur));
}

#[tokio::test(start_paused = true)]
async fn taker_buy_reposts_then_closes_through_poll_loop() {
    let eur = CurrencyCode::new("EUR");
    let btc = CurrencyCode::new("BTC");
    let market = Market::new(btc, eur);

    let config = ExchangeConfigBuilder::default().build().unwrap();
    let public = Arc::new(MockPublicMarketView::new(config).with_book(btc_eur_book()));
    let private = Arc::new(
        MockPrivateAccount::new(ExchangeName::new("mockexchange", "main"))
            .with_balance(MonetaryAmount::new(29100, 0, eur))
            .with_fills_after_polls(2),
    );

    let options = TradeOptionsBuilder::default()
        .min_time_between_price_updates(Duration::from_millis(10))
        .max_trade_time(Duration::from_secs(5))
        .build()
        .unwrap();
    let from = MonetaryAmount::new(29100, 0, eur);

    let result = single_trade::execute(public, private, from, btc, &options, market).await.unwrap();

    assert_eq!(result.state(), TradeResultState::Complete);
    assert_eq!(result.traded.from, from);
    assert!(result.traded.to > MonetaryAmount::zero(btc));
}
