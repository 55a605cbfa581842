use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use polyxchange::error::{Error, Result};
use polyxchange::exchange::{ExchangeConfig, PathFindingMode, PrivateAccount, PublicMarketView};
use polyxchange::model::{
    BalanceOptions, BalancePortfolio, CurrencyCode, DeliveredWithdrawInfo, DepositsConstraints, ExchangeName,
    InitiatedWithdrawInfo, Market, MarketOrderBook, MonetaryAmount, OrderId, OrdersConstraints, PlaceOrderInfo,
    RecentDeposit, ReceivedWithdrawInfo, SentWithdrawInfo, TradeContext, TradeInfo, TradeSide, TradedAmounts, Wallet,
    WithdrawStatus, WithdrawsConstraints, OrderInfo,
};
use polyxchange::model::withdraw::select_closest_recent_deposit;

/// A static graph of order books, queryable the way a real exchange's public endpoints would be.
pub struct MockPublicMarketView {
    config: ExchangeConfig,
    books: HashMap<Market, MarketOrderBook>,
}

impl MockPublicMarketView {
    pub fn new(config: ExchangeConfig) -> Self {
        Self { config, books: HashMap::new() }
    }

    pub fn with_book(mut self, book: MarketOrderBook) -> Self {
        self.books.insert(book.market(), book);
        self
    }

    fn neighbors(&self, cur: CurrencyCode) -> impl Iterator<Item = Market> + '_ {
        self.books.keys().copied().filter(move |m| m.can_trade(cur))
    }
}

#[async_trait]
impl PublicMarketView for MockPublicMarketView {
    async fn tradable_markets(&self) -> Result<Vec<Market>> {
        Ok(self.books.keys().copied().collect())
    }

    async fn order_book(&self, market: Market, _depth: u32) -> Result<MarketOrderBook> {
        self.books.get(&market).cloned().ok_or_else(|| Error::MarketNotFound(market.to_string()))
    }

    async fn average_convert(&self, amount: MonetaryAmount, target: CurrencyCode) -> Result<MonetaryAmount> {
        for market in self.neighbors(amount.currency_code()) {
            if market.can_trade(target) {
                let book = &self.books[&market];
                if let Some(converted) = book.convert_at_avg_price(amount) {
                    return Ok(converted);
                }
            }
        }
        Err(Error::ConversionPathUnavailable {
            from: amount.currency_code().to_string(),
            to: target.to_string(),
        })
    }

    async fn find_markets_path(&self, from: CurrencyCode, to: CurrencyCode, _mode: PathFindingMode) -> Result<Vec<Market>> {
        if from == to {
            return Ok(Vec::new());
        }
        let mut visited = HashSet::new();
        visited.insert(from);
        let mut queue: VecDeque<(CurrencyCode, Vec<Market>)> = VecDeque::new();
        queue.push_back((from, Vec::new()));

        while let Some((cur, path)) = queue.pop_front() {
            for market in self.neighbors(cur) {
                let next = market.opposite(cur).expect("neighbors() only yields markets touching cur");
                if next == to {
                    let mut full = path.clone();
                    full.push(market);
                    return Ok(full);
                }
                if visited.insert(next) {
                    let mut extended = path.clone();
                    extended.push(market);
                    queue.push_back((next, extended));
                }
            }
        }
        Err(Error::ConversionPathUnavailable {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    async fn withdraw_fee(&self, currency: CurrencyCode) -> Result<MonetaryAmount> {
        Ok(MonetaryAmount::zero(currency))
    }

    fn exchange_config(&self) -> &ExchangeConfig {
        &self.config
    }
}

struct MockState {
    balances: BalancePortfolio,
    next_id: u64,
    withdraws: HashMap<String, SentWithdrawInfo>,
    recent_deposits: Vec<RecentDeposit>,
    deposit_wallet: Option<Wallet>,
    /// When set, `place_order` leaves the order open on its first call for this many calls,
    /// to exercise `single_trade`'s poll loop instead of always closing on the initial placement.
    fills_after_polls: u32,
    open_orders: HashMap<OrderId, (TradedAmounts, u32)>,
}

/// A signed account interface that fills orders immediately at the quoted price, unless
/// configured via `fills_after_polls` to stay open for a few `query_order_info` cycles first.
pub struct MockPrivateAccount {
    name: ExchangeName,
    state: Mutex<MockState>,
    simulated_order_supported: bool,
}

impl MockPrivateAccount {
    pub fn new(name: ExchangeName) -> Self {
        Self {
            name,
            state: Mutex::new(MockState {
                balances: BalancePortfolio::new(),
                next_id: 0,
                withdraws: HashMap::new(),
                recent_deposits: Vec::new(),
                deposit_wallet: None,
                fills_after_polls: 0,
                open_orders: HashMap::new(),
            }),
            simulated_order_supported: false,
        }
    }

    pub fn with_balance(self, amount: MonetaryAmount) -> Self {
        self.state.lock().unwrap().balances.set(amount);
        self
    }

    pub fn with_recent_deposit(self, deposit: RecentDeposit) -> Self {
        self.state.lock().unwrap().recent_deposits.push(deposit);
        self
    }

    pub fn with_deposit_wallet(self, wallet: Wallet) -> Self {
        self.state.lock().unwrap().deposit_wallet = Some(wallet);
        self
    }

    pub fn with_fills_after_polls(self, polls: u32) -> Self {
        self.state.lock().unwrap().fills_after_polls = polls;
        self
    }

    pub fn balance_of(&self, currency: CurrencyCode) -> MonetaryAmount {
        self.state.lock().unwrap().balances.get(currency)
    }

    fn next_id(state: &mut MockState) -> u64 {
        state.next_id += 1;
        state.next_id
    }
}

#[async_trait]
impl PrivateAccount for MockPrivateAccount {
    fn name(&self) -> &ExchangeName {
        &self.name
    }

    async fn validate_api_key(&self) -> Result<()> {
        Ok(())
    }

    async fn query_tradable_currencies(&self) -> Result<Vec<CurrencyCode>> {
        Ok(self.state.lock().unwrap().balances.currencies().collect())
    }

    async fn query_account_balance(&self, _options: BalanceOptions) -> Result<BalancePortfolio> {
        Ok(self.state.lock().unwrap().balances.clone())
    }

    async fn query_deposit_wallet(&self, currency: CurrencyCode) -> Result<Wallet> {
        let state = self.state.lock().unwrap();
        state
            .deposit_wallet
            .clone()
            .filter(|w| w.currency_code() == currency)
            .ok_or_else(|| Error::DepositAddressAbsent {
                exchange: self.name.to_string(),
                currency: currency.to_string(),
            })
    }

    async fn can_generate_deposit_address(&self) -> Result<bool> {
        Ok(true)
    }

    async fn query_closed_orders(&self, _constraints: &OrdersConstraints) -> Result<Vec<OrderId>> {
        Ok(Vec::new())
    }

    async fn query_opened_orders(&self, _constraints: &OrdersConstraints) -> Result<Vec<OrderId>> {
        let state = self.state.lock().unwrap();
        Ok(state.open_orders.keys().cloned().collect())
    }

    async fn cancel_opened_orders(&self, _constraints: &OrdersConstraints) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let n = state.open_orders.len();
        state.open_orders.clear();
        Ok(n)
    }

    async fn query_recent_deposits(&self, _constraints: &DepositsConstraints) -> Result<Vec<RecentDeposit>> {
        Ok(self.state.lock().unwrap().recent_deposits.clone())
    }

    async fn query_recent_withdraws(&self, _constraints: &WithdrawsConstraints) -> Result<Vec<(String, SentWithdrawInfo)>> {
        Ok(self.state.lock().unwrap().withdraws.iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    fn is_simulated_order_supported(&self) -> bool {
        self.simulated_order_supported
    }

    async fn place_order(&self, from: MonetaryAmount, volume: MonetaryAmount, price: MonetaryAmount, info: TradeInfo) -> Result<PlaceOrderInfo> {
        let mut state = self.state.lock().unwrap();
        let to = match info.context.side {
            TradeSide::Buy => volume,
            TradeSide::Sell => volume.convert_to(price)?,
        };

        let order_id = OrderId(format!("ord-{}", Self::next_id(&mut state)));

        if state.fills_after_polls > 0 {
            let polls = state.fills_after_polls;
            state.open_orders.insert(order_id.clone(), (TradedAmounts { from, to }, polls));
            return Ok(PlaceOrderInfo {
                info: OrderInfo { traded: TradedAmounts::zero(from.currency_code(), to.currency_code()), is_closed: false },
                order_id,
            });
        }

        let new_from = state.balances.get(from.currency_code()) - from;
        state.balances.set(new_from);
        let new_to = state.balances.get(to.currency_code()) + to;
        state.balances.set(new_to);

        Ok(PlaceOrderInfo {
            info: OrderInfo { traded: TradedAmounts { from, to }, is_closed: true },
            order_id,
        })
    }

    async fn cancel_order(&self, order_id: &OrderId, _context: TradeContext) -> Result<PlaceOrderInfo> {
        let mut state = self.state.lock().unwrap();
        let (traded, _) = state.open_orders.remove(order_id).unwrap_or((
            TradedAmounts::zero(CurrencyCode::neutral(), CurrencyCode::neutral()),
            0,
        ));
        Ok(PlaceOrderInfo {
            info: OrderInfo { traded, is_closed: true },
            order_id: order_id.clone(),
        })
    }

    async fn query_order_info(&self, order_id: &OrderId, context: TradeContext) -> Result<PlaceOrderInfo> {
        let mut state = self.state.lock().unwrap();
        let (from_cur, to_cur) = (context.market.base(), context.market.quote());
        let entry = state.open_orders.get(order_id).cloned();
        match entry {
            None => Ok(PlaceOrderInfo {
                info: OrderInfo { traded: TradedAmounts::zero(from_cur, to_cur), is_closed: true },
                order_id: order_id.clone(),
            }),
            Some((traded, remaining_polls)) => {
                if remaining_polls <= 1 {
                    state.open_orders.remove(order_id);
                    Ok(PlaceOrderInfo {
                        info: OrderInfo { traded, is_closed: true },
                        order_id: order_id.clone(),
                    })
                } else {
                    let zero = TradedAmounts::zero(traded.from.currency_code(), traded.to.currency_code());
                    state.open_orders.insert(order_id.clone(), (traded, remaining_polls - 1));
                    Ok(PlaceOrderInfo {
                        info: OrderInfo { traded: zero, is_closed: false },
                        order_id: order_id.clone(),
                    })
                }
            }
        }
    }

    async fn launch_withdraw(&self, gross_amount: MonetaryAmount, to: Wallet) -> Result<InitiatedWithdrawInfo> {
        let mut state = self.state.lock().unwrap();
        let withdraw_id = format!("wd-{}", Self::next_id(&mut state));
        let fee = MonetaryAmount::zero(gross_amount.currency_code());
        state.withdraws.insert(
            withdraw_id.clone(),
            SentWithdrawInfo {
                net_emitted_amount: gross_amount - fee,
                fee,
                status: WithdrawStatus::Success,
            },
        );
        Ok(InitiatedWithdrawInfo {
            receiving_wallet: to,
            withdraw_id,
            gross_emitted_amount: gross_amount,
            initiated_time: Utc::now(),
        })
    }

    async fn query_withdraw_delivery(&self, initiated: &InitiatedWithdrawInfo, sent: &SentWithdrawInfo) -> Result<DeliveredWithdrawInfo> {
        let state = self.state.lock().unwrap();
        let found = select_closest_recent_deposit(&state.recent_deposits, sent.net_emitted_amount, initiated.initiated_time);
        Ok(DeliveredWithdrawInfo {
            initiated: initiated.clone(),
            received: found.map(|d| ReceivedWithdrawInfo {
                deposit_id: d.deposit_id.clone(),
                net_received_amount: d.amount,
                received_time: d.time_point,
            }),
        })
    }
}
