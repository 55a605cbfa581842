use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

use crate::engine::{dust_sweeper, multi_trade, single_trade, withdraw};
use crate::error::{Error, Result};
use crate::exchange::config::PathFindingMode;
use crate::exchange::private::PrivateAccount;
use crate::exchange::public::PublicMarketView;
use crate::model::currency::CurrencyCode;
use crate::model::exchange_name::ExchangeName;
use crate::model::market::Market;
use crate::model::monetary::MonetaryAmount;
use crate::model::order::{TradeOptions, TradeResult, TradedAmounts};
use crate::model::wallet::Wallet;
use crate::model::withdraw::DeliveredWithdrawInfo;

/// One configured account: a signed interface and the public view it reads prices through.
#[derive(Clone)]
pub struct Account {
    pub name: ExchangeName,
    pub public: Arc<dyn PublicMarketView>,
    pub private: Arc<dyn PrivateAccount>,
}

pub type TradeResultPerExchange = Vec<(ExchangeName, Result<TradeResult>)>;

/// Fans requests out across a set of accounts. Each in-flight task holds one permit of a
/// semaphore sized to `parallelism_cap`, the async analogue of the teacher's fixed-size worker
/// pool: no dedicated OS threads, but still a hard cap on concurrently in-flight exchange calls.
pub struct Orchestrator {
    accounts: Vec<Account>,
    parallelism_cap: usize,
}

impl Orchestrator {
    pub fn new(accounts: Vec<Account>, parallelism_cap: usize) -> Self {
        let cap = parallelism_cap.min(accounts.len().max(1));
        Self { accounts, parallelism_cap: cap }
    }

    fn select(&self, account_set: &[ExchangeName]) -> Vec<Account> {
        self.accounts.iter().filter(|a| account_set.contains(&a.name)).cloned().collect()
    }

    #[instrument(skip(self, opts))]
    pub async fn trade(
        &self,
        from: MonetaryAmount,
        is_percentage: bool,
        to_cur: CurrencyCode,
        account_set: &[ExchangeName],
        opts: &TradeOptions,
    ) -> Result<TradeResultPerExchange> {
        let accounts = self.select(account_set);
        if accounts.len() == 1 && !is_percentage {
            let account = accounts.into_iter().next().unwrap();
            let result = self.run_single_account_trade(&account, from, to_cur, opts).await;
            return Ok(vec![(account.name, result)]);
        }

        let mut candidates = Vec::new();
        for account in &accounts {
            let balance = account
                .private
                .query_account_balance(crate::model::balance::BalanceOptions::default())
                .await?
                .get(from.currency_code());
            if balance.is_zero() {
                continue;
            }
            let path = account.public.find_markets_path(from.currency_code(), to_cur, PathFindingMode::Strict).await?;
            if path.is_empty() {
                continue;
            }
            if path.len() > 1 && !opts.is_multi_trade_allowed(account.public.exchange_config().multi_trade_allowed_by_default) {
                continue;
            }
            candidates.push((account.clone(), balance));
        }
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        let total_available: MonetaryAmount = candidates
            .iter()
            .fold(MonetaryAmount::zero(from.currency_code()), |acc, (_, bal)| acc + *bal);

        let target = if is_percentage {
            let pct = from.to_neutral() / MonetaryAmount::new(100, 0, CurrencyCode::neutral());
            total_available * pct
        } else {
            from
        };

        let mut remaining = target;
        let mut assignments = Vec::new();
        for (account, balance) in candidates {
            if remaining.is_zero() {
                break;
            }
            let take = if balance < remaining { balance } else { remaining };
            remaining -= take;
            assignments.push((account, take));
        }

        let mut join_set = JoinSet::new();
        let semaphore = Arc::new(Semaphore::new(self.parallelism_cap));
        for (account, amount) in assignments {
            let permit = semaphore.clone();
            let opts = opts.clone();
            let public = account.public.clone();
            let private = account.private.clone();
            let name = account.name.clone();
            join_set.spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore is never closed");
                let result = run_trade(public, private, amount, to_cur, &opts).await;
                (name, result)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            results.push(joined.expect("orchestrator task panicked"));
        }
        debug!(n = results.len(), "trade fan-out complete");
        Ok(results)
    }

    async fn run_single_account_trade(&self, account: &Account, from: MonetaryAmount, to_cur: CurrencyCode, opts: &TradeOptions) -> Result<TradeResult> {
        run_trade(account.public.clone(), account.private.clone(), from, to_cur, opts).await
    }

    /// Greedily assigns `end_amount` of `to_cur` across accounts holding a preferred payment
    /// currency, escalating the allowed path length until the target is filled or no further
    /// path exists.
    #[instrument(skip(self, opts))]
    pub async fn smart_buy(&self, end_amount: MonetaryAmount, account_set: &[ExchangeName], opts: &TradeOptions) -> Result<TradeResultPerExchange> {
        let to_cur = end_amount.currency_code();
        let accounts = self.select(account_set);
        let max_steps: u32 = if opts.is_multi_trade_allowed(true) { 4 } else { 1 };
        let mut remaining = end_amount;
        let mut launched = Vec::new();

        'steps: for nb_steps in 1..=max_steps {
            for account in &accounts {
                if remaining.is_zero() {
                    break 'steps;
                }
                for payment_cur in account.public.exchange_config().preferred_payment_currencies.clone() {
                    if launched.iter().any(|(n, _): &(ExchangeName, MonetaryAmount)| *n == account.name) {
                        continue;
                    }
                    let path = account
                        .public
                        .find_markets_path(payment_cur, to_cur, PathFindingMode::Strict)
                        .await
                        .unwrap_or_default();
                    if path.len() as u32 != nb_steps {
                        continue;
                    }
                    let balance = account.private.query_account_balance(Default::default()).await?.get(payment_cur);
                    if balance.is_zero() {
                        continue;
                    }
                    let expected_end = account.public.average_convert(balance, to_cur).await.unwrap_or(MonetaryAmount::zero(to_cur));
                    if expected_end.is_zero() {
                        continue;
                    }
                    let take = if expected_end <= remaining {
                        remaining -= expected_end;
                        balance
                    } else {
                        let ratio = remaining.to_neutral() / expected_end.to_neutral();
                        remaining = MonetaryAmount::zero(to_cur);
                        balance * ratio
                    };
                    launched.push((account.name.clone(), take));
                }
            }
        }

        let mut join_set = JoinSet::new();
        let semaphore = Arc::new(Semaphore::new(self.parallelism_cap));
        for (name, amount) in launched {
            let account = accounts.iter().find(|a| a.name == name).expect("launched only from selected accounts").clone();
            let permit = semaphore.clone();
            let opts = opts.clone();
            join_set.spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore is never closed");
                let result = run_trade(account.public, account.private, amount, to_cur, &opts).await;
                (name, result)
            });
        }
        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            results.push(joined.expect("orchestrator task panicked"));
        }
        Ok(results)
    }

    /// Mirror of `smart_buy`: sells `start_amount` (or a percentage of the selling account's
    /// balance) into whichever preferred payment currency is cheapest to reach.
    #[instrument(skip(self, opts))]
    pub async fn smart_sell(
        &self,
        start_amount: MonetaryAmount,
        is_percentage: bool,
        account_set: &[ExchangeName],
        opts: &TradeOptions,
    ) -> Result<TradeResultPerExchange> {
        let accounts = self.select(account_set);
        let mut results = Vec::new();
        for account in &accounts {
            let balance = account.private.query_account_balance(Default::default()).await?.get(start_amount.currency_code());
            if balance.is_zero() {
                continue;
            }
            let amount = if is_percentage {
                let pct = start_amount.to_neutral() / MonetaryAmount::new(100, 0, CurrencyCode::neutral());
                balance * pct
            } else {
                balance.min(start_amount)
            };
            for payment_cur in account.public.exchange_config().preferred_payment_currencies.clone() {
                let path = account.public.find_markets_path(start_amount.currency_code(), payment_cur, PathFindingMode::Strict).await?;
                if path.is_empty() {
                    continue;
                }
                let result = run_trade(account.public.clone(), account.private.clone(), amount, payment_cur, opts).await;
                results.push((account.name.clone(), result));
                break;
            }
        }
        Ok(results)
    }

    #[instrument(skip(self))]
    pub async fn dust_sweep(&self, account_set: &[ExchangeName], cur: CurrencyCode) -> Result<Vec<(ExchangeName, Result<(Vec<TradedAmounts>, MonetaryAmount)>)>> {
        let accounts = self.select(account_set);
        let mut join_set = JoinSet::new();
        for account in accounts {
            join_set.spawn(async move {
                let result = dust_sweeper::execute(account.public, account.private, cur).await;
                (account.name, result)
            });
        }
        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            results.push(joined.expect("orchestrator task panicked"));
        }
        Ok(results)
    }

    #[instrument(skip(self, options))]
    pub async fn withdraw(
        &self,
        gross: MonetaryAmount,
        is_percentage: bool,
        from_account: &ExchangeName,
        to_account: &ExchangeName,
        to_wallet: Wallet,
        options: withdraw::WithdrawOptions,
    ) -> Result<DeliveredWithdrawInfo> {
        let source = self.accounts.iter().find(|a| &a.name == from_account).ok_or_else(|| Error::MarketNotFound(from_account.to_string()))?;
        let destination = self.accounts.iter().find(|a| &a.name == to_account).ok_or_else(|| Error::MarketNotFound(to_account.to_string()))?;

        let amount = if is_percentage {
            let balance = source.private.query_account_balance(Default::default()).await?.get(gross.currency_code());
            let pct = gross.to_neutral() / MonetaryAmount::new(100, 0, CurrencyCode::neutral());
            balance * pct
        } else {
            gross
        };

        withdraw::execute(
            source.private.clone(),
            destination.private.clone(),
            amount,
            to_wallet,
            options,
            source.public.exchange_config().withdraw_refresh_time,
        )
        .await
    }

    pub async fn tickers(&self, account_set: &[ExchangeName], market: Market) -> Vec<(ExchangeName, Result<MonetaryAmount>)> {
        let accounts = self.select(account_set);
        let mut join_set = JoinSet::new();
        for account in accounts {
            join_set.spawn(async move {
                let result = account.public.average_convert(MonetaryAmount::new(1, 0, market.base()), market.quote()).await;
                (account.name, result)
            });
        }
        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            results.push(joined.expect("orchestrator task panicked"));
        }
        results
    }

    pub async fn markets_per_exchange(&self, account_set: &[ExchangeName]) -> Vec<(ExchangeName, Result<Vec<Market>>)> {
        let accounts = self.select(account_set);
        let mut join_set = JoinSet::new();
        for account in accounts {
            join_set.spawn(async move {
                let result = account.public.tradable_markets().await;
                (account.name, result)
            });
        }
        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            results.push(joined.expect("orchestrator task panicked"));
        }
        results
    }
}

async fn run_trade(
    public: Arc<dyn PublicMarketView>,
    private: Arc<dyn PrivateAccount>,
    from: MonetaryAmount,
    to_cur: CurrencyCode,
    opts: &TradeOptions,
) -> Result<TradeResult> {
    let path = public.find_markets_path(from.currency_code(), to_cur, PathFindingMode::Strict).await?;
    match path.len() {
        0 => Ok(TradeResult {
            requested_from: from,
            traded: TradedAmounts::zero(from.currency_code(), to_cur),
        }),
        1 => single_trade::execute(public, private, from, to_cur, opts, path[0]).await,
        _ => multi_trade::execute(public, private, from, to_cur, opts).await,
    }
}
