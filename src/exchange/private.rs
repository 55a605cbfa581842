use async_trait::async_trait;

use crate::model::balance::{BalanceOptions, BalancePortfolio};
use crate::model::constraints::{DepositsConstraints, OrdersConstraints, WithdrawsConstraints};
use crate::model::currency::CurrencyCode;
use crate::model::exchange_name::ExchangeName;
use crate::model::monetary::MonetaryAmount;
use crate::model::order::{OrderId, PlaceOrderInfo, TradeContext, TradeInfo};
use crate::model::wallet::Wallet;
use crate::model::withdraw::{DeliveredWithdrawInfo, InitiatedWithdrawInfo, RecentDeposit, SentWithdrawInfo};
use crate::Result;

/// Signed, per-account operations. The core drives exactly one in-flight call per (account,
/// operation) pair; implementations are free to serialize internally if their transport requires
/// it.
#[async_trait]
pub trait PrivateAccount: Send + Sync {
    fn name(&self) -> &ExchangeName;

    async fn validate_api_key(&self) -> Result<()>;

    async fn query_tradable_currencies(&self) -> Result<Vec<CurrencyCode>>;

    async fn query_account_balance(&self, options: BalanceOptions) -> Result<BalancePortfolio>;

    async fn query_deposit_wallet(&self, currency: CurrencyCode) -> Result<Wallet>;

    async fn can_generate_deposit_address(&self) -> Result<bool>;

    async fn query_closed_orders(&self, constraints: &OrdersConstraints) -> Result<Vec<OrderId>>;

    async fn query_opened_orders(&self, constraints: &OrdersConstraints) -> Result<Vec<OrderId>>;

    async fn cancel_opened_orders(&self, constraints: &OrdersConstraints) -> Result<usize>;

    async fn query_recent_deposits(&self, constraints: &DepositsConstraints) -> Result<Vec<RecentDeposit>>;

    /// Paired with the withdrawal id the caller is polling for, so `CheckSender` can look its own
    /// withdraw up without the implementation needing to expose a by-id query separately.
    async fn query_recent_withdraws(&self, constraints: &WithdrawsConstraints) -> Result<Vec<(String, SentWithdrawInfo)>>;

    fn is_simulated_order_supported(&self) -> bool;

    async fn place_order(&self, from: MonetaryAmount, volume: MonetaryAmount, price: MonetaryAmount, info: TradeInfo) -> Result<PlaceOrderInfo>;

    async fn cancel_order(&self, order_id: &OrderId, context: TradeContext) -> Result<PlaceOrderInfo>;

    async fn query_order_info(&self, order_id: &OrderId, context: TradeContext) -> Result<PlaceOrderInfo>;

    async fn launch_withdraw(&self, gross_amount: MonetaryAmount, to: Wallet) -> Result<InitiatedWithdrawInfo>;

    async fn query_withdraw_delivery(&self, initiated: &InitiatedWithdrawInfo, sent: &SentWithdrawInfo) -> Result<DeliveredWithdrawInfo>;
}

#[cfg(test)]
mod test {
    // Exercised end-to-end in `tests/` via the mock implementation; there is nothing to unit
    // test here beyond the trait's shape.
}
