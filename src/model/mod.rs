pub mod account_owner;
pub mod balance;
pub mod constraints;
pub mod currency;
pub mod exchange_name;
pub mod market;
pub mod monetary;
pub mod order;
pub mod order_book;
pub mod wallet;
pub mod withdraw;

pub use account_owner::AccountOwner;
pub use balance::{BalanceOptions, BalancePortfolio};
pub use constraints::{DepositsConstraints, OrdersConstraints, WithdrawsConstraints};
pub use currency::CurrencyCode;
pub use exchange_name::ExchangeName;
pub use market::{Market, TradeSide};
pub use monetary::{MonetaryAmount, RoundingMode};
pub use order::{
    FeeType, OrderId, OrderInfo, PlaceOrderInfo, PriceStrategy, TradeContext, TradeInfo, TradeMode, TradeOptions,
    TradeOptionsBuilder, TradeResult, TradeResultState, TradeSyncPolicy, TradeTimeoutAction, TradeTypePolicy,
    TradedAmounts,
};
pub use order_book::{MarketOrderBook, OrderBookLine, VolAndPriNbDecimals};
pub use wallet::{TrustedAddresses, Wallet};
pub use withdraw::{
    select_closest_recent_deposit, DeliveredWithdrawInfo, InitiatedWithdrawInfo, ReceivedWithdrawInfo, RecentDeposit,
    SentWithdrawInfo, WithdrawStatus,
};
