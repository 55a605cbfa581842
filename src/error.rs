use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error taxonomy. Transient/retryable conditions (rate limits, not-yet-visible
/// orders) are expected to be absorbed by the `PublicMarketView`/`PrivateAccount` implementation
/// before it ever returns to the core; everything here is a final outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("currency mismatch: {lhs} vs {rhs}")]
    CurrencyMismatch { lhs: String, rhs: String },

    #[error("invalid monetary amount: {0}")]
    InvalidAmount(String),

    #[error("no conversion path from {from} to {to}")]
    ConversionPathUnavailable { from: String, to: String },

    #[error("insufficient balance of {currency}: available {available}, requested {requested}")]
    InsufficientBalance {
        currency: String,
        available: String,
        requested: String,
    },

    #[error("market not found: {0}")]
    MarketNotFound(String),

    #[error("order {order_id} not yet visible on {market}")]
    OrderNotYetVisible { order_id: String, market: String },

    #[error("withdraw {withdraw_id} failed: {reason}")]
    WithdrawFailed { withdraw_id: String, reason: String },

    #[error("wallet validation failed for {exchange}/{key_name} {currency}")]
    WalletValidationFailed {
        exchange: String,
        key_name: String,
        currency: String,
    },

    #[error("no deposit address for {currency} on {exchange}")]
    DepositAddressAbsent { exchange: String, currency: String },

    #[error("{0} is not tradable on this account")]
    CurrencyNotTradable(String),

    #[error("multi-leg trading is not allowed for this request")]
    MultiTradeNotAllowed,
}

impl From<MonetaryError> for Error {
    fn from(e: MonetaryError) -> Self {
        match e {
            MonetaryError::Overflow(s) => Error::ArithmeticOverflow(s),
            MonetaryError::CurrencyMismatch { lhs, rhs } => Error::CurrencyMismatch { lhs, rhs },
            MonetaryError::Invalid(s) => Error::InvalidAmount(s),
        }
    }
}

pub type MonetaryResult<T> = std::result::Result<T, MonetaryError>;

/// Narrow error alias for `MonetaryAmount` construction and arithmetic, so call sites that only
/// ever manipulate amounts don't have to match on withdrawal- or order-shaped variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonetaryError {
    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    #[error("currency mismatch: {lhs} vs {rhs}")]
    CurrencyMismatch { lhs: String, rhs: String },

    #[error("invalid monetary amount: {0}")]
    Invalid(String),
}
