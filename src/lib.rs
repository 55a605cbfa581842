pub mod engine;
pub mod error;
pub mod exchange;
pub mod model;

pub use crate::engine::{Account, Orchestrator, TradeResultPerExchange};
pub use crate::error::{Error, Result};
pub use crate::exchange::{ExchangeConfig, ExchangeConfigBuilder, PathFindingMode, PrivateAccount, PublicMarketView};

