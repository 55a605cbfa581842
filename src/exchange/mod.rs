pub mod config;
pub mod private;
pub mod public;

pub use config::{ExchangeConfig, ExchangeConfigBuilder, PathFindingMode};
pub use private::PrivateAccount;
pub use public::PublicMarketView;
