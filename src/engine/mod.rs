pub mod dust_sweeper;
pub mod multi_trade;
pub mod orchestrator;
pub mod single_trade;
pub mod withdraw;

pub use orchestrator::{Account, Orchestrator, TradeResultPerExchange};
