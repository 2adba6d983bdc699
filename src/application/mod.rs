//! Application services and entry points

pub mod bank;
pub mod market;

pub use bank::{MemoryBank, SettlementBank};
pub use market::{Market, MarketParams};
