//! Pricing and fee engine

pub mod engine;

pub use engine::{FeeSchedule, MintBreakdown, PriceBook, SaleBreakdown};
