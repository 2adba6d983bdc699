//! Everbid - perpetually re-auctioned ownership registry
//! Resources sell only at an ascending price; payments in arbitrary assets
//! are normalized into the settlement asset through pluggable venues.

pub mod application;
pub mod domain;
pub mod exchanges;
pub mod shared;

// Re-export main types for convenience
pub use application::market::{Market, MarketParams};
pub use domain::pricing::{FeeSchedule, SaleBreakdown};
pub use domain::registry::OwnershipRegistry;
pub use exchanges::router::ConversionRouter;
pub use exchanges::types::VenueLabel;
pub use shared::types::TokenId;
