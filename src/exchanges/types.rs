//! Venue and pool types

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// Supported venue families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueLabel {
    /// Uniform interface, deterministic pool derivation
    ConstantProduct,
    /// Heterogeneous interface, pools found through a registry lookup
    StableSwap,
}

impl VenueLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueLabel::ConstantProduct => "constant_product",
            VenueLabel::StableSwap => "stable_swap",
        }
    }
}

impl fmt::Display for VenueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a pool's coin list and balances
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub address: Pubkey,
    pub coins: Vec<Pubkey>,
    pub balances: Vec<u64>,
    pub fee_bps: u64,
}

impl PoolSnapshot {
    /// Index of an asset in the pool's coin list
    pub fn coin_index(&self, asset: &Pubkey) -> Option<usize> {
        self.coins.iter().position(|c| c == asset)
    }
}

/// Quote for a prospective swap into the settlement asset
#[derive(Debug, Clone, Copy)]
pub struct SwapQuote {
    pub venue: VenueLabel,
    pub pool: Pubkey,
    pub asset_in: Pubkey,
    pub amount_in: u64,
    pub expected_out: u64,
}

/// Runtime parameters for venue construction
#[derive(Debug, Clone, Copy)]
pub struct ConversionParams {
    pub factory: Pubkey,
    pub fee_tier_bps: u64,
    pub min_pool_liquidity: u64,
    pub slippage_bps: u64,
}
