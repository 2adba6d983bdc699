//! Venue adapters and conversion routing

pub mod constant_product;
pub mod memory;
pub mod router;
pub mod stable_swap;
pub mod types;

use crate::shared::errors::ConversionError;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use types::{ConversionParams, PoolSnapshot, SwapQuote, VenueLabel};

/// Normalized interface over one exchange venue. Adapters convert an
/// arbitrary input asset into the settlement asset fixed at construction.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn label(&self) -> VenueLabel;

    /// Expected settlement-asset output, used to size min_out before committing
    async fn quote(&self, asset_in: &Pubkey, amount_in: u64) -> Result<SwapQuote, ConversionError>;

    /// Execute the swap; fails with SlippageExceeded when the realized
    /// output is below `min_out`
    async fn swap(
        &self,
        asset_in: &Pubkey,
        amount_in: u64,
        min_out: u64,
    ) -> Result<u64, ConversionError>;
}

/// Backend for constant-product venues: pool state reads and swap execution
#[async_trait]
pub trait ConstantProductSource: Send + Sync {
    async fn pool_snapshot(&self, pool: &Pubkey) -> Result<PoolSnapshot, ConversionError>;

    async fn execute_swap(
        &self,
        pool: &Pubkey,
        asset_in: &Pubkey,
        amount_in: u64,
    ) -> Result<u64, ConversionError>;
}

/// Backend for stableswap venues. No deterministic pool derivation exists,
/// so candidates come from a registry lookup; the output estimate may be
/// unavailable, in which case adapters fall back to an approximation.
#[async_trait]
pub trait StableSwapSource: Send + Sync {
    async fn candidate_pools(
        &self,
        asset: &Pubkey,
        settlement: &Pubkey,
    ) -> Result<Vec<Pubkey>, ConversionError>;

    async fn pool_snapshot(&self, pool: &Pubkey) -> Result<PoolSnapshot, ConversionError>;

    /// Venue-side output estimate; Ok(None) when the call is unavailable
    async fn estimate_out(
        &self,
        pool: &Pubkey,
        coin_in: usize,
        coin_out: usize,
        amount_in: u64,
    ) -> Result<Option<u64>, ConversionError>;

    async fn execute_swap(
        &self,
        pool: &Pubkey,
        coin_in: usize,
        coin_out: usize,
        amount_in: u64,
    ) -> Result<u64, ConversionError>;
}

/// Backends available to the adapter factory
#[derive(Clone)]
pub struct VenueSources {
    pub constant_product: Arc<dyn ConstantProductSource>,
    pub stable_swap: Arc<dyn StableSwapSource>,
}

pub fn create_adapter(
    label: VenueLabel,
    settlement: Pubkey,
    params: &ConversionParams,
    sources: &VenueSources,
) -> Arc<dyn VenueAdapter> {
    match label {
        VenueLabel::ConstantProduct => Arc::new(constant_product::ConstantProductVenue::new(
            settlement,
            params.factory,
            params.fee_tier_bps,
            sources.constant_product.clone(),
        )),
        VenueLabel::StableSwap => Arc::new(stable_swap::StableSwapVenue::new(
            settlement,
            params.min_pool_liquidity,
            sources.stable_swap.clone(),
        )),
    }
}
