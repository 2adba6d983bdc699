//! Constant-product venue adapter

use crate::exchanges::types::{PoolSnapshot, SwapQuote, VenueLabel};
use crate::exchanges::{ConstantProductSource, VenueAdapter};
use crate::shared::errors::ConversionError;
use crate::shared::math::constant_product_out;
use async_trait::async_trait;
use solana_sdk::hash::hashv;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Uniform-interface venue. The pool for a pair is derived deterministically
/// from the canonical factory, the sorted asset identities and the fee tier,
/// so no registry lookup is needed.
pub struct ConstantProductVenue {
    settlement: Pubkey,
    factory: Pubkey,
    fee_tier_bps: u64,
    source: Arc<dyn ConstantProductSource>,
}

impl ConstantProductVenue {
    pub fn new(
        settlement: Pubkey,
        factory: Pubkey,
        fee_tier_bps: u64,
        source: Arc<dyn ConstantProductSource>,
    ) -> Self {
        Self {
            settlement,
            factory,
            fee_tier_bps,
            source,
        }
    }

    /// Canonical pool address for an asset pair under a factory and fee tier
    pub fn derive_pool(factory: &Pubkey, asset_a: &Pubkey, asset_b: &Pubkey, fee_tier_bps: u64) -> Pubkey {
        let (lo, hi) = if asset_a <= asset_b {
            (asset_a, asset_b)
        } else {
            (asset_b, asset_a)
        };
        let digest = hashv(&[
            b"cp:pool",
            factory.as_ref(),
            lo.as_ref(),
            hi.as_ref(),
            &fee_tier_bps.to_le_bytes(),
        ]);
        Pubkey::new_from_array(digest.to_bytes())
    }

    fn pool_for(&self, asset_in: &Pubkey) -> Pubkey {
        Self::derive_pool(&self.factory, asset_in, &self.settlement, self.fee_tier_bps)
    }

    fn reserves(
        &self,
        snapshot: &PoolSnapshot,
        asset_in: &Pubkey,
    ) -> Result<(u64, u64), ConversionError> {
        let i = snapshot
            .coin_index(asset_in)
            .ok_or(ConversionError::PairNotInPool)?;
        let j = snapshot
            .coin_index(&self.settlement)
            .ok_or(ConversionError::PairNotInPool)?;
        let reserve_in = snapshot
            .balances
            .get(i)
            .copied()
            .ok_or(ConversionError::PairNotInPool)?;
        let reserve_out = snapshot
            .balances
            .get(j)
            .copied()
            .ok_or(ConversionError::PairNotInPool)?;
        Ok((reserve_in, reserve_out))
    }
}

#[async_trait]
impl VenueAdapter for ConstantProductVenue {
    fn label(&self) -> VenueLabel {
        VenueLabel::ConstantProduct
    }

    async fn quote(&self, asset_in: &Pubkey, amount_in: u64) -> Result<SwapQuote, ConversionError> {
        let pool = self.pool_for(asset_in);
        let snapshot = self.source.pool_snapshot(&pool).await?;
        let (reserve_in, reserve_out) = self.reserves(&snapshot, asset_in)?;
        let expected_out =
            constant_product_out(amount_in, reserve_in, reserve_out, snapshot.fee_bps)?;

        debug!(%pool, amount_in, expected_out, "constant-product quote");
        Ok(SwapQuote {
            venue: self.label(),
            pool,
            asset_in: *asset_in,
            amount_in,
            expected_out,
        })
    }

    async fn swap(
        &self,
        asset_in: &Pubkey,
        amount_in: u64,
        min_out: u64,
    ) -> Result<u64, ConversionError> {
        let pool = self.pool_for(asset_in);
        let realized = self.source.execute_swap(&pool, asset_in, amount_in).await?;
        if realized < min_out {
            return Err(ConversionError::SlippageExceeded {
                got: realized,
                min_out,
            });
        }
        debug!(%pool, amount_in, realized, "constant-product swap");
        Ok(realized)
    }
}
