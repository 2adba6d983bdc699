//! Stableswap venue adapter with pool discovery

use crate::exchanges::types::{PoolSnapshot, SwapQuote, VenueLabel};
use crate::exchanges::{StableSwapSource, VenueAdapter};
use crate::shared::errors::ConversionError;
use crate::shared::math::{bps_of, constant_product_out, BPS_DENOMINATOR};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Haircut applied when the venue-side estimate is unavailable and the
/// quote falls back to a constant-product approximation over live balances
const FALLBACK_HAIRCUT_BPS: u64 = 100;

/// Heterogeneous-interface venue. Pools are found through a registry
/// capability, validated against a minimum-liquidity floor and memoized
/// per input asset. Cached resolutions are never invalidated within a
/// session; a drained pool surfaces later as SlippageExceeded, not as a
/// silent misprice.
pub struct StableSwapVenue {
    settlement: Pubkey,
    min_liquidity: u64,
    source: Arc<dyn StableSwapSource>,
    resolved: Mutex<HashMap<Pubkey, Pubkey>>,
}

struct ResolvedPool {
    address: Pubkey,
    coin_in: usize,
    coin_out: usize,
    snapshot: PoolSnapshot,
}

impl StableSwapVenue {
    pub fn new(settlement: Pubkey, min_liquidity: u64, source: Arc<dyn StableSwapSource>) -> Self {
        Self {
            settlement,
            min_liquidity,
            source,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    fn cached_pool(&self, asset: &Pubkey) -> Option<Pubkey> {
        self.resolved.lock().expect("cache lock").get(asset).copied()
    }

    /// Coin indices for the input asset and the settlement asset
    fn pair_indices(
        &self,
        snapshot: &PoolSnapshot,
        asset_in: &Pubkey,
    ) -> Result<(usize, usize), ConversionError> {
        let coin_in = snapshot
            .coin_index(asset_in)
            .ok_or(ConversionError::PairNotInPool)?;
        let coin_out = snapshot
            .coin_index(&self.settlement)
            .ok_or(ConversionError::PairNotInPool)?;
        Ok((coin_in, coin_out))
    }

    fn has_liquidity(&self, snapshot: &PoolSnapshot, coin_in: usize, coin_out: usize) -> bool {
        let bal_in = snapshot.balances.get(coin_in).copied().unwrap_or(0);
        let bal_out = snapshot.balances.get(coin_out).copied().unwrap_or(0);
        bal_in >= self.min_liquidity && bal_out >= self.min_liquidity
    }

    /// Resolve the pool for an asset: cached handle first, otherwise walk
    /// the registry's candidates and keep the first one that holds the pair
    /// with both balances above the floor.
    async fn resolve(&self, asset_in: &Pubkey) -> Result<ResolvedPool, ConversionError> {
        if let Some(address) = self.cached_pool(asset_in) {
            let snapshot = self.source.pool_snapshot(&address).await?;
            let (coin_in, coin_out) = self.pair_indices(&snapshot, asset_in)?;
            return Ok(ResolvedPool {
                address,
                coin_in,
                coin_out,
                snapshot,
            });
        }

        let candidates = self
            .source
            .candidate_pools(asset_in, &self.settlement)
            .await?;
        for address in candidates {
            let snapshot = match self.source.pool_snapshot(&address).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(pool = %address, error = %e, "skipping unreadable candidate");
                    continue;
                }
            };
            let (coin_in, coin_out) = match self.pair_indices(&snapshot, asset_in) {
                Ok(indices) => indices,
                Err(_) => {
                    debug!(pool = %address, "candidate does not hold the pair");
                    continue;
                }
            };
            if !self.has_liquidity(&snapshot, coin_in, coin_out) {
                debug!(pool = %address, "candidate below liquidity floor");
                continue;
            }

            self.resolved
                .lock()
                .expect("cache lock")
                .insert(*asset_in, address);
            debug!(asset = %asset_in, pool = %address, "stableswap pool resolved");
            return Ok(ResolvedPool {
                address,
                coin_in,
                coin_out,
                snapshot,
            });
        }

        Err(ConversionError::NoLiquidity)
    }

    /// Constant-product approximation over live balances, shaved by a
    /// conservative haircut; used when the venue's estimate call is
    /// unavailable. Trades precision for availability.
    fn approximate_out(
        &self,
        snapshot: &PoolSnapshot,
        coin_in: usize,
        coin_out: usize,
        amount_in: u64,
    ) -> Result<u64, ConversionError> {
        let bal_in = snapshot.balances.get(coin_in).copied().unwrap_or(0);
        let bal_out = snapshot.balances.get(coin_out).copied().unwrap_or(0);
        let raw = constant_product_out(amount_in, bal_in, bal_out, snapshot.fee_bps)?;
        bps_of(raw, BPS_DENOMINATOR - FALLBACK_HAIRCUT_BPS).ok_or(ConversionError::Overflow)
    }
}

#[async_trait]
impl VenueAdapter for StableSwapVenue {
    fn label(&self) -> VenueLabel {
        VenueLabel::StableSwap
    }

    async fn quote(&self, asset_in: &Pubkey, amount_in: u64) -> Result<SwapQuote, ConversionError> {
        let pool = self.resolve(asset_in).await?;
        let expected_out = match self
            .source
            .estimate_out(&pool.address, pool.coin_in, pool.coin_out, amount_in)
            .await?
        {
            Some(out) => out,
            None => {
                warn!(pool = %pool.address, "estimate unavailable, using approximation");
                self.approximate_out(&pool.snapshot, pool.coin_in, pool.coin_out, amount_in)?
            }
        };

        Ok(SwapQuote {
            venue: self.label(),
            pool: pool.address,
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
        let pool = self.resolve(asset_in).await?;
        let realized = self
            .source
            .execute_swap(&pool.address, pool.coin_in, pool.coin_out, amount_in)
            .await?;
        if realized < min_out {
            return Err(ConversionError::SlippageExceeded {
                got: realized,
                min_out,
            });
        }
        debug!(pool = %pool.address, amount_in, realized, "stableswap swap");
        Ok(realized)
    }
}
