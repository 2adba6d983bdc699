//! In-memory venue backends for the demo binary and integration tests

use crate::exchanges::types::PoolSnapshot;
use crate::exchanges::{ConstantProductSource, StableSwapSource};
use crate::shared::errors::ConversionError;
use crate::shared::math::constant_product_out;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct PoolState {
    coins: Vec<Pubkey>,
    balances: Vec<u64>,
    fee_bps: u64,
}

impl PoolState {
    fn snapshot(&self, address: Pubkey) -> PoolSnapshot {
        PoolSnapshot {
            address,
            coins: self.coins.clone(),
            balances: self.balances.clone(),
            fee_bps: self.fee_bps,
        }
    }
}

/// Constant-product pools held in memory; swaps mutate reserves
pub struct MemoryConstantProduct {
    pools: Mutex<HashMap<Pubkey, PoolState>>,
}

impl MemoryConstantProduct {
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
        }
    }

    pub fn seed_pool(
        &self,
        address: Pubkey,
        coin_a: Pubkey,
        balance_a: u64,
        coin_b: Pubkey,
        balance_b: u64,
        fee_bps: u64,
    ) {
        self.pools.lock().expect("pool lock").insert(
            address,
            PoolState {
                coins: vec![coin_a, coin_b],
                balances: vec![balance_a, balance_b],
                fee_bps,
            },
        );
    }
}

impl Default for MemoryConstantProduct {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConstantProductSource for MemoryConstantProduct {
    async fn pool_snapshot(&self, pool: &Pubkey) -> Result<PoolSnapshot, ConversionError> {
        self.pools
            .lock()
            .expect("pool lock")
            .get(pool)
            .map(|state| state.snapshot(*pool))
            .ok_or(ConversionError::NoLiquidity)
    }

    async fn execute_swap(
        &self,
        pool: &Pubkey,
        asset_in: &Pubkey,
        amount_in: u64,
    ) -> Result<u64, ConversionError> {
        let mut pools = self.pools.lock().expect("pool lock");
        let state = pools.get_mut(pool).ok_or(ConversionError::NoLiquidity)?;
        let i = state
            .coins
            .iter()
            .position(|c| c == asset_in)
            .ok_or(ConversionError::PairNotInPool)?;
        let j = 1 - i;
        let out = constant_product_out(amount_in, state.balances[i], state.balances[j], state.fee_bps)?;
        state.balances[i] = state.balances[i].saturating_add(amount_in);
        state.balances[j] = state.balances[j].saturating_sub(out);
        Ok(out)
    }
}

/// Stableswap pools plus the registry lookup over them. The registry is
/// deliberately loose: it returns every pool containing the input asset,
/// leaving validation to the discovery path. The venue-side estimate can
/// be switched off to exercise the approximation fallback.
pub struct MemoryStableSwap {
    pools: Mutex<Vec<(Pubkey, PoolState)>>,
    estimates_enabled: AtomicBool,
}

impl MemoryStableSwap {
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(Vec::new()),
            estimates_enabled: AtomicBool::new(true),
        }
    }

    pub fn add_pool(&self, address: Pubkey, coins: Vec<Pubkey>, balances: Vec<u64>, fee_bps: u64) {
        self.pools.lock().expect("pool lock").push((
            address,
            PoolState {
                coins,
                balances,
                fee_bps,
            },
        ));
    }

    pub fn disable_estimates(&self) {
        self.estimates_enabled.store(false, Ordering::SeqCst);
    }

    /// Near-flat curve: output is input minus the pool fee, capped by the
    /// outgoing balance
    fn flat_out(state: &PoolState, coin_out: usize, amount_in: u64) -> u64 {
        let after_fee = amount_in
            .saturating_mul(10_000u64.saturating_sub(state.fee_bps))
            / 10_000;
        after_fee.min(state.balances[coin_out])
    }
}

impl Default for MemoryStableSwap {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StableSwapSource for MemoryStableSwap {
    async fn candidate_pools(
        &self,
        asset: &Pubkey,
        _settlement: &Pubkey,
    ) -> Result<Vec<Pubkey>, ConversionError> {
        Ok(self
            .pools
            .lock()
            .expect("pool lock")
            .iter()
            .filter(|(_, state)| state.coins.contains(asset))
            .map(|(address, _)| *address)
            .collect())
    }

    async fn pool_snapshot(&self, pool: &Pubkey) -> Result<PoolSnapshot, ConversionError> {
        self.pools
            .lock()
            .expect("pool lock")
            .iter()
            .find(|(address, _)| address == pool)
            .map(|(address, state)| state.snapshot(*address))
            .ok_or(ConversionError::NoLiquidity)
    }

    async fn estimate_out(
        &self,
        pool: &Pubkey,
        _coin_in: usize,
        coin_out: usize,
        amount_in: u64,
    ) -> Result<Option<u64>, ConversionError> {
        if !self.estimates_enabled.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let pools = self.pools.lock().expect("pool lock");
        let (_, state) = pools
            .iter()
            .find(|(address, _)| address == pool)
            .ok_or(ConversionError::NoLiquidity)?;
        Ok(Some(Self::flat_out(state, coin_out, amount_in)))
    }

    async fn execute_swap(
        &self,
        pool: &Pubkey,
        coin_in: usize,
        coin_out: usize,
        amount_in: u64,
    ) -> Result<u64, ConversionError> {
        let mut pools = self.pools.lock().expect("pool lock");
        let (_, state) = pools
            .iter_mut()
            .find(|(address, _)| address == pool)
            .ok_or(ConversionError::NoLiquidity)?;
        let out = Self::flat_out(state, coin_out, amount_in);
        state.balances[coin_in] = state.balances[coin_in].saturating_add(amount_in);
        state.balances[coin_out] = state.balances[coin_out].saturating_sub(out);
        Ok(out)
    }
}
