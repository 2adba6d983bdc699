//! Settlement payout capability

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Mutex;

/// Pays out settlement-asset amounts to recipients. Failures abort the
/// whole market operation, so implementations must not partially apply.
#[async_trait]
pub trait SettlementBank: Send + Sync {
    async fn pay(&self, to: &Pubkey, amount: u64) -> anyhow::Result<()>;
}

/// In-memory credit ledger used by the demo binary and tests
pub struct MemoryBank {
    balances: Mutex<HashMap<Pubkey, u64>>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
        }
    }

    pub fn balance_of(&self, address: &Pubkey) -> u64 {
        self.balances
            .lock()
            .expect("balance lock")
            .get(address)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MemoryBank {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementBank for MemoryBank {
    async fn pay(&self, to: &Pubkey, amount: u64) -> anyhow::Result<()> {
        let mut balances = self.balances.lock().expect("balance lock");
        let entry = balances.entry(*to).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("balance overflow for {}", to))?;
        Ok(())
    }
}
