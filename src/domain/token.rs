//! Token identity derivation

use crate::shared::types::TokenId;
use solana_sdk::hash::hashv;
use solana_sdk::pubkey::Pubkey;

/// Derives fresh token ids from the minting caller, a monotonic counter
/// and a per-mint entropy seed.
pub struct TokenMinter {
    counter: u64,
    seed: [u8; 32],
}

impl TokenMinter {
    pub fn new() -> Self {
        Self {
            counter: 0,
            seed: rand::random(),
        }
    }

    /// Next token id; the seed is refreshed after every draw so ids stay
    /// unpredictable even with a known counter.
    pub fn next(&mut self, caller: &Pubkey) -> TokenId {
        let digest = hashv(&[
            b"everbid:token",
            caller.as_ref(),
            &self.counter.to_le_bytes(),
            &self.seed,
        ]);
        self.counter = self.counter.wrapping_add(1);
        self.seed = rand::random();
        TokenId(digest.to_bytes())
    }

    pub fn minted(&self) -> u64 {
        self.counter
    }
}

impl Default for TokenMinter {
    fn default() -> Self {
        Self::new()
    }
}
