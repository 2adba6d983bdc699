//! Common types used across the application

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// Opaque resource identity, derived unpredictably at mint time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub [u8; 32]);

impl AsRef<[u8]> for TokenId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Wall-clock capability, injectable for tests
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> i64;
}

/// System clock backed by chrono
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fee schedule ratios in basis points
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeConfig {
    pub fee_bps: u64,
    pub premium_bps: u64,
    pub increment_bps: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fee_bps: 50,        // 0.5% protocol fee
            premium_bps: 2_000, // 20% seller premium on the spread
            increment_bps: 1_000, // 10% minimum price increment
        }
    }
}

/// Conversion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub slippage_bps: u64,
    pub min_pool_liquidity: u64,
    pub fee_tier_bps: u64,
    pub factory: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            slippage_bps: 100, // 1%
            min_pool_liquidity: 1_000_000_000,
            fee_tier_bps: 30,
            factory: None,
        }
    }
}

/// Market configuration loaded from Config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub chain_id: u64,
    pub settlement_mint: Option<String>,
    pub admin: Option<String>,
    pub fees: FeeConfig,
    pub conversion: ConversionConfig,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            chain_id: 1,
            settlement_mint: None, // generated at startup when unset
            admin: None,
            fees: FeeConfig::default(),
            conversion: ConversionConfig::default(),
        }
    }
}

impl MarketSettings {
    pub fn settlement_pubkey(&self) -> Option<Pubkey> {
        self.settlement_mint
            .as_deref()
            .and_then(|s| s.parse::<Pubkey>().ok())
    }

    pub fn admin_pubkey(&self) -> Option<Pubkey> {
        self.admin.as_deref().and_then(|s| s.parse::<Pubkey>().ok())
    }
}
