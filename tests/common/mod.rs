//! Shared harness for integration tests

use everbid::application::{MemoryBank, SettlementBank};
use everbid::domain::pricing::FeeSchedule;
use everbid::exchanges::constant_product::ConstantProductVenue;
use everbid::exchanges::memory::{MemoryConstantProduct, MemoryStableSwap};
use everbid::exchanges::types::{ConversionParams, VenueLabel};
use everbid::exchanges::{create_adapter, VenueSources};
use everbid::shared::types::Clock;
use everbid::{ConversionRouter, Market, MarketParams};
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub const ONE: u64 = 1_000_000_000;
pub const FEE_TIER_BPS: u64 = 30;
pub const MIN_LIQUIDITY: u64 = ONE;

/// Test clock with a settable timestamp
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn unix_timestamp(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub struct Harness {
    pub market: Arc<Market>,
    pub bank: Arc<MemoryBank>,
    pub cp: Arc<MemoryConstantProduct>,
    pub ss: Arc<MemoryStableSwap>,
    pub clock: Arc<ManualClock>,
    pub settlement: Pubkey,
    pub alt: Pubkey,
    pub factory: Pubkey,
    pub admin: Pubkey,
}

/// Market over in-memory backends: one deep constant-product pool for
/// alt/settlement and a stableswap registry whose first candidate does not
/// hold the pair
pub fn harness() -> Harness {
    let settlement = Pubkey::new_unique();
    let alt = Pubkey::new_unique();
    let factory = Pubkey::new_unique();
    let admin = Pubkey::new_unique();

    let cp = Arc::new(MemoryConstantProduct::new());
    let cp_pool = ConstantProductVenue::derive_pool(&factory, &alt, &settlement, FEE_TIER_BPS);
    cp.seed_pool(cp_pool, alt, 1_000 * ONE, settlement, 1_000 * ONE, FEE_TIER_BPS);

    let ss = Arc::new(MemoryStableSwap::new());
    // First candidate pairs alt with an unrelated coin; discovery must skip it
    ss.add_pool(
        Pubkey::new_unique(),
        vec![alt, Pubkey::new_unique()],
        vec![500 * ONE, 500 * ONE],
        4,
    );
    ss.add_pool(
        Pubkey::new_unique(),
        vec![alt, settlement],
        vec![500 * ONE, 500 * ONE],
        4,
    );

    let params = ConversionParams {
        factory,
        fee_tier_bps: FEE_TIER_BPS,
        min_pool_liquidity: MIN_LIQUIDITY,
        slippage_bps: 100,
    };
    let sources = VenueSources {
        constant_product: cp.clone(),
        stable_swap: ss.clone(),
    };

    let router = ConversionRouter::new(settlement, params.slippage_bps);
    let bank = Arc::new(MemoryBank::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let market = Arc::new(Market::new(
        MarketParams {
            admin,
            market_id: Pubkey::new_unique(),
            chain_id: 1,
            fees: FeeSchedule::default(),
        },
        router,
        bank.clone() as Arc<dyn SettlementBank>,
        clock.clone(),
    ));
    for label in [VenueLabel::ConstantProduct, VenueLabel::StableSwap] {
        market
            .register_venue(admin, create_adapter(label, settlement, &params, &sources))
            .expect("venue registration");
    }

    Harness {
        market,
        bank,
        cp,
        ss,
        clock,
        settlement,
        alt,
        factory,
        admin,
    }
}

/// Mint a token for `owner` paying one settlement unit
pub async fn mint_one(h: &Harness, owner: Pubkey) -> everbid::TokenId {
    h.market
        .mint(owner, h.settlement, ONE, VenueLabel::ConstantProduct, 0)
        .await
        .expect("mint")
}
