use anyhow::Result;
use clap::Parser;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::sync::Arc;
use tracing::info;

use everbid::application::{MemoryBank, SettlementBank};
use everbid::domain::pricing::FeeSchedule;
use everbid::exchanges::constant_product::ConstantProductVenue;
use everbid::exchanges::memory::{MemoryConstantProduct, MemoryStableSwap};
use everbid::exchanges::types::{ConversionParams, VenueLabel};
use everbid::exchanges::{create_adapter, VenueSources};
use everbid::shared::config::ConfigLoader;
use everbid::shared::types::SystemClock;
use everbid::{ConversionRouter, Market, MarketParams};

#[derive(Parser, Debug)]
#[command(version, about = "Ascending-price resale market with multi-venue settlement")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "Config.toml")]
    config: String,

    /// Protocol fee in basis points (overrides config)
    #[arg(long)]
    fee_bps: Option<u64>,

    /// Seller premium in basis points (overrides config)
    #[arg(long)]
    premium_bps: Option<u64>,

    /// Minimum price increment in basis points (overrides config)
    #[arg(long)]
    increment_bps: Option<u64>,

    /// Slippage tolerance in basis points (overrides config)
    #[arg(long)]
    slippage_bps: Option<u64>,
}

const ONE: u64 = 1_000_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // Config file first, CLI overrides on top
    let mut settings = ConfigLoader::load_or_default(&args.config)?;
    if let Some(fee_bps) = args.fee_bps {
        settings.fees.fee_bps = fee_bps;
    }
    if let Some(premium_bps) = args.premium_bps {
        settings.fees.premium_bps = premium_bps;
    }
    if let Some(increment_bps) = args.increment_bps {
        settings.fees.increment_bps = increment_bps;
    }
    if let Some(slippage_bps) = args.slippage_bps {
        settings.conversion.slippage_bps = slippage_bps;
    }

    let settlement = settings
        .settlement_pubkey()
        .unwrap_or_else(Pubkey::new_unique);
    let admin = settings.admin_pubkey().unwrap_or_else(Pubkey::new_unique);
    let factory = Pubkey::new_unique();
    let alt_asset = Pubkey::new_unique();

    info!(%settlement, %admin, "starting local market demo");

    // In-memory venue backends with one deep pool per venue family
    let cp_source = Arc::new(MemoryConstantProduct::new());
    let cp_pool = ConstantProductVenue::derive_pool(
        &factory,
        &alt_asset,
        &settlement,
        settings.conversion.fee_tier_bps,
    );
    cp_source.seed_pool(cp_pool, alt_asset, 1_000 * ONE, settlement, 1_000 * ONE, settings.conversion.fee_tier_bps);

    let ss_source = Arc::new(MemoryStableSwap::new());
    ss_source.add_pool(
        Pubkey::new_unique(),
        vec![alt_asset, settlement],
        vec![500 * ONE, 500 * ONE],
        4,
    );

    let params = ConversionParams {
        factory,
        fee_tier_bps: settings.conversion.fee_tier_bps,
        min_pool_liquidity: settings.conversion.min_pool_liquidity,
        slippage_bps: settings.conversion.slippage_bps,
    };
    let sources = VenueSources {
        constant_product: cp_source,
        stable_swap: ss_source,
    };

    let router = ConversionRouter::new(settlement, settings.conversion.slippage_bps);
    let bank = Arc::new(MemoryBank::new());
    let market = Market::new(
        MarketParams {
            admin,
            market_id: Pubkey::new_unique(),
            chain_id: settings.chain_id,
            fees: FeeSchedule::from(settings.fees),
        },
        router,
        bank.clone() as Arc<dyn SettlementBank>,
        Arc::new(SystemClock),
    );
    for label in [VenueLabel::ConstantProduct, VenueLabel::StableSwap] {
        market.register_venue(admin, create_adapter(label, settlement, &params, &sources))?;
    }

    // Scripted scenario: mint, resale through a venue, permit, collection
    let alice = Keypair::new();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();

    let token = market
        .mint(alice.pubkey(), settlement, ONE, VenueLabel::ConstantProduct, 0)
        .await?;
    info!(%token, price = market.last_price(&token)?, "alice minted");

    let expected = market
        .quote_payment(&alt_asset, 13 * ONE / 10, VenueLabel::ConstantProduct)
        .await?;
    let breakdown = market
        .buy(
            bob.pubkey(),
            token,
            alt_asset,
            13 * ONE / 10,
            VenueLabel::ConstantProduct,
            expected * 99 / 100,
        )
        .await?;
    info!(
        new_price = breakdown.new_price,
        premium = breakdown.seller_premium,
        alice_balance = bank.balance_of(&alice.pubkey()),
        "bob bought through the constant-product venue"
    );

    // Bob signs a permit for carol offline; anyone can submit it
    let deadline = chrono::Utc::now().timestamp() + 600;
    let digest = market
        .permit_domain()
        .permit_digest(&token, &carol, 0, deadline);
    let signature = bob.sign_message(digest.as_ref());
    market.permit(token, carol, 0, deadline, signature).await?;
    market.transfer(carol, token, bob.pubkey(), carol).await?;
    let owner = market
        .owner_of(&token)
        .ok_or_else(|| anyhow::anyhow!("token vanished after transfer"))?;
    info!(%owner, "carol took delivery via permit");

    let treasury = Pubkey::new_unique();
    let collected = market.collect_fees(admin, settlement, treasury).await?;
    info!(collected, treasury_balance = bank.balance_of(&treasury), "fees collected");

    Ok(())
}
