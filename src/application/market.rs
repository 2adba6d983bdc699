//! Market entry points: mint, buy, burn, transfer, approve, permit, collect

use crate::application::bank::SettlementBank;
use crate::domain::permit::{PermitBook, PermitDomain};
use crate::domain::pricing::{FeeSchedule, PriceBook, SaleBreakdown};
use crate::domain::registry::{OwnershipRegistry, ReceiverHook};
use crate::domain::token::TokenMinter;
use crate::shared::errors::{MarketError, PricingError, RegistryError};
use crate::shared::types::{Clock, TokenId};
use crate::exchanges::router::ConversionRouter;
use crate::exchanges::types::VenueLabel;
use crate::exchanges::VenueAdapter;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Construction parameters for a market instance
#[derive(Debug, Clone, Copy)]
pub struct MarketParams {
    pub admin: Pubkey,
    pub market_id: Pubkey,
    pub chain_id: u64,
    pub fees: FeeSchedule,
}

struct MarketState {
    registry: OwnershipRegistry,
    prices: PriceBook,
    permits: PermitBook,
    fee_ledger: HashMap<Pubkey, u64>,
    minter: TokenMinter,
    paused: bool,
}

/// Re-entrancy guard released on drop
struct EntryGuard<'a>(&'a AtomicBool);

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The ownership market. All state-mutating entry points hold a
/// re-entrancy guard for their full duration; external capabilities
/// (venue swaps, payouts, receiver hooks) that call back in are rejected
/// with `ReentrantCall`. State commits happen only after every external
/// interaction succeeded, so a failed operation leaves prior state
/// unchanged.
pub struct Market {
    admin: Pubkey,
    permit_domain: PermitDomain,
    router: ConversionRouter,
    bank: Arc<dyn SettlementBank>,
    clock: Arc<dyn Clock>,
    entered: AtomicBool,
    state: Mutex<MarketState>,
}

impl Market {
    pub fn new(
        params: MarketParams,
        router: ConversionRouter,
        bank: Arc<dyn SettlementBank>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let permit_domain = PermitDomain::new(params.chain_id, params.market_id);
        Self {
            admin: params.admin,
            permit_domain,
            router,
            bank,
            clock,
            entered: AtomicBool::new(false),
            state: Mutex::new(MarketState {
                registry: OwnershipRegistry::new(),
                prices: PriceBook::new(params.fees),
                permits: PermitBook::new(permit_domain),
                fee_ledger: HashMap::new(),
                minter: TokenMinter::new(),
                paused: false,
            }),
        }
    }

    fn enter(&self) -> Result<EntryGuard<'_>, MarketError> {
        if self
            .entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("re-entrant call rejected");
            return Err(MarketError::ReentrantCall);
        }
        Ok(EntryGuard(&self.entered))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MarketState> {
        // Never held across an await point
        self.state.lock().expect("market state lock")
    }

    fn ensure_active(state: &MarketState) -> Result<(), MarketError> {
        if state.paused {
            return Err(MarketError::Paused);
        }
        Ok(())
    }

    // --- reads ---

    pub fn settlement(&self) -> Pubkey {
        self.router.settlement()
    }

    pub fn permit_domain(&self) -> PermitDomain {
        self.permit_domain
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn owner_of(&self, token: &TokenId) -> Option<Pubkey> {
        self.lock().registry.owner_of(token)
    }

    pub fn is_owner(&self, token: &TokenId, address: &Pubkey) -> bool {
        self.lock().registry.is_owner(token, address)
    }

    pub fn is_approved(&self, token: &TokenId, address: &Pubkey) -> bool {
        self.lock().registry.is_approved(token, address)
    }

    pub fn last_price(&self, token: &TokenId) -> Result<u64, MarketError> {
        Ok(self.lock().prices.last_price(token)?)
    }

    pub fn next_minimum_price(&self, token: &TokenId) -> Result<u64, MarketError> {
        Ok(self.lock().prices.next_minimum_price(token)?)
    }

    pub fn accrued_fees(&self, asset: &Pubkey) -> u64 {
        self.lock().fee_ledger.get(asset).copied().unwrap_or(0)
    }

    /// Expected settlement output for a payment, for sizing min_out
    pub async fn quote_payment(
        &self,
        asset: &Pubkey,
        amount_in: u64,
        venue: VenueLabel,
    ) -> Result<u64, MarketError> {
        Ok(self.router.quote(asset, amount_in, venue).await?)
    }

    // --- setup ---

    /// Register an address's receiver acceptance hook
    pub fn register_hook(&self, address: Pubkey, hook: Arc<dyn ReceiverHook>) {
        self.lock().registry.register_hook(address, hook);
    }

    /// Admin: register a venue adapter with the router
    pub fn register_venue(
        &self,
        caller: Pubkey,
        adapter: Arc<dyn VenueAdapter>,
    ) -> Result<(), MarketError> {
        self.require_admin(&caller)?;
        self.router.register(adapter);
        Ok(())
    }

    fn require_admin(&self, caller: &Pubkey) -> Result<(), MarketError> {
        if caller != &self.admin {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }

    // --- entry points ---

    /// Register a new resource at an initial price. The payment is first
    /// normalized into the settlement asset; the protocol fee is skimmed
    /// and the remainder recorded as the starting price.
    pub async fn mint(
        &self,
        caller: Pubkey,
        asset: Pubkey,
        amount_in: u64,
        venue: VenueLabel,
        min_out: u64,
    ) -> Result<TokenId, MarketError> {
        let _guard = self.enter()?;
        {
            let state = self.lock();
            Self::ensure_active(&state)?;
        }
        if amount_in == 0 {
            return Err(MarketError::InvalidInput("zero payment amount".into()));
        }
        if caller == Pubkey::default() {
            return Err(MarketError::InvalidInput("zero caller address".into()));
        }

        let paid = self.router.convert(&asset, amount_in, venue, min_out).await?;

        let settlement = self.router.settlement();
        let mut state = self.lock();
        let breakdown = state.prices.quote_mint(paid)?;
        let token = state.minter.next(&caller);
        state.registry.check_receiver(token, Pubkey::default(), caller)?;
        let ledger_after = state
            .fee_ledger
            .get(&settlement)
            .copied()
            .unwrap_or(0)
            .checked_add(breakdown.protocol_fee)
            .ok_or(PricingError::Overflow)?;

        state.registry.grant_ownership(token, caller);
        state.prices.commit_mint(token, &breakdown);
        state.fee_ledger.insert(settlement, ledger_after);

        info!(
            token = %token,
            owner = %caller,
            paid,
            fee = breakdown.protocol_fee,
            price = breakdown.initial_price,
            "minted"
        );
        Ok(token)
    }

    /// Acquire an existing resource by paying at least the required
    /// increment. The prior owner is paid last price plus premium before
    /// any state is committed.
    pub async fn buy(
        &self,
        caller: Pubkey,
        token: TokenId,
        asset: Pubkey,
        amount_in: u64,
        venue: VenueLabel,
        min_out: u64,
    ) -> Result<SaleBreakdown, MarketError> {
        let _guard = self.enter()?;
        {
            let state = self.lock();
            Self::ensure_active(&state)?;
            if !state.prices.exists(&token) {
                return Err(PricingError::UnknownResource.into());
            }
        }
        if amount_in == 0 {
            return Err(MarketError::InvalidInput("zero payment amount".into()));
        }
        if caller == Pubkey::default() {
            return Err(RegistryError::ZeroRecipient.into());
        }

        // A sale the pricing check rejects at the quoted amount must not
        // execute the swap
        let expected = self.router.quote(&asset, amount_in, venue).await?;
        {
            let state = self.lock();
            state.prices.quote_sale(&token, expected)?;
        }

        let paid = self.router.convert(&asset, amount_in, venue, min_out).await?;

        // Quote, receiver acceptance and overflow checks before the payout;
        // commits only after it succeeded.
        let settlement = self.router.settlement();
        let (breakdown, seller, ledger_after) = {
            let state = self.lock();
            let breakdown = state.prices.quote_sale(&token, paid)?;
            let seller = state
                .registry
                .owner_of(&token)
                .ok_or(RegistryError::UnknownResource)?;
            state.registry.check_receiver(token, seller, caller)?;
            let ledger_after = state
                .fee_ledger
                .get(&settlement)
                .copied()
                .unwrap_or(0)
                .checked_add(breakdown.protocol_fee)
                .ok_or(PricingError::Overflow)?;
            (breakdown, seller, ledger_after)
        };

        self.bank
            .pay(&seller, breakdown.seller_payout)
            .await
            .map_err(|e| MarketError::TransferFailed(e.to_string()))?;

        let mut state = self.lock();
        state.registry.move_ownership(token, caller)?;
        state.prices.commit_sale(token, &breakdown);
        state.fee_ledger.insert(settlement, ledger_after);

        info!(
            token = %token,
            buyer = %caller,
            seller = %seller,
            paid,
            fee = breakdown.protocol_fee,
            premium = breakdown.seller_premium,
            price = breakdown.new_price,
            "sold"
        );
        Ok(breakdown)
    }

    /// Permanently remove a resource; owner only
    pub async fn burn(&self, caller: Pubkey, token: TokenId) -> Result<(), MarketError> {
        let _guard = self.enter()?;
        let mut state = self.lock();
        Self::ensure_active(&state)?;
        let owner = state
            .registry
            .owner_of(&token)
            .ok_or(RegistryError::UnknownResource)?;
        if owner != caller {
            return Err(MarketError::Unauthorized);
        }
        state.registry.clear(&token);
        state.prices.remove(&token);
        info!(token = %token, owner = %caller, "burned");
        Ok(())
    }

    /// Delegated transfer; the caller must hold the delegation for `token`
    pub async fn transfer(
        &self,
        caller: Pubkey,
        token: TokenId,
        from: Pubkey,
        to: Pubkey,
    ) -> Result<(), MarketError> {
        let _guard = self.enter()?;
        let mut state = self.lock();
        Self::ensure_active(&state)?;
        state.registry.transfer(token, from, to, caller)?;
        Ok(())
    }

    /// Owner-issued delegation grant
    pub async fn approve(
        &self,
        caller: Pubkey,
        token: TokenId,
        spender: Pubkey,
    ) -> Result<(), MarketError> {
        let _guard = self.enter()?;
        let mut state = self.lock();
        Self::ensure_active(&state)?;
        state.registry.approve(token, spender, caller)?;
        info!(token = %token, %spender, "approved");
        Ok(())
    }

    /// Signature-based delegation grant with deadline and single-use nonce
    pub async fn permit(
        &self,
        token: TokenId,
        spender: Pubkey,
        nonce: u64,
        deadline: i64,
        signature: Signature,
    ) -> Result<(), MarketError> {
        let _guard = self.enter()?;
        let mut state = self.lock();
        Self::ensure_active(&state)?;
        let owner = state
            .registry
            .owner_of(&token)
            .ok_or(RegistryError::UnknownResource)?;
        let now = self.clock.unix_timestamp();
        state
            .permits
            .verify(&owner, &token, &spender, nonce, deadline, &signature, now)?;
        state.registry.grant_approval(token, spender)?;
        info!(token = %token, %owner, %spender, nonce, "permit accepted");
        Ok(())
    }

    /// Admin: withdraw accrued fees for one asset, zeroing the ledger
    /// entry atomically with the payout
    pub async fn collect_fees(
        &self,
        caller: Pubkey,
        asset: Pubkey,
        recipient: Pubkey,
    ) -> Result<u64, MarketError> {
        let _guard = self.enter()?;
        self.require_admin(&caller)?;
        if recipient == Pubkey::default() {
            return Err(MarketError::InvalidInput("zero recipient address".into()));
        }

        let amount = {
            let state = self.lock();
            Self::ensure_active(&state)?;
            state.fee_ledger.get(&asset).copied().unwrap_or(0)
        };
        if amount == 0 {
            return Ok(0);
        }

        self.bank
            .pay(&recipient, amount)
            .await
            .map_err(|e| MarketError::TransferFailed(e.to_string()))?;

        self.lock().fee_ledger.insert(asset, 0);
        info!(%asset, %recipient, amount, "fees collected");
        Ok(amount)
    }

    /// Admin: halt all state-mutating operations
    pub async fn pause(&self, caller: Pubkey) -> Result<(), MarketError> {
        let _guard = self.enter()?;
        self.require_admin(&caller)?;
        let mut state = self.lock();
        if state.paused {
            return Err(MarketError::InvalidInput("already paused".into()));
        }
        state.paused = true;
        info!("market paused");
        Ok(())
    }

    /// Admin: resume operations
    pub async fn unpause(&self, caller: Pubkey) -> Result<(), MarketError> {
        let _guard = self.enter()?;
        self.require_admin(&caller)?;
        let mut state = self.lock();
        if !state.paused {
            return Err(MarketError::InvalidInput("not paused".into()));
        }
        state.paused = false;
        info!("market unpaused");
        Ok(())
    }
}
