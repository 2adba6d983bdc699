//! Signature-based delegation through the market entry point

mod common;

use common::{harness, mint_one, Harness};
use everbid::shared::errors::{MarketError, PermitError, RegistryError};
use everbid::TokenId;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

fn signed_permit(
    h: &Harness,
    owner: &Keypair,
    token: &TokenId,
    spender: &Pubkey,
    nonce: u64,
    deadline: i64,
) -> Signature {
    let digest = h
        .market
        .permit_domain()
        .permit_digest(token, spender, nonce, deadline);
    owner.sign_message(digest.as_ref())
}

#[tokio::test]
async fn permit_grants_delegation_to_spender() {
    let h = harness();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();
    let token = mint_one(&h, bob.pubkey()).await;

    let sig = signed_permit(&h, &bob, &token, &carol, 0, 2_000);
    h.market.permit(token, carol, 0, 2_000, sig).await.unwrap();
    assert!(h.market.is_approved(&token, &carol));

    // Anyone may submit the transfer once the delegation exists
    h.market
        .transfer(carol, token, bob.pubkey(), carol)
        .await
        .unwrap();
    assert!(h.market.is_owner(&token, &carol));
}

#[tokio::test]
async fn permit_past_deadline_rejected() {
    let h = harness();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();
    let token = mint_one(&h, bob.pubkey()).await;

    let sig = signed_permit(&h, &bob, &token, &carol, 0, 2_000);
    h.clock.set(2_001);
    assert!(matches!(
        h.market.permit(token, carol, 0, 2_000, sig).await,
        Err(MarketError::Permit(PermitError::Expired))
    ));
    assert!(!h.market.is_approved(&token, &carol));
}

#[tokio::test]
async fn consumed_nonce_cannot_be_replayed() {
    let h = harness();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();
    let dave = Pubkey::new_unique();
    let token = mint_one(&h, bob.pubkey()).await;

    let sig = signed_permit(&h, &bob, &token, &carol, 7, 2_000);
    h.market.permit(token, carol, 7, 2_000, sig).await.unwrap();

    // Fresh valid signature over the same nonce still replays
    let sig2 = signed_permit(&h, &bob, &token, &dave, 7, 2_000);
    assert!(matches!(
        h.market.permit(token, dave, 7, 2_000, sig2).await,
        Err(MarketError::Permit(PermitError::NonceReplay))
    ));

    // A different nonce is fine
    let sig3 = signed_permit(&h, &bob, &token, &dave, 8, 2_000);
    h.market.permit(token, dave, 8, 2_000, sig3).await.unwrap();
}

#[tokio::test]
async fn permit_signed_by_non_owner_rejected() {
    let h = harness();
    let bob = Keypair::new();
    let mallory = Keypair::new();
    let carol = Pubkey::new_unique();
    let token = mint_one(&h, bob.pubkey()).await;

    let sig = signed_permit(&h, &mallory, &token, &carol, 0, 2_000);
    assert!(matches!(
        h.market.permit(token, carol, 0, 2_000, sig).await,
        Err(MarketError::Permit(PermitError::InvalidSignature))
    ));
}

#[tokio::test]
async fn permit_for_unknown_token_rejected() {
    let h = harness();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();
    let token = TokenId([9u8; 32]);

    let sig = signed_permit(&h, &bob, &token, &carol, 0, 2_000);
    assert!(matches!(
        h.market.permit(token, carol, 0, 2_000, sig).await,
        Err(MarketError::Registry(RegistryError::UnknownResource))
    ));
}

#[tokio::test]
async fn paused_market_rejects_permits() {
    let h = harness();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();
    let token = mint_one(&h, bob.pubkey()).await;

    h.market.pause(h.admin).await.unwrap();
    let sig = signed_permit(&h, &bob, &token, &carol, 0, 2_000);
    assert!(matches!(
        h.market.permit(token, carol, 0, 2_000, sig).await,
        Err(MarketError::Paused)
    ));

    // The signature is still good after resuming; the nonce was not burned
    h.market.unpause(h.admin).await.unwrap();
    let sig = signed_permit(&h, &bob, &token, &carol, 0, 2_000);
    h.market.permit(token, carol, 0, 2_000, sig).await.unwrap();
}

#[tokio::test]
async fn permit_does_not_survive_ownership_change() {
    let h = harness();
    let bob = Keypair::new();
    let carol = Pubkey::new_unique();
    let token = mint_one(&h, bob.pubkey()).await;

    // Bob signs, then sells before the permit is submitted
    let sig = signed_permit(&h, &bob, &token, &carol, 0, 2_000);
    let buyer = Pubkey::new_unique();
    h.market
        .buy(
            buyer,
            token,
            h.settlement,
            2 * common::ONE,
            everbid::VenueLabel::ConstantProduct,
            0,
        )
        .await
        .unwrap();

    // The permit binds the signer; the new owner never authorized carol
    assert!(matches!(
        h.market.permit(token, carol, 0, 2_000, sig).await,
        Err(MarketError::Permit(PermitError::InvalidSignature))
    ));
}
