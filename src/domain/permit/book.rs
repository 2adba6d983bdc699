//! Permit verification and nonce state

use super::digest::PermitDomain;
use crate::shared::errors::PermitError;
use crate::shared::types::TokenId;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashSet;
use tracing::debug;

/// Verifies off-chain-signed delegation grants and tracks consumed nonces.
/// Nonces are caller-supplied and single-use per owner; they are marked
/// consumed only by successful verification and never derived from the
/// signature itself.
pub struct PermitBook {
    domain: PermitDomain,
    consumed: HashSet<(Pubkey, u64)>,
}

impl PermitBook {
    pub fn new(domain: PermitDomain) -> Self {
        Self {
            domain,
            consumed: HashSet::new(),
        }
    }

    pub fn domain(&self) -> &PermitDomain {
        &self.domain
    }

    pub fn is_consumed(&self, owner: &Pubkey, nonce: u64) -> bool {
        self.consumed.contains(&(*owner, nonce))
    }

    /// Full permit check: deadline, replay, then signature against the
    /// resource's current owner. Replay is checked before the signature so
    /// a consumed nonce always surfaces as `NonceReplay` regardless of
    /// signature validity. The nonce is consumed only when every check
    /// passed.
    pub fn verify(
        &mut self,
        owner: &Pubkey,
        token: &TokenId,
        spender: &Pubkey,
        nonce: u64,
        deadline: i64,
        signature: &Signature,
        now: i64,
    ) -> Result<(), PermitError> {
        if now > deadline {
            return Err(PermitError::Expired);
        }
        if self.is_consumed(owner, nonce) {
            return Err(PermitError::NonceReplay);
        }
        let digest = self.domain.permit_digest(token, spender, nonce, deadline);
        if !signature.verify(owner.as_ref(), digest.as_ref()) {
            return Err(PermitError::InvalidSignature);
        }
        self.consumed.insert((*owner, nonce));
        debug!(%owner, nonce, "permit nonce consumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    fn setup() -> (PermitBook, Keypair, TokenId, Pubkey) {
        let domain = PermitDomain::new(1, Pubkey::new_unique());
        (
            PermitBook::new(domain),
            Keypair::new(),
            TokenId([5u8; 32]),
            Pubkey::new_unique(),
        )
    }

    fn sign(book: &PermitBook, owner: &Keypair, token: &TokenId, spender: &Pubkey, nonce: u64, deadline: i64) -> Signature {
        let digest = book.domain().permit_digest(token, spender, nonce, deadline);
        owner.sign_message(digest.as_ref())
    }

    #[test]
    fn test_valid_permit_consumes_nonce() {
        let (mut book, owner, token, spender) = setup();
        let sig = sign(&book, &owner, &token, &spender, 0, 100);

        book.verify(&owner.pubkey(), &token, &spender, 0, 100, &sig, 50)
            .unwrap();
        assert!(book.is_consumed(&owner.pubkey(), 0));
    }

    #[test]
    fn test_expired_permit_fails_even_with_valid_signature() {
        let (mut book, owner, token, spender) = setup();
        let sig = sign(&book, &owner, &token, &spender, 0, 100);

        assert_eq!(
            book.verify(&owner.pubkey(), &token, &spender, 0, 100, &sig, 101),
            Err(PermitError::Expired)
        );
        assert!(!book.is_consumed(&owner.pubkey(), 0));
    }

    #[test]
    fn test_replayed_nonce_fails_regardless_of_signature() {
        let (mut book, owner, token, spender) = setup();
        let sig = sign(&book, &owner, &token, &spender, 0, 100);
        book.verify(&owner.pubkey(), &token, &spender, 0, 100, &sig, 50)
            .unwrap();

        // Same valid signature
        assert_eq!(
            book.verify(&owner.pubkey(), &token, &spender, 0, 100, &sig, 50),
            Err(PermitError::NonceReplay)
        );
        // Garbage signature, same nonce
        let garbage = Signature::from([1u8; 64]);
        assert_eq!(
            book.verify(&owner.pubkey(), &token, &spender, 0, 100, &garbage, 50),
            Err(PermitError::NonceReplay)
        );
    }

    #[test]
    fn test_non_owner_signature_rejected() {
        let (mut book, owner, token, spender) = setup();
        let mallory = Keypair::new();
        let sig = sign(&book, &mallory, &token, &spender, 0, 100);

        assert_eq!(
            book.verify(&owner.pubkey(), &token, &spender, 0, 100, &sig, 50),
            Err(PermitError::InvalidSignature)
        );
        assert!(!book.is_consumed(&owner.pubkey(), 0));
    }

    #[test]
    fn test_signature_does_not_cover_other_message() {
        let (mut book, owner, token, spender) = setup();
        let sig = sign(&book, &owner, &token, &spender, 0, 100);

        // Tampered spender invalidates the digest
        assert_eq!(
            book.verify(&owner.pubkey(), &token, &Pubkey::new_unique(), 0, 100, &sig, 50),
            Err(PermitError::InvalidSignature)
        );
    }
}
