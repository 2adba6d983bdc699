//! Ownership and delegation facts

use super::receiver::{ReceiverHook, RECEIVER_ACK};
use crate::shared::errors::RegistryError;
use crate::shared::types::TokenId;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Tracks, per token, exactly one owner and at most one delegated approver.
/// Grant and revoke are the only mutators of either fact.
pub struct OwnershipRegistry {
    owners: HashMap<TokenId, Pubkey>,
    approvals: HashMap<TokenId, Pubkey>,
    hooks: HashMap<Pubkey, Arc<dyn ReceiverHook>>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
            approvals: HashMap::new(),
            hooks: HashMap::new(),
        }
    }

    // --- capability grants ---

    /// Idempotent ownership grant
    pub fn grant_ownership(&mut self, token: TokenId, address: Pubkey) {
        self.owners.insert(token, address);
    }

    /// Idempotent ownership revoke; removes the delegation with it
    pub fn revoke_ownership(&mut self, token: TokenId, address: Pubkey) {
        if self.owners.get(&token) == Some(&address) {
            self.owners.remove(&token);
            self.approvals.remove(&token);
        }
    }

    pub fn register_hook(&mut self, address: Pubkey, hook: Arc<dyn ReceiverHook>) {
        self.hooks.insert(address, hook);
    }

    // --- reads ---

    pub fn owner_of(&self, token: &TokenId) -> Option<Pubkey> {
        self.owners.get(token).copied()
    }

    pub fn is_owner(&self, token: &TokenId, address: &Pubkey) -> bool {
        self.owners.get(token) == Some(address)
    }

    pub fn approved_of(&self, token: &TokenId) -> Option<Pubkey> {
        self.approvals.get(token).copied()
    }

    pub fn is_approved(&self, token: &TokenId, address: &Pubkey) -> bool {
        self.approvals.get(token) == Some(address)
    }

    // --- operations ---

    /// Runs the recipient's acceptance hook when one is registered
    pub fn check_receiver(
        &self,
        token: TokenId,
        from: Pubkey,
        to: Pubkey,
    ) -> Result<(), RegistryError> {
        if let Some(hook) = self.hooks.get(&to) {
            if hook.on_token_received(token, from, to) != RECEIVER_ACK {
                return Err(RegistryError::Rejected);
            }
        }
        Ok(())
    }

    /// Delegated transfer. The caller must hold the delegation for `token`;
    /// on success ownership moves atomically and the delegation is consumed.
    pub fn transfer(
        &mut self,
        token: TokenId,
        from: Pubkey,
        to: Pubkey,
        caller: Pubkey,
    ) -> Result<(), RegistryError> {
        let owner = self.owner_of(&token).ok_or(RegistryError::UnknownResource)?;
        if owner != from {
            return Err(RegistryError::NotOwner);
        }
        if to == Pubkey::default() {
            return Err(RegistryError::ZeroRecipient);
        }
        if !self.is_approved(&token, &caller) {
            return Err(RegistryError::NotApproved);
        }
        self.check_receiver(token, from, to)?;

        self.owners.insert(token, to);
        self.approvals.remove(&token);
        debug!(token = %token, %from, %to, "ownership transferred");
        Ok(())
    }

    /// Owner-issued delegation grant; replaces any uncleared delegation
    pub fn approve(
        &mut self,
        token: TokenId,
        spender: Pubkey,
        caller: Pubkey,
    ) -> Result<(), RegistryError> {
        let owner = self.owner_of(&token).ok_or(RegistryError::UnknownResource)?;
        if owner != caller {
            return Err(RegistryError::NotOwner);
        }
        self.check_receiver(token, owner, spender)?;
        self.approvals.insert(token, spender);
        debug!(token = %token, %spender, "delegation granted");
        Ok(())
    }

    /// Delegation grant on behalf of the owner, used by the permit flow
    /// after signature verification
    pub fn grant_approval(&mut self, token: TokenId, spender: Pubkey) -> Result<(), RegistryError> {
        let owner = self.owner_of(&token).ok_or(RegistryError::UnknownResource)?;
        self.check_receiver(token, owner, spender)?;
        self.approvals.insert(token, spender);
        Ok(())
    }

    /// Ownership move without a delegation check, used by the buy flow
    /// where payment stands in for authorization. Receiver acceptance must
    /// have been checked beforehand.
    pub fn move_ownership(&mut self, token: TokenId, to: Pubkey) -> Result<(), RegistryError> {
        if !self.owners.contains_key(&token) {
            return Err(RegistryError::UnknownResource);
        }
        if to == Pubkey::default() {
            return Err(RegistryError::ZeroRecipient);
        }
        self.owners.insert(token, to);
        self.approvals.remove(&token);
        Ok(())
    }

    /// Permanent removal of all facts for a token
    pub fn clear(&mut self, token: &TokenId) {
        self.owners.remove(token);
        self.approvals.remove(token);
    }
}

impl Default for OwnershipRegistry {
    fn default() -> Self {
        Self::new()
    }
}
