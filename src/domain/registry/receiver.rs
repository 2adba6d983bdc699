//! Receiver acceptance hooks

use crate::shared::types::TokenId;
use solana_sdk::pubkey::Pubkey;

/// Acknowledgement value a hook must return for the operation to proceed
pub const RECEIVER_ACK: [u8; 4] = *b"EVBD";

/// Optional acceptance callback a recipient can register. A registered hook
/// that returns anything other than [`RECEIVER_ACK`] fails the whole
/// transfer or approval with `Rejected`.
pub trait ReceiverHook: Send + Sync {
    fn on_token_received(&self, token: TokenId, from: Pubkey, to: Pubkey) -> [u8; 4];
}

/// Hook that accepts everything, useful as a default in tests and demos
pub struct AcceptAll;

impl ReceiverHook for AcceptAll {
    fn on_token_received(&self, _token: TokenId, _from: Pubkey, _to: Pubkey) -> [u8; 4] {
        RECEIVER_ACK
    }
}
