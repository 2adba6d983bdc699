//! Ownership and delegation registry

pub mod ownership;
pub mod receiver;

pub use ownership::OwnershipRegistry;
pub use receiver::{AcceptAll, ReceiverHook, RECEIVER_ACK};
