//! Delegated authorization (permit) subsystem

pub mod book;
pub mod digest;

pub use book::PermitBook;
pub use digest::{PermitDomain, PERMIT_DOMAIN_NAME, PERMIT_DOMAIN_VERSION};
