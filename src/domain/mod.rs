//! Domain layer: registry, pricing and authorization

pub mod permit;
pub mod pricing;
pub mod registry;
pub mod token;
