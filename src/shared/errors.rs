//! Error handling for the application

use thiserror::Error;

/// Ownership and delegation registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown resource")]
    UnknownResource,

    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Caller does not hold a delegation for this resource")]
    NotApproved,

    #[error("Recipient is the zero address")]
    ZeroRecipient,

    #[error("Receiver hook rejected the resource")]
    Rejected,
}

/// Pricing and fee engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unknown resource")]
    UnknownResource,

    #[error("Payment does not exceed the last price")]
    InsufficientPayment,

    #[error("Resulting price is below the minimum increment")]
    BelowMinimumIncrement,

    #[error("Arithmetic overflow in fee computation")]
    Overflow,
}

/// Conversion and venue errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Venue not supported: {0}")]
    UnsupportedVenue(String),

    #[error("Slippage tolerance exceeded: got {got}, wanted at least {min_out}")]
    SlippageExceeded { got: u64, min_out: u64 },

    #[error("Asset pair not present in pool")]
    PairNotInPool,

    #[error("No pool with sufficient liquidity")]
    NoLiquidity,

    #[error("Slippage tolerance above 100%: {0} bps")]
    InvalidTolerance(u64),

    #[error("Venue call failed: {0}")]
    VenueUnavailable(String),

    #[error("Arithmetic overflow in swap math")]
    Overflow,
}

/// Delegated authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermitError {
    #[error("Permit deadline has passed")]
    Expired,

    #[error("Signature does not verify against the resource owner")]
    InvalidSignature,

    #[error("Nonce already consumed")]
    NonceReplay,
}

/// General market error surfaced by the public entry points
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Caller lacks the required capability")]
    Unauthorized,

    #[error("Market is paused")]
    Paused,

    #[error("Re-entrant call rejected")]
    ReentrantCall,

    #[error("Settlement payout failed: {0}")]
    TransferFailed(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Permit(#[from] PermitError),
}
