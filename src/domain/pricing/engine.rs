//! Ascending-price fee engine

use crate::shared::errors::PricingError;
use crate::shared::math::{bps_of, mul_div, BPS_DENOMINATOR};
use crate::shared::types::{FeeConfig, TokenId};
use std::collections::HashMap;
use tracing::debug;

/// Fee and increment ratios, fixed at construction
#[derive(Debug, Clone, Copy)]
pub struct FeeSchedule {
    pub fee_bps: u64,
    pub premium_bps: u64,
    pub increment_bps: u64,
}

impl From<FeeConfig> for FeeSchedule {
    fn from(cfg: FeeConfig) -> Self {
        Self {
            fee_bps: cfg.fee_bps,
            premium_bps: cfg.premium_bps,
            increment_bps: cfg.increment_bps,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeConfig::default().into()
    }
}

/// Proceeds split for a completed sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleBreakdown {
    pub protocol_fee: u64,
    pub seller_premium: u64,
    pub new_price: u64,
    /// Prior owner receives last price plus the premium
    pub seller_payout: u64,
}

/// Fee skim applied when a resource is first registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintBreakdown {
    pub protocol_fee: u64,
    pub initial_price: u64,
}

/// Holds the recorded last price per token and computes the fee splits.
/// Quoting is pure; commits are explicit so callers can settle payouts
/// before mutating anything.
pub struct PriceBook {
    schedule: FeeSchedule,
    prices: HashMap<TokenId, u64>,
}

impl PriceBook {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self {
            schedule,
            prices: HashMap::new(),
        }
    }

    pub fn schedule(&self) -> FeeSchedule {
        self.schedule
    }

    pub fn exists(&self, token: &TokenId) -> bool {
        self.prices.contains_key(token)
    }

    pub fn last_price(&self, token: &TokenId) -> Result<u64, PricingError> {
        self.prices
            .get(token)
            .copied()
            .ok_or(PricingError::UnknownResource)
    }

    /// lastPrice * (1 + increment_bps / 10_000)
    pub fn next_minimum_price(&self, token: &TokenId) -> Result<u64, PricingError> {
        let last = self.last_price(token)?;
        mul_div(
            last,
            BPS_DENOMINATOR + self.schedule.increment_bps,
            BPS_DENOMINATOR,
        )
        .ok_or(PricingError::Overflow)
    }

    /// Fee split for registering a new resource at amount `paid`.
    /// No seller exists yet, so only the protocol fee is skimmed.
    pub fn quote_mint(&self, paid: u64) -> Result<MintBreakdown, PricingError> {
        if paid == 0 {
            return Err(PricingError::InsufficientPayment);
        }
        let protocol_fee = bps_of(paid, self.schedule.fee_bps).ok_or(PricingError::Overflow)?;
        let initial_price = paid
            .checked_sub(protocol_fee)
            .ok_or(PricingError::Overflow)?;
        Ok(MintBreakdown {
            protocol_fee,
            initial_price,
        })
    }

    pub fn commit_mint(&mut self, token: TokenId, breakdown: &MintBreakdown) {
        self.prices.insert(token, breakdown.initial_price);
        debug!(token = %token, price = breakdown.initial_price, "initial price recorded");
    }

    /// Fee split for a sale at settlement amount `paid` against the
    /// recorded last price. Pure: nothing is mutated until `commit_sale`.
    pub fn quote_sale(&self, token: &TokenId, paid: u64) -> Result<SaleBreakdown, PricingError> {
        let last = self.last_price(token)?;
        if paid <= last {
            return Err(PricingError::InsufficientPayment);
        }
        let spread = paid - last;
        let protocol_fee = bps_of(spread, self.schedule.fee_bps).ok_or(PricingError::Overflow)?;
        let seller_premium =
            bps_of(spread, self.schedule.premium_bps).ok_or(PricingError::Overflow)?;
        let new_price = paid
            .checked_sub(protocol_fee)
            .and_then(|v| v.checked_sub(seller_premium))
            .ok_or(PricingError::Overflow)?;

        if new_price < self.next_minimum_price(token)? {
            return Err(PricingError::BelowMinimumIncrement);
        }
        let seller_payout = last
            .checked_add(seller_premium)
            .ok_or(PricingError::Overflow)?;

        Ok(SaleBreakdown {
            protocol_fee,
            seller_premium,
            new_price,
            seller_payout,
        })
    }

    /// Sets (not accumulates) the recorded last price
    pub fn commit_sale(&mut self, token: TokenId, breakdown: &SaleBreakdown) {
        self.prices.insert(token, breakdown.new_price);
        debug!(token = %token, price = breakdown.new_price, "last price updated");
    }

    pub fn remove(&mut self, token: &TokenId) {
        self.prices.remove(token);
    }
}
