//! Checked integer math for fees, increments and swap estimates

use crate::shared::errors::ConversionError;

/// Basis point denominator (parts per ten thousand)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// value * numerator / denominator, widened through u128, truncating
pub fn mul_div(value: u64, numerator: u64, denominator: u64) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    let wide = (value as u128).checked_mul(numerator as u128)? / denominator as u128;
    u64::try_from(wide).ok()
}

/// Basis-point share of an amount, truncating toward zero
pub fn bps_of(amount: u64, bps: u64) -> Option<u64> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

/// Constant-product output: dy = dx' * y / (x + dx') where dx' is dx after pool fee
pub fn constant_product_out(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u64,
) -> Result<u64, ConversionError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ConversionError::NoLiquidity);
    }
    if fee_bps >= BPS_DENOMINATOR {
        return Err(ConversionError::Overflow);
    }
    let dx = bps_of(amount_in, BPS_DENOMINATOR - fee_bps).ok_or(ConversionError::Overflow)?;
    let numerator = (dx as u128)
        .checked_mul(reserve_out as u128)
        .ok_or(ConversionError::Overflow)?;
    let denominator = (reserve_in as u128)
        .checked_add(dx as u128)
        .ok_or(ConversionError::Overflow)?;
    u64::try_from(numerator / denominator).map_err(|_| ConversionError::Overflow)
}

/// Minimum acceptable output for an expected amount under a slippage tolerance
pub fn min_out_for_tolerance(expected: u64, tolerance_bps: u64) -> Result<u64, ConversionError> {
    if tolerance_bps > BPS_DENOMINATOR {
        return Err(ConversionError::InvalidTolerance(tolerance_bps));
    }
    bps_of(expected, BPS_DENOMINATOR - tolerance_bps).ok_or(ConversionError::Overflow)
}
