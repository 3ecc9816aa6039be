//! Checked U256 arithmetic at the wad (1e18) and ray (1e27) scales.
//!
//! Mirrors the fixed-point library used by the on-chain pool bit-for-bit:
//! multiply and divide round half-up at the target scale, ray→wad scales
//! down through the 1e9 ratio with the same rounding, and every operation
//! errors on overflow instead of wrapping. A single rounding-unit drift
//! here compounds over accrual periods into wrong balances, so the
//! formulas below are not negotiable.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::constants::{HALF_RAY, RAY, USD_DECIMALS, WAD, WAD_RAY_RATIO};
use crate::error::MathError;

const WAD_SCALE: Decimal = dec!(1_000_000_000_000_000_000);
const RAY_SCALE: Decimal = dec!(1_000_000_000_000_000_000_000_000_000);

/// `(a * b + HALF_RAY) / RAY` — ray-scale product, round half-up.
pub fn ray_mul(a: U256, b: U256) -> Result<U256, MathError> {
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    let rounded = product.checked_add(HALF_RAY).ok_or(MathError::Overflow)?;
    Ok(rounded / RAY)
}

/// `(a * RAY + b / 2) / b` — ray-scale quotient, round half-up.
pub fn ray_div(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let scaled = a.checked_mul(RAY).ok_or(MathError::Overflow)?;
    let rounded = scaled
        .checked_add(b / U256::from(2))
        .ok_or(MathError::Overflow)?;
    Ok(rounded / b)
}

/// Scale a wad value up to ray (multiply by 1e9).
pub fn wad_to_ray(a: U256) -> Result<U256, MathError> {
    a.checked_mul(WAD_RAY_RATIO).ok_or(MathError::Overflow)
}

/// Scale a ray value down to wad (divide by 1e9, round half-up).
pub fn ray_to_wad(a: U256) -> Result<U256, MathError> {
    let half_ratio = WAD_RAY_RATIO / U256::from(2);
    let rounded = a.checked_add(half_ratio).ok_or(MathError::Overflow)?;
    Ok(rounded / WAD_RAY_RATIO)
}

/// Truncated binomial expansion of `(1 + base)^exp` at ray scale.
///
/// The on-chain pool approximates compound interest with the first three
/// binomial terms instead of a true power (a gas optimisation):
///
/// ```text
/// (1+x)^n ≈ 1 + n·x + n·(n-1)·x²/2 + n·(n-1)·(n-2)·x³/6
/// ```
///
/// The truncation order and the floored integer divisions by 2 and 6 must
/// match the contracts exactly — a higher-order or rounded variant passes
/// short-delta tests but drifts under long time deltas or high rates.
pub fn binomial_approximated_ray_pow(base: U256, exp: U256) -> Result<U256, MathError> {
    if exp.is_zero() {
        return Ok(RAY);
    }

    let exp_minus_one = exp - U256::from(1);
    let exp_minus_two = if exp > U256::from(2) {
        exp - U256::from(2)
    } else {
        U256::ZERO
    };

    let base_power_two = ray_mul(base, base)?;
    let base_power_three = ray_mul(base_power_two, base)?;

    let first_term = exp.checked_mul(base).ok_or(MathError::Overflow)?;
    let second_term = exp
        .checked_mul(exp_minus_one)
        .and_then(|v| v.checked_mul(base_power_two))
        .ok_or(MathError::Overflow)?
        / U256::from(2);
    let third_term = exp
        .checked_mul(exp_minus_one)
        .and_then(|v| v.checked_mul(exp_minus_two))
        .and_then(|v| v.checked_mul(base_power_three))
        .ok_or(MathError::Overflow)?
        / U256::from(6);

    RAY.checked_add(first_term)
        .and_then(|v| v.checked_add(second_term))
        .and_then(|v| v.checked_add(third_term))
        .ok_or(MathError::Overflow)
}

// ---------------------------------------------------------------------------
// Free-standing conversion helpers
// ---------------------------------------------------------------------------
//
// Lossy projections for display and thresholding only — never feed these
// back into the accrual pipeline. Values beyond Decimal's 28-digit
// mantissa collapse to zero, which is acceptable for the small-magnitude
// ratios (health factors, rates) they are meant for.

/// Convert a wad-scaled U256 to an off-chain `Decimal`.
pub fn wad_to_decimal(wad: U256) -> Decimal {
    let raw = Decimal::from_str(&wad.to_string()).unwrap_or_default();
    raw / WAD_SCALE
}

/// Like [`wad_to_decimal`], but a value beyond `Decimal`'s mantissa
/// saturates to `Decimal::MAX` instead of collapsing to zero. Used for
/// ratios where a huge value means "effectively unbounded" and zero
/// would invert the meaning (health factors).
pub fn wad_to_decimal_saturating(wad: U256) -> Decimal {
    Decimal::from_str(&wad.to_string())
        .map(|raw| raw / WAD_SCALE)
        .unwrap_or(Decimal::MAX)
}

/// Convert a ray-scaled U256 to an off-chain `Decimal`.
pub fn ray_to_decimal(ray: U256) -> Decimal {
    let raw = Decimal::from_str(&ray.to_string()).unwrap_or_default();
    raw / RAY_SCALE
}

/// Convert a USD amount at the oracle's quote precision to `Decimal`.
pub fn usd_to_decimal(raw: U256) -> Decimal {
    let raw_dec = Decimal::from_str(&raw.to_string()).unwrap_or_default();
    raw_dec / Decimal::from(10u64.pow(USD_DECIMALS))
}

/// Convert a ray-scaled rate to an APR percentage (× 100).
pub fn ray_to_apr_percent(rate: U256) -> Decimal {
    ray_to_decimal(rate) * dec!(100)
}
