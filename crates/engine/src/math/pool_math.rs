//! Interest accrual and risk arithmetic shared by both pool generations.
//!
//! Pure functions over snapshot values — no I/O, no clock reads. Callers
//! supply `current_timestamp` and must hold it constant across every
//! sub-computation of one aggregation pass.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::{pow10, LTV_PRECISION, RAY, SECONDS_PER_YEAR, WAD};
use crate::error::MathError;
use crate::math::wad_ray::{
    binomial_approximated_ray_pow, ray_div, ray_mul, ray_to_wad, wad_to_decimal,
    wad_to_decimal_saturating, wad_to_ray,
};

fn time_delta(current_timestamp: u64, last_update_timestamp: u64) -> Result<u64, MathError> {
    current_timestamp
        .checked_sub(last_update_timestamp)
        .ok_or(MathError::NegativeTimeDelta {
            last_update: last_update_timestamp,
            current: current_timestamp,
        })
}

/// Compounded growth factor for `rate` (ray, per year) over the elapsed
/// seconds, using the on-chain truncated binomial series.
///
/// A zero time delta yields exactly RAY — no interest for no elapsed time.
pub fn calculate_compounded_interest(
    rate: U256,
    current_timestamp: u64,
    last_update_timestamp: u64,
) -> Result<U256, MathError> {
    let delta = time_delta(current_timestamp, last_update_timestamp)?;
    let rate_per_second = rate / U256::from(SECONDS_PER_YEAR);
    binomial_approximated_ray_pow(rate_per_second, U256::from(delta))
}

/// Linear growth factor: `RAY + rate · (elapsed / SECONDS_PER_YEAR)`.
pub fn calculate_linear_interest(
    rate: U256,
    current_timestamp: u64,
    last_update_timestamp: u64,
) -> Result<U256, MathError> {
    let delta = time_delta(current_timestamp, last_update_timestamp)?;
    let delta_ray = wad_to_ray(U256::from(delta))?;
    let year_fraction = ray_div(delta_ray, wad_to_ray(U256::from(SECONDS_PER_YEAR))?)?;
    ray_mul(rate, year_fraction)?
        .checked_add(RAY)
        .ok_or(MathError::Overflow)
}

/// Liquidity index projected to `current_timestamp` by linear accrual.
///
/// A zero liquidity rate leaves the stored index untouched.
pub fn get_reserve_normalized_income(
    rate: U256,
    index: U256,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if rate.is_zero() {
        return Ok(index);
    }
    let cumulated = calculate_linear_interest(rate, current_timestamp, last_update_timestamp)?;
    ray_mul(cumulated, index)
}

/// Live underlying balance of a scaled deposit: scaled amount × projected
/// liquidity index, returned at the principal's own scale.
pub fn get_linear_balance(
    balance: U256,
    index: U256,
    rate: U256,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    let income =
        get_reserve_normalized_income(rate, index, last_update_timestamp, current_timestamp)?;
    ray_to_wad(ray_mul(wad_to_ray(balance)?, income)?)
}

/// Live variable debt: scaled debt × variable index × compounded growth
/// since the reserve's last update.
pub fn get_compounded_balance(
    principal_balance: U256,
    reserve_index: U256,
    reserve_rate: U256,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if principal_balance.is_zero() {
        return Ok(U256::ZERO);
    }
    let compounded =
        calculate_compounded_interest(reserve_rate, current_timestamp, last_update_timestamp)?;
    let cumulated = ray_mul(compounded, reserve_index)?;
    ray_to_wad(ray_mul(wad_to_ray(principal_balance)?, cumulated)?)
}

/// Live stable debt: principal compounded at the position's own fixed
/// rate from the position's own last-update instant. No reserve index.
pub fn get_compounded_stable_balance(
    principal_balance: U256,
    user_stable_rate: U256,
    last_update_timestamp: u64,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if principal_balance.is_zero() {
        return Ok(U256::ZERO);
    }
    let cumulated =
        calculate_compounded_interest(user_stable_rate, current_timestamp, last_update_timestamp)?;
    ray_to_wad(ray_mul(wad_to_ray(principal_balance)?, cumulated)?)
}

/// Project a native-unit balance into base currency and the USD quote
/// unit: `base = balance · price / 10^decimals`,
/// `usd = base · 10^USD_DECIMALS / usd_price`, both floored.
pub fn base_and_usd_value(
    balance: U256,
    price_in_base: U256,
    decimals: u32,
    usd_price_base: U256,
) -> Result<(U256, U256), MathError> {
    let in_base = balance
        .checked_mul(price_in_base)
        .ok_or(MathError::Overflow)?
        / pow10(decimals);
    if usd_price_base.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let in_usd = in_base
        .checked_mul(pow10(crate::constants::USD_DECIMALS))
        .ok_or(MathError::Overflow)?
        / usd_price_base;
    Ok((in_base, in_usd))
}

/// Health factor from portfolio totals in base currency, with the
/// liquidation threshold in basis points.
///
/// Zero debt returns the sentinel `-1` ("no liquidation risk"), never a
/// division by zero.
pub fn calculate_health_factor_from_balances(
    collateral_balance_base: U256,
    borrow_balance_base: U256,
    current_liquidation_threshold: U256,
) -> Result<Decimal, MathError> {
    if borrow_balance_base.is_zero() {
        return Ok(dec!(-1));
    }
    let numerator = collateral_balance_base
        .checked_mul(current_liquidation_threshold)
        .and_then(|v| v.checked_mul(WAD))
        .ok_or(MathError::Overflow)?;
    let denominator = pow10(LTV_PRECISION)
        .checked_mul(borrow_balance_base)
        .ok_or(MathError::Overflow)?;
    Ok(wad_to_decimal_saturating(numerator / denominator))
}

/// Borrow headroom: `collateral · ltv - debt`, floored at zero. `ltv` in
/// basis points. Zero LTV yields zero headroom.
pub fn calculate_available_borrows(
    collateral_balance_base: U256,
    borrow_balance_base: U256,
    current_ltv: U256,
) -> Result<U256, MathError> {
    if current_ltv.is_zero() {
        return Ok(U256::ZERO);
    }
    let available = collateral_balance_base
        .checked_mul(current_ltv)
        .ok_or(MathError::Overflow)?
        / pow10(LTV_PRECISION);
    if available < borrow_balance_base {
        return Ok(U256::ZERO);
    }
    Ok(available - borrow_balance_base)
}

/// Annualised average rate implied by the growth of an index between two
/// snapshots: `(index1/index0 - 1) / elapsed · SECONDS_PER_YEAR`.
pub fn calculate_average_rate(
    index0: U256,
    index1: U256,
    timestamp0: u64,
    timestamp1: u64,
) -> Result<Decimal, MathError> {
    if index0.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let delta = time_delta(timestamp1, timestamp0)?;
    if delta == 0 {
        return Err(MathError::DivisionByZero);
    }
    let ratio_wad = index1
        .checked_mul(WAD)
        .ok_or(MathError::Overflow)?
        / index0;
    let growth = wad_to_decimal(ratio_wad) - dec!(1);
    Ok(growth / Decimal::from(delta) * Decimal::from(SECONDS_PER_YEAR))
}
