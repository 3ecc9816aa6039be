//! Hypothetical post-action rate projection.
//!
//! Answers "what would this reserve's rates be after depositing or
//! borrowing X" without touching the accrual pipeline. All arithmetic is
//! ray-scale; amounts are in the reserve's native units.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::constants::RAY;
use crate::error::MathError;
use crate::math::wad_ray::{ray_div, ray_mul};

/// Borrow-rate flavour of the hypothetical borrow amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestRateMode {
    Stable,
    Variable,
}

/// Rate-curve parameters and current totals of one reserve.
///
/// Both pool generations project rates through the same curve; the
/// legacy reserve carries these fields directly, the scaled reserve
/// derives its totals via `scaled::accrual::calculate_supplies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateProjectionInput {
    /// Kink point of the utilization curve (ray).
    pub optimal_utilisation_rate: U256,
    /// Variable-rate intercept (ray).
    pub base_variable_borrow_rate: U256,
    /// Variable-rate slope below the kink (ray).
    pub variable_rate_slope1: U256,
    /// Variable-rate slope above the kink (ray).
    pub variable_rate_slope2: U256,
    /// Stable-rate slope below the kink (ray).
    pub stable_rate_slope1: U256,
    /// Stable-rate slope above the kink (ray).
    pub stable_rate_slope2: U256,
    /// Reserve's current base stable borrow rate (ray).
    pub stable_borrow_rate: U256,
    /// Average rate across outstanding stable debt (ray).
    pub average_stable_borrow_rate: U256,
    /// Outstanding stable debt, native units.
    pub total_borrows_stable: U256,
    /// Outstanding variable debt, native units.
    pub total_borrows_variable: U256,
    /// Total deposits, native units.
    pub total_liquidity: U256,
}

/// Instantaneous rates after the hypothetical action, all ray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedRates {
    pub variable_borrow_rate: U256,
    pub stable_borrow_rate: U256,
    pub liquidity_rate: U256,
}

/// Project the reserve's rates after adding `amount_to_deposit` to the
/// deposit side and `amount_to_borrow` to the `mode` debt side.
///
/// Zero total deposits and a zero kink point are both degenerate inputs,
/// not errors: the affected term contributes zero.
pub fn project_interest_rates(
    reserve: &RateProjectionInput,
    amount_to_deposit: U256,
    amount_to_borrow: U256,
    mode: InterestRateMode,
) -> Result<ComputedRates, MathError> {
    let stable_extra = match mode {
        InterestRateMode::Stable => amount_to_borrow,
        InterestRateMode::Variable => U256::ZERO,
    };
    let variable_extra = amount_to_borrow - stable_extra;

    let total_borrows_stable = reserve
        .total_borrows_stable
        .checked_add(stable_extra)
        .ok_or(MathError::Overflow)?;
    let total_borrows_variable = reserve
        .total_borrows_variable
        .checked_add(variable_extra)
        .ok_or(MathError::Overflow)?;
    let total_borrows = total_borrows_stable
        .checked_add(total_borrows_variable)
        .ok_or(MathError::Overflow)?;
    let total_deposits = reserve
        .total_liquidity
        .checked_add(amount_to_deposit)
        .ok_or(MathError::Overflow)?;

    let utilization_rate = if total_deposits.is_zero() {
        U256::ZERO
    } else {
        ray_div(total_borrows, total_deposits)?
    };

    let mut current_stable_borrow_rate = reserve.stable_borrow_rate;
    let current_variable_borrow_rate;
    let mut current_liquidity_rate = U256::ZERO;

    if utilization_rate > reserve.optimal_utilisation_rate {
        let excess_denominator = RAY.saturating_sub(reserve.optimal_utilisation_rate);
        let excess_utilization_ratio = if excess_denominator.is_zero() {
            U256::ZERO
        } else {
            ray_div(
                utilization_rate - reserve.optimal_utilisation_rate,
                excess_denominator,
            )?
        };

        let stable_excess = ray_mul(excess_utilization_ratio, reserve.stable_rate_slope2)?;
        let variable_excess = ray_mul(excess_utilization_ratio, reserve.variable_rate_slope2)?;

        current_stable_borrow_rate = current_stable_borrow_rate
            .checked_add(reserve.stable_rate_slope1)
            .and_then(|v| v.checked_add(stable_excess))
            .ok_or(MathError::Overflow)?;
        current_variable_borrow_rate = reserve
            .base_variable_borrow_rate
            .checked_add(reserve.variable_rate_slope1)
            .and_then(|v| v.checked_add(variable_excess))
            .ok_or(MathError::Overflow)?;
    } else {
        let utilization_ratio = if reserve.optimal_utilisation_rate.is_zero() {
            U256::ZERO
        } else {
            ray_div(utilization_rate, reserve.optimal_utilisation_rate)?
        };

        // Below the kink the stable curve grows from zero; the reserve's
        // base stable rate only enters above the kink.
        current_stable_borrow_rate = ray_mul(utilization_ratio, reserve.stable_rate_slope1)?;
        current_variable_borrow_rate = reserve
            .base_variable_borrow_rate
            .checked_add(ray_mul(utilization_ratio, reserve.variable_rate_slope1)?)
            .ok_or(MathError::Overflow)?;
    }

    if !total_borrows.is_zero() {
        let weighted_variable = current_variable_borrow_rate
            .checked_mul(total_borrows_variable)
            .ok_or(MathError::Overflow)?;
        let weighted_stable = reserve
            .average_stable_borrow_rate
            .checked_mul(total_borrows_stable)
            .ok_or(MathError::Overflow)?;
        current_liquidity_rate = weighted_variable
            .checked_add(weighted_stable)
            .ok_or(MathError::Overflow)?
            / total_borrows;
    }

    Ok(ComputedRates {
        variable_borrow_rate: current_variable_borrow_rate,
        stable_borrow_rate: current_stable_borrow_rate,
        liquidity_rate: current_liquidity_rate,
    })
}
