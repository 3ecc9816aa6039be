//! Scaled (v2) supply-side accrual.
//!
//! The pool stores scaled quantities; live totals are the scaled amounts
//! times their projected indices. Variable debt compounds at the reserve
//! rate from the reserve's last update, stable debt at the average stable
//! rate from the stable-debt update instant.

use alloy::primitives::U256;

use crate::error::MathError;
use crate::math::pool_math::calculate_compounded_interest;
use crate::math::wad_ray::{ray_div, ray_mul};
use crate::rates::RateProjectionInput;
use crate::scaled::types::{ReserveData, ReserveSupplyData, Supplies};

impl ReserveData {
    /// The supply-relevant slice of this snapshot.
    pub fn supply_data(&self) -> ReserveSupplyData {
        ReserveSupplyData {
            total_scaled_variable_debt: self.total_scaled_variable_debt,
            variable_borrow_index: self.variable_borrow_index,
            variable_borrow_rate: self.variable_borrow_rate,
            total_principal_stable_debt: self.total_principal_stable_debt,
            average_stable_rate: self.average_stable_rate,
            available_liquidity: self.available_liquidity,
            stable_debt_last_update_timestamp: self.stable_debt_last_update_timestamp,
            last_update_timestamp: self.last_update_timestamp,
        }
    }
}

/// Live variable and stable debt totals at `current_timestamp`, native
/// units.
pub fn calculate_reserve_debt(
    reserve: &ReserveSupplyData,
    current_timestamp: u64,
) -> Result<(U256, U256), MathError> {
    let total_variable_debt = ray_mul(
        ray_mul(
            reserve.total_scaled_variable_debt,
            reserve.variable_borrow_index,
        )?,
        calculate_compounded_interest(
            reserve.variable_borrow_rate,
            current_timestamp,
            reserve.last_update_timestamp,
        )?,
    )?;
    let total_stable_debt = ray_mul(
        reserve.total_principal_stable_debt,
        calculate_compounded_interest(
            reserve.average_stable_rate,
            current_timestamp,
            reserve.stable_debt_last_update_timestamp,
        )?,
    )?;
    Ok((total_variable_debt, total_stable_debt))
}

/// Live supply totals: debt sides plus available liquidity.
pub fn calculate_supplies(
    reserve: &ReserveSupplyData,
    current_timestamp: u64,
) -> Result<Supplies, MathError> {
    let (total_variable_debt, total_stable_debt) =
        calculate_reserve_debt(reserve, current_timestamp)?;

    let total_debt = total_variable_debt
        .checked_add(total_stable_debt)
        .ok_or(MathError::Overflow)?;
    let total_liquidity = total_debt
        .checked_add(reserve.available_liquidity)
        .ok_or(MathError::Overflow)?;

    Ok(Supplies {
        total_variable_debt,
        total_stable_debt,
        total_liquidity,
    })
}

/// Curve parameters and live totals for hypothetical rate projection.
pub fn rate_projection_input(
    reserve: &ReserveData,
    current_timestamp: u64,
) -> Result<RateProjectionInput, MathError> {
    let supplies = calculate_supplies(&reserve.supply_data(), current_timestamp)?;
    Ok(RateProjectionInput {
        optimal_utilisation_rate: reserve.optimal_utilisation_rate,
        base_variable_borrow_rate: reserve.base_variable_borrow_rate,
        variable_rate_slope1: reserve.variable_rate_slope1,
        variable_rate_slope2: reserve.variable_rate_slope2,
        stable_rate_slope1: reserve.stable_rate_slope1,
        stable_rate_slope2: reserve.stable_rate_slope2,
        stable_borrow_rate: reserve.stable_borrow_rate,
        average_stable_borrow_rate: reserve.average_stable_rate,
        total_borrows_stable: supplies.total_stable_debt,
        total_borrows_variable: supplies.total_variable_debt,
        total_liquidity: supplies.total_liquidity,
    })
}

/// Scaled total supply of the deposit side: live liquidity divided back
/// by the liquidity index. This is the denominator the incentives
/// controller distributes deposit emissions over.
pub fn scaled_total_supply(
    total_liquidity: U256,
    liquidity_index: U256,
) -> Result<U256, MathError> {
    ray_div(total_liquidity, liquidity_index)
}
