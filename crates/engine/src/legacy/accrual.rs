//! Legacy (v1) balance accrual.
//!
//! Deposits carry a per-user recorded balance index and an optional
//! interest redirection; debt carries the user's recorded variable index
//! or a per-position stable rate. Structurally distinct from the scaled
//! (v2) pipeline and kept separate on purpose — the two generations do
//! not share accrual semantics.

use alloy::primitives::{Address, U256};

use crate::error::MathError;
use crate::legacy::types::{BorrowRateMode, ReserveData, UserReserveData};
use crate::math::pool_math::{calculate_compounded_interest, get_reserve_normalized_income};
use crate::math::wad_ray::{ray_div, ray_mul, ray_to_wad, wad_to_ray};

/// Live debt of a legacy borrow position.
///
/// Variable positions compound at the reserve rate and are rebased from
/// the user's recorded variable index to the reserve's current one;
/// stable positions compound at their own fixed rate from their own
/// last-update instant.
pub fn get_compounded_borrow_balance(
    reserve: &ReserveData,
    user_reserve: &UserReserveData,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if user_reserve.principal_borrows.is_zero() {
        return Ok(U256::ZERO);
    }

    let cumulated_interest = match user_reserve.borrow_rate_mode {
        BorrowRateMode::Variable => {
            let compounded = calculate_compounded_interest(
                reserve.variable_borrow_rate,
                current_timestamp,
                reserve.last_update_timestamp,
            )?;
            ray_div(
                ray_mul(compounded, reserve.variable_borrow_index)?,
                user_reserve.variable_borrow_index,
            )?
        }
        // Stable (and the degenerate None) accrue at the position's own
        // rate from the position's own timestamp.
        BorrowRateMode::Stable | BorrowRateMode::None => calculate_compounded_interest(
            user_reserve.borrow_rate,
            current_timestamp,
            user_reserve.last_update_timestamp,
        )?,
    };

    let borrow_balance_ray = wad_to_ray(user_reserve.principal_borrows)?;
    ray_to_wad(ray_mul(borrow_balance_ray, cumulated_interest)?)
}

/// Accrue a deposit-side balance: scale by the projected liquidity
/// income, rebased from the user's recorded balance index.
pub fn calculate_cumulated_balance(
    balance: U256,
    user_balance_index: U256,
    reserve: &ReserveData,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    let normalized_income = get_reserve_normalized_income(
        reserve.liquidity_rate,
        reserve.liquidity_index,
        reserve.last_update_timestamp,
        current_timestamp,
    )?;
    ray_to_wad(ray_div(
        ray_mul(wad_to_ray(balance)?, normalized_income)?,
        user_balance_index,
    )?)
}

/// Live underlying balance of a legacy deposit position, honouring
/// interest redirection.
///
/// When a redirection address is set, the interest earned by the
/// redirected balance is credited on top of the untouched principal —
/// the position's own principal does not accrue to itself. Otherwise
/// principal and redirected balance accrue together and the redirected
/// principal itself is backed out.
pub fn calculate_current_underlying_balance(
    user_reserve: &UserReserveData,
    reserve: &ReserveData,
    current_timestamp: u64,
) -> Result<U256, MathError> {
    if user_reserve.principal_atoken_balance.is_zero()
        && user_reserve.redirected_balance.is_zero()
    {
        return Ok(U256::ZERO);
    }

    if user_reserve.interest_redirection_address != Address::ZERO {
        let cumulated_redirected = calculate_cumulated_balance(
            user_reserve.redirected_balance,
            user_reserve.user_balance_index,
            reserve,
            current_timestamp,
        )?;
        let redirected_interest = cumulated_redirected
            .checked_sub(user_reserve.redirected_balance)
            .ok_or(MathError::Overflow)?;
        return user_reserve
            .principal_atoken_balance
            .checked_add(redirected_interest)
            .ok_or(MathError::Overflow);
    }

    let combined = user_reserve
        .redirected_balance
        .checked_add(user_reserve.principal_atoken_balance)
        .ok_or(MathError::Overflow)?;
    calculate_cumulated_balance(
        combined,
        user_reserve.user_balance_index,
        reserve,
        current_timestamp,
    )?
    .checked_sub(user_reserve.redirected_balance)
    .ok_or(MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{RAY, WAD};
    use std::str::FromStr;

    fn ray(s: &str) -> U256 {
        U256::from_str(s).unwrap()
    }

    fn test_reserve() -> ReserveData {
        ReserveData {
            id: "0xres".into(),
            underlying_asset: Address::ZERO,
            name: "Test".into(),
            symbol: "TST".into(),
            decimals: 18,
            is_active: true,
            is_frozen: false,
            usage_as_collateral_enabled: true,
            borrowing_enabled: true,
            stable_borrow_rate_enabled: true,
            base_ltv_as_collateral: U256::from(75u64),
            reserve_liquidation_threshold: U256::from(80u64),
            reserve_liquidation_bonus: U256::from(105u64),
            optimal_utilisation_rate: ray("800000000000000000000000000"),
            base_variable_borrow_rate: U256::ZERO,
            variable_rate_slope1: ray("40000000000000000000000000"),
            variable_rate_slope2: ray("750000000000000000000000000"),
            stable_rate_slope1: ray("20000000000000000000000000"),
            stable_rate_slope2: ray("600000000000000000000000000"),
            average_stable_borrow_rate: ray("50000000000000000000000000"),
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            variable_borrow_rate: ray("100000000000000000000000000"),
            stable_borrow_rate: ray("120000000000000000000000000"),
            liquidity_rate: ray("30000000000000000000000000"),
            available_liquidity: U256::from(1_000u64) * WAD,
            total_borrows: U256::from(500u64) * WAD,
            total_borrows_stable: U256::from(100u64) * WAD,
            total_borrows_variable: U256::from(400u64) * WAD,
            total_liquidity: U256::from(1_500u64) * WAD,
            utilization_rate: ray("333333333333333333333333333"),
            last_update_timestamp: 1_000,
            price_in_base: WAD,
        }
    }

    fn test_user_reserve() -> UserReserveData {
        UserReserveData {
            reserve_id: "0xres".into(),
            principal_atoken_balance: U256::from(100u64) * WAD,
            user_balance_index: RAY,
            redirected_balance: U256::ZERO,
            interest_redirection_address: Address::ZERO,
            usage_as_collateral_enabled_on_user: true,
            borrow_rate: ray("120000000000000000000000000"),
            borrow_rate_mode: BorrowRateMode::None,
            origination_fee: U256::ZERO,
            principal_borrows: U256::ZERO,
            variable_borrow_index: RAY,
            last_update_timestamp: 1_000,
        }
    }

    #[test]
    fn test_zero_principal_borrow_is_zero() {
        let balance =
            get_compounded_borrow_balance(&test_reserve(), &test_user_reserve(), 2_000).unwrap();
        assert_eq!(balance, U256::ZERO);
    }

    #[test]
    fn test_variable_borrow_grows_with_time() {
        let reserve = test_reserve();
        let mut user = test_user_reserve();
        user.principal_borrows = U256::from(100u64) * WAD;
        user.borrow_rate_mode = BorrowRateMode::Variable;

        let now = get_compounded_borrow_balance(&reserve, &user, 1_000).unwrap();
        let later =
            get_compounded_borrow_balance(&reserve, &user, 1_000 + 86_400 * 30).unwrap();
        assert_eq!(now, user.principal_borrows);
        assert!(later > now);
    }

    #[test]
    fn test_variable_borrow_rebases_over_user_index() {
        // Reserve index moved to 1.2 since the user's recorded 1.0:
        // at zero rate the debt is exactly principal · 1.2.
        let mut reserve = test_reserve();
        reserve.variable_borrow_rate = U256::ZERO;
        reserve.variable_borrow_index = ray("1200000000000000000000000000");
        let mut user = test_user_reserve();
        user.principal_borrows = U256::from(100u64) * WAD;
        user.borrow_rate_mode = BorrowRateMode::Variable;

        let balance = get_compounded_borrow_balance(&reserve, &user, 1_000).unwrap();
        assert_eq!(balance, U256::from(120u64) * WAD);
    }

    #[test]
    fn test_stable_borrow_uses_user_rate_and_timestamp() {
        let mut reserve = test_reserve();
        // Reserve-side rate should be irrelevant for stable debt.
        reserve.variable_borrow_rate = ray("990000000000000000000000000");
        let mut user = test_user_reserve();
        user.principal_borrows = U256::from(100u64) * WAD;
        user.borrow_rate_mode = BorrowRateMode::Stable;
        user.borrow_rate = ray("100000000000000000000000000"); // 10%
        user.last_update_timestamp = 0;

        let balance =
            get_compounded_borrow_balance(&reserve, &user, crate::constants::SECONDS_PER_YEAR)
                .unwrap();
        // Strictly above simple interest, below 11% (series truncation).
        assert!(balance > U256::from(110u64) * WAD);
        assert!(balance < U256::from(111u64) * WAD);
    }

    #[test]
    fn test_underlying_balance_empty_position() {
        let balance = calculate_current_underlying_balance(
            &test_user_reserve_with(U256::ZERO, U256::ZERO),
            &test_reserve(),
            2_000,
        )
        .unwrap();
        assert_eq!(balance, U256::ZERO);
    }

    #[test]
    fn test_underlying_balance_accrues_liquidity_income() {
        // Index 1.0, liquidity rate 3%, one year: ≈ principal · 1.03.
        let mut reserve = test_reserve();
        reserve.last_update_timestamp = 0;
        let user = test_user_reserve_with(U256::from(100u64) * WAD, U256::ZERO);

        let balance = calculate_current_underlying_balance(
            &user,
            &reserve,
            crate::constants::SECONDS_PER_YEAR,
        )
        .unwrap();
        assert_eq!(balance, U256::from(103u64) * WAD);
    }

    #[test]
    fn test_redirected_interest_credits_principal_only() {
        // 100 principal + 50 redirected at 3% linear for a year with a
        // redirection address set: principal stays flat, the redirected
        // balance's 1.5 of interest lands on top.
        let mut reserve = test_reserve();
        reserve.last_update_timestamp = 0;
        let mut user = test_user_reserve_with(U256::from(100u64) * WAD, U256::from(50u64) * WAD);
        user.interest_redirection_address =
            Address::from_str("0x00000000000000000000000000000000000000aa").unwrap();

        let balance = calculate_current_underlying_balance(
            &user,
            &reserve,
            crate::constants::SECONDS_PER_YEAR,
        )
        .unwrap();
        let expected = U256::from(100u64) * WAD + U256::from(15u64) * WAD / U256::from(10);
        assert_eq!(balance, expected);
    }

    #[test]
    fn test_unredirected_combined_accrual_backs_out_redirected_principal() {
        // Same position without redirection: (100 + 50) accrue together,
        // minus the 50 of redirected principal → 150·1.03 - 50.
        let mut reserve = test_reserve();
        reserve.last_update_timestamp = 0;
        let user = test_user_reserve_with(U256::from(100u64) * WAD, U256::from(50u64) * WAD);

        let balance = calculate_current_underlying_balance(
            &user,
            &reserve,
            crate::constants::SECONDS_PER_YEAR,
        )
        .unwrap();
        let expected = U256::from(1545u64) * WAD / U256::from(10) - U256::from(50u64) * WAD;
        assert_eq!(balance, expected);
    }

    fn test_user_reserve_with(principal: U256, redirected: U256) -> UserReserveData {
        let mut user = test_user_reserve();
        user.principal_atoken_balance = principal;
        user.redirected_balance = redirected;
        user
    }
}
