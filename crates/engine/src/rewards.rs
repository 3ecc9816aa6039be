//! Index-based liquidity-mining reward accounting.
//!
//! The incentives controller keeps one monotonically increasing index per
//! incentivised token (aToken, variable debt, stable debt) and one
//! recorded index per user; the claimable amount is the user's principal
//! times the index delta. This module projects the reserve index forward
//! off-chain the same way the controller would on the next interaction.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::constants::{pow10, SECONDS_PER_YEAR};
use crate::error::MathError;

/// Claimable reward for one principal balance against one incentive
/// stream, raw at the reward token's scale.
///
/// The evaluation instant is clamped to `emission_end_timestamp` — no
/// rewards accrue past the end of the schedule. The stored reserve index
/// is reused when it is already at or after the clamped instant, and
/// whenever `total_supply` is zero (nothing to distribute over);
/// otherwise it is projected forward by
/// `emission_per_second · Δt · 10^precision / total_supply`.
///
/// `precision` must be the controller's own fixed-point precision —
/// user indices are only comparable at matching precision.
#[allow(clippy::too_many_arguments)]
pub fn calculate_rewards(
    principal_user_balance: U256,
    reserve_index: U256,
    user_index: U256,
    precision: u32,
    reserve_index_timestamp: u64,
    emission_per_second: U256,
    total_supply: U256,
    current_timestamp: u64,
    emission_end_timestamp: u64,
) -> Result<U256, MathError> {
    let actual_current_timestamp = current_timestamp.min(emission_end_timestamp);

    let current_reserve_index = if reserve_index_timestamp >= actual_current_timestamp
        || total_supply.is_zero()
    {
        reserve_index
    } else {
        let delta = U256::from(actual_current_timestamp - reserve_index_timestamp);
        emission_per_second
            .checked_mul(delta)
            .and_then(|v| v.checked_mul(pow10(precision)))
            .ok_or(MathError::Overflow)?
            .checked_div(total_supply)
            .ok_or(MathError::DivisionByZero)?
            .checked_add(reserve_index)
            .ok_or(MathError::Overflow)?
    };

    let index_delta = current_reserve_index
        .checked_sub(user_index)
        .ok_or(MathError::Overflow)?;

    let reward = principal_user_balance
        .checked_mul(index_delta)
        .ok_or(MathError::Overflow)?
        / pow10(precision);

    Ok(reward)
}

/// Yearly emission value over principal value for one incentive stream,
/// as a plain fraction. Purely a display metric.
///
/// Zero supply or a zero token price yields zero instead of dividing.
pub fn calculate_incentives_apy(
    emission_per_second: U256,
    reward_token_price_base: U256,
    reward_token_decimals: u32,
    token_total_supply: U256,
    token_price_base: U256,
    token_decimals: u32,
) -> Decimal {
    let emission = decimal_at_scale(emission_per_second, reward_token_decimals);
    let reward_price = decimal_at_scale(reward_token_price_base, crate::constants::BASE_CURRENCY_DECIMALS);
    let supply = decimal_at_scale(token_total_supply, token_decimals);
    let token_price = decimal_at_scale(token_price_base, crate::constants::BASE_CURRENCY_DECIMALS);

    let principal_value = supply * token_price;
    if principal_value.is_zero() {
        return Decimal::ZERO;
    }
    let emission_per_year = emission * reward_price * Decimal::from(SECONDS_PER_YEAR);
    emission_per_year / principal_value
}

/// Lossy U256 → Decimal at a given scale; values beyond Decimal's
/// mantissa collapse to zero (display-only use).
fn decimal_at_scale(value: U256, decimals: u32) -> Decimal {
    Decimal::from_str(&crate::normalize::normalize(value, decimals)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;
    use rust_decimal_macros::dec;

    const PRECISION: u32 = 18;

    #[test]
    fn test_reward_is_principal_times_index_delta() {
        // Reserve index already current: reward = principal·Δindex/1e18.
        let reward = calculate_rewards(
            U256::from(100u64) * WAD,       // principal
            U256::from(5u64) * WAD,         // reserve index 5.0
            U256::from(3u64) * WAD,         // user index 3.0
            PRECISION,
            1_000,                          // reserve index timestamp
            U256::from(10u64),              // emission per second
            U256::from(1_000u64) * WAD,     // total supply
            1_000,                          // current == index timestamp
            2_000,                          // emission end
        )
        .unwrap();
        assert_eq!(reward, U256::from(200u64) * WAD);
    }

    #[test]
    fn test_reward_projects_stale_index() {
        // 100 seconds of emission at 10/s over a supply of 1000 raises the
        // index by 10·100·1e18/1000 = 1e18 per unit of supply.
        let principal = U256::from(500u64);
        let total_supply = U256::from(1_000u64);
        let reward = calculate_rewards(
            principal,
            U256::ZERO, // stored index
            U256::ZERO, // user index
            PRECISION,
            0,
            U256::from(10u64),
            total_supply,
            100,
            1_000,
        )
        .unwrap();
        // index = 1e18, reward = 500·1e18/1e18 = 500.
        assert_eq!(reward, U256::from(500u64));
    }

    #[test]
    fn test_rewards_stop_at_emission_end() {
        let args = |current: u64| {
            calculate_rewards(
                U256::from(500u64),
                U256::ZERO,
                U256::ZERO,
                PRECISION,
                0,
                U256::from(10u64),
                U256::from(1_000u64),
                current,
                100, // emission ends at t = 100
            )
            .unwrap()
        };
        // Far past the end == exactly at the end.
        assert_eq!(args(100), args(1_000_000));
    }

    #[test]
    fn test_zero_total_supply_uses_stored_index() {
        let reward = calculate_rewards(
            U256::from(100u64),
            U256::from(7u64) * WAD,
            U256::from(7u64) * WAD,
            PRECISION,
            0,
            U256::from(10u64),
            U256::ZERO, // nothing to distribute over
            500,
            1_000,
        )
        .unwrap();
        assert_eq!(reward, U256::ZERO);
    }

    #[test]
    fn test_fully_claimed_user_accrues_nothing() {
        let index = U256::from(9u64) * WAD;
        let reward = calculate_rewards(
            U256::from(42u64) * WAD,
            index,
            index,
            PRECISION,
            500,
            U256::from(10u64),
            U256::from(1_000u64),
            500,
            1_000,
        )
        .unwrap();
        assert_eq!(reward, U256::ZERO);
    }

    #[test]
    fn test_incentives_apy() {
        // 0.01 reward token/s at price 1.0 base, over 1000 tokens at
        // price 1.0 base → 0.01·31536000/1000 = 315.36 (as a fraction).
        let apy = calculate_incentives_apy(
            WAD / U256::from(100),
            WAD,
            18,
            U256::from(1_000u64) * WAD,
            WAD,
            18,
        );
        assert_eq!(apy, dec!(315.36));
    }

    #[test]
    fn test_incentives_apy_zero_supply() {
        let apy = calculate_incentives_apy(WAD, WAD, 18, U256::ZERO, WAD, 18);
        assert_eq!(apy, Decimal::ZERO);
    }
}
