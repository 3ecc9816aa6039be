//! Scaled (v2) portfolio aggregation and display formatting.

use alloy::primitives::U256;
use tracing::debug;

use crate::constants::{
    pow10, BASE_CURRENCY_DECIMALS, LTV_PRECISION, RAY_DECIMALS, USD_DECIMALS,
};
use crate::error::{EngineError, MathError};
use crate::math::pool_math::{
    base_and_usd_value, calculate_available_borrows, calculate_average_rate,
    calculate_health_factor_from_balances, get_compounded_balance, get_compounded_stable_balance,
    get_linear_balance,
};
use crate::math::wad_ray::ray_div;
use crate::rewards::{calculate_incentives_apy, calculate_rewards};
use crate::scaled::accrual::{calculate_supplies, scaled_total_supply};
use crate::scaled::types::{
    ComputedUserReserve, FormattedReserveData, FormattedUserReserve, FormattedUserSummary,
    ReserveData, ReserveRatesData, RewardsInformation, UserReserveData, UserSummaryData,
};

fn add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

fn mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

fn to_usd(value_base: U256, usd_price_base: U256) -> Result<U256, MathError> {
    if usd_price_base.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(mul(value_base, pow10(USD_DECIMALS))? / usd_price_base)
}

fn compute_user_reserve_data(
    pool_reserve: &ReserveData,
    user_reserve: &UserReserveData,
    usd_price_base: U256,
    current_timestamp: u64,
    rewards_info: &RewardsInformation,
) -> Result<ComputedUserReserve, MathError> {
    let underlying_balance = get_linear_balance(
        user_reserve.scaled_atoken_balance,
        pool_reserve.liquidity_index,
        pool_reserve.liquidity_rate,
        pool_reserve.last_update_timestamp,
        current_timestamp,
    )?;
    let (underlying_balance_base, underlying_balance_usd) = base_and_usd_value(
        underlying_balance,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    let variable_borrows = get_compounded_balance(
        user_reserve.scaled_variable_debt,
        pool_reserve.variable_borrow_index,
        pool_reserve.variable_borrow_rate,
        pool_reserve.last_update_timestamp,
        current_timestamp,
    )?;
    let (variable_borrows_base, variable_borrows_usd) = base_and_usd_value(
        variable_borrows,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    let stable_borrows = get_compounded_stable_balance(
        user_reserve.principal_stable_debt,
        user_reserve.stable_borrow_rate,
        user_reserve.stable_borrow_last_update_timestamp,
        current_timestamp,
    )?;
    let (stable_borrows_base, stable_borrows_usd) = base_and_usd_value(
        stable_borrows,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    let supplies = calculate_supplies(&pool_reserve.supply_data(), current_timestamp)?;

    // Each incentive stream distributes over its own principal supply:
    // deposits over the scaled aToken supply, debt streams over the
    // scaled/principal debt totals.
    let a_token_rewards = if supplies.total_liquidity.is_zero() {
        U256::ZERO
    } else {
        calculate_rewards(
            user_reserve.scaled_atoken_balance,
            pool_reserve.a_token_incentives_index,
            user_reserve.a_token_incentives_user_index,
            rewards_info.incentive_precision,
            pool_reserve.a_incentives_last_update_timestamp,
            pool_reserve.a_emission_per_second,
            scaled_total_supply(supplies.total_liquidity, pool_reserve.liquidity_index)?,
            current_timestamp,
            rewards_info.emission_end_timestamp,
        )?
    };
    let (a_token_rewards_base, a_token_rewards_usd) = base_and_usd_value(
        a_token_rewards,
        rewards_info.reward_token_price_base,
        rewards_info.reward_token_decimals,
        usd_price_base,
    )?;

    let v_token_rewards = if supplies.total_variable_debt.is_zero() {
        U256::ZERO
    } else {
        calculate_rewards(
            user_reserve.scaled_variable_debt,
            pool_reserve.v_token_incentives_index,
            user_reserve.v_token_incentives_user_index,
            rewards_info.incentive_precision,
            pool_reserve.v_incentives_last_update_timestamp,
            pool_reserve.v_emission_per_second,
            pool_reserve.total_scaled_variable_debt,
            current_timestamp,
            rewards_info.emission_end_timestamp,
        )?
    };
    let (v_token_rewards_base, v_token_rewards_usd) = base_and_usd_value(
        v_token_rewards,
        rewards_info.reward_token_price_base,
        rewards_info.reward_token_decimals,
        usd_price_base,
    )?;

    let s_token_rewards = if supplies.total_stable_debt.is_zero() {
        U256::ZERO
    } else {
        calculate_rewards(
            user_reserve.principal_stable_debt,
            pool_reserve.s_token_incentives_index,
            user_reserve.s_token_incentives_user_index,
            rewards_info.incentive_precision,
            pool_reserve.s_incentives_last_update_timestamp,
            pool_reserve.s_emission_per_second,
            pool_reserve.total_principal_stable_debt,
            current_timestamp,
            rewards_info.emission_end_timestamp,
        )?
    };
    let (s_token_rewards_base, s_token_rewards_usd) = base_and_usd_value(
        s_token_rewards,
        rewards_info.reward_token_price_base,
        rewards_info.reward_token_decimals,
        usd_price_base,
    )?;

    Ok(ComputedUserReserve {
        reserve_id: user_reserve.reserve_id.clone(),
        symbol: pool_reserve.symbol.clone(),
        decimals: pool_reserve.decimals,
        usage_as_collateral_enabled_on_user: user_reserve.usage_as_collateral_enabled_on_user,
        scaled_atoken_balance: user_reserve.scaled_atoken_balance,
        scaled_variable_debt: user_reserve.scaled_variable_debt,
        variable_borrow_index: user_reserve.variable_borrow_index,
        stable_borrow_rate: user_reserve.stable_borrow_rate,
        principal_stable_debt: user_reserve.principal_stable_debt,
        stable_borrow_last_update_timestamp: user_reserve.stable_borrow_last_update_timestamp,
        underlying_balance,
        underlying_balance_base,
        underlying_balance_usd,
        variable_borrows,
        variable_borrows_base,
        variable_borrows_usd,
        stable_borrows,
        stable_borrows_base,
        stable_borrows_usd,
        total_borrows: add(variable_borrows, stable_borrows)?,
        total_borrows_base: add(variable_borrows_base, stable_borrows_base)?,
        total_borrows_usd: add(variable_borrows_usd, stable_borrows_usd)?,
        a_token_rewards,
        a_token_rewards_base,
        a_token_rewards_usd,
        v_token_rewards,
        v_token_rewards_base,
        v_token_rewards_usd,
        s_token_rewards,
        s_token_rewards_base,
        s_token_rewards_usd,
        total_rewards: add(add(a_token_rewards, v_token_rewards)?, s_token_rewards)?,
        total_rewards_base: add(
            add(a_token_rewards_base, v_token_rewards_base)?,
            s_token_rewards_base,
        )?,
        total_rewards_usd: add(
            add(a_token_rewards_usd, v_token_rewards_usd)?,
            s_token_rewards_usd,
        )?,
    })
}

/// Fold a user's scaled positions into portfolio totals at
/// `current_timestamp`. Every position must reference a reserve in
/// `pool_reserves`; a missing one is a data-integrity error, never
/// skipped.
pub fn compute_raw_user_summary(
    pool_reserves: &[ReserveData],
    raw_user_reserves: &[UserReserveData],
    user_id: &str,
    usd_price_base: U256,
    current_timestamp: u64,
    rewards_info: &RewardsInformation,
) -> Result<UserSummaryData, EngineError> {
    let mut total_liquidity_base = U256::ZERO;
    let mut total_collateral_base = U256::ZERO;
    let mut total_borrows_base = U256::ZERO;
    let mut total_rewards = U256::ZERO;
    let mut total_rewards_base = U256::ZERO;
    let mut total_rewards_usd = U256::ZERO;
    let mut weighted_ltv = U256::ZERO;
    let mut weighted_liquidation_threshold = U256::ZERO;

    let mut reserves_data = Vec::with_capacity(raw_user_reserves.len());
    for user_reserve in raw_user_reserves {
        let pool_reserve = pool_reserves
            .iter()
            .find(|reserve| reserve.id == user_reserve.reserve_id)
            .ok_or_else(|| EngineError::UnknownReserve {
                id: user_reserve.reserve_id.clone(),
            })?;

        let computed = compute_user_reserve_data(
            pool_reserve,
            user_reserve,
            usd_price_base,
            current_timestamp,
            rewards_info,
        )?;

        total_rewards = add(total_rewards, computed.total_rewards)?;
        total_rewards_base = add(total_rewards_base, computed.total_rewards_base)?;
        total_rewards_usd = add(total_rewards_usd, computed.total_rewards_usd)?;

        total_liquidity_base = add(total_liquidity_base, computed.underlying_balance_base)?;
        total_borrows_base = add(
            add(total_borrows_base, computed.variable_borrows_base)?,
            computed.stable_borrows_base,
        )?;

        if pool_reserve.usage_as_collateral_enabled
            && user_reserve.usage_as_collateral_enabled_on_user
        {
            total_collateral_base = add(total_collateral_base, computed.underlying_balance_base)?;
            weighted_ltv = add(
                weighted_ltv,
                mul(
                    computed.underlying_balance_base,
                    pool_reserve.base_ltv_as_collateral,
                )?,
            )?;
            weighted_liquidation_threshold = add(
                weighted_liquidation_threshold,
                mul(
                    computed.underlying_balance_base,
                    pool_reserve.reserve_liquidation_threshold,
                )?,
            )?;
        }

        reserves_data.push(computed);
    }
    reserves_data.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let current_loan_to_value = if weighted_ltv.is_zero() {
        U256::ZERO
    } else {
        weighted_ltv / total_collateral_base
    };
    let current_liquidation_threshold = if weighted_liquidation_threshold.is_zero() {
        U256::ZERO
    } else {
        weighted_liquidation_threshold / total_collateral_base
    };

    let health_factor = calculate_health_factor_from_balances(
        total_collateral_base,
        total_borrows_base,
        current_liquidation_threshold,
    )?;

    let available_borrows_base = calculate_available_borrows(
        total_collateral_base,
        total_borrows_base,
        current_loan_to_value,
    )?;

    let summary = UserSummaryData {
        id: user_id.to_string(),
        total_liquidity_usd: to_usd(total_liquidity_base, usd_price_base)?,
        total_collateral_usd: to_usd(total_collateral_base, usd_price_base)?,
        total_borrows_usd: to_usd(total_borrows_base, usd_price_base)?,
        total_liquidity_base,
        total_collateral_base,
        total_borrows_base,
        available_borrows_base,
        current_loan_to_value,
        current_liquidation_threshold,
        health_factor,
        total_rewards,
        total_rewards_base,
        total_rewards_usd,
        reserves_data,
    };

    debug!(
        user = user_id,
        reserves = summary.reserves_data.len(),
        health_factor = %summary.health_factor,
        "computed scaled user summary"
    );

    Ok(summary)
}

/// Raw summary projected to human-decimal strings.
pub fn format_user_summary(
    pool_reserves: &[ReserveData],
    raw_user_reserves: &[UserReserveData],
    user_id: &str,
    usd_price_base: U256,
    current_timestamp: u64,
    rewards_info: &RewardsInformation,
) -> Result<FormattedUserSummary, EngineError> {
    let data = compute_raw_user_summary(
        pool_reserves,
        raw_user_reserves,
        user_id,
        usd_price_base,
        current_timestamp,
        rewards_info,
    )?;

    let norm = crate::normalize::normalize;
    let reward_decimals = rewards_info.reward_token_decimals;
    let reserves_data = data
        .reserves_data
        .into_iter()
        .map(|r| FormattedUserReserve {
            scaled_atoken_balance: norm(r.scaled_atoken_balance, r.decimals),
            scaled_variable_debt: norm(r.scaled_variable_debt, r.decimals),
            variable_borrow_index: norm(r.variable_borrow_index, RAY_DECIMALS),
            stable_borrow_rate: norm(r.stable_borrow_rate, RAY_DECIMALS),
            principal_stable_debt: norm(r.principal_stable_debt, r.decimals),
            underlying_balance: norm(r.underlying_balance, r.decimals),
            underlying_balance_base: norm(r.underlying_balance_base, BASE_CURRENCY_DECIMALS),
            underlying_balance_usd: norm(r.underlying_balance_usd, USD_DECIMALS),
            variable_borrows: norm(r.variable_borrows, r.decimals),
            variable_borrows_base: norm(r.variable_borrows_base, BASE_CURRENCY_DECIMALS),
            variable_borrows_usd: norm(r.variable_borrows_usd, USD_DECIMALS),
            stable_borrows: norm(r.stable_borrows, r.decimals),
            stable_borrows_base: norm(r.stable_borrows_base, BASE_CURRENCY_DECIMALS),
            stable_borrows_usd: norm(r.stable_borrows_usd, USD_DECIMALS),
            total_borrows: norm(r.total_borrows, r.decimals),
            total_borrows_base: norm(r.total_borrows_base, BASE_CURRENCY_DECIMALS),
            total_borrows_usd: norm(r.total_borrows_usd, USD_DECIMALS),
            total_rewards: norm(r.total_rewards, reward_decimals),
            total_rewards_base: norm(r.total_rewards_base, BASE_CURRENCY_DECIMALS),
            total_rewards_usd: norm(r.total_rewards_usd, USD_DECIMALS),
            reserve_id: r.reserve_id,
            symbol: r.symbol,
            usage_as_collateral_enabled_on_user: r.usage_as_collateral_enabled_on_user,
            stable_borrow_last_update_timestamp: r.stable_borrow_last_update_timestamp,
        })
        .collect();

    Ok(FormattedUserSummary {
        id: data.id,
        total_liquidity_base: norm(data.total_liquidity_base, BASE_CURRENCY_DECIMALS),
        total_collateral_base: norm(data.total_collateral_base, BASE_CURRENCY_DECIMALS),
        total_borrows_base: norm(data.total_borrows_base, BASE_CURRENCY_DECIMALS),
        total_liquidity_usd: norm(data.total_liquidity_usd, USD_DECIMALS),
        total_collateral_usd: norm(data.total_collateral_usd, USD_DECIMALS),
        total_borrows_usd: norm(data.total_borrows_usd, USD_DECIMALS),
        available_borrows_base: norm(data.available_borrows_base, BASE_CURRENCY_DECIMALS),
        current_loan_to_value: norm(data.current_loan_to_value, LTV_PRECISION),
        current_liquidation_threshold: norm(data.current_liquidation_threshold, LTV_PRECISION),
        health_factor: data.health_factor,
        total_rewards: norm(data.total_rewards, reward_decimals),
        total_rewards_base: norm(data.total_rewards_base, BASE_CURRENCY_DECIMALS),
        total_rewards_usd: norm(data.total_rewards_usd, USD_DECIMALS),
        reserves_data,
    })
}

/// Project reserve snapshots to display form with live totals,
/// utilization, incentive APYs, and 30-day average rates.
///
/// `current_timestamp` defaults per-reserve to the snapshot's own last
/// update — the engine never reads a clock.
pub fn format_reserves(
    reserves: &[ReserveData],
    current_timestamp: Option<u64>,
    reserve_indexes_30_days_ago: Option<&[ReserveRatesData]>,
    reward_token_price_base: U256,
    emission_end_timestamp: Option<u64>,
) -> Result<Vec<FormattedReserveData>, MathError> {
    let norm = crate::normalize::normalize;
    reserves
        .iter()
        .map(|reserve| {
            let timestamp = current_timestamp.unwrap_or(reserve.last_update_timestamp);
            let supplies = calculate_supplies(&reserve.supply_data(), timestamp)?;
            let total_debt = add(supplies.total_variable_debt, supplies.total_stable_debt)?;

            let utilization_rate = if supplies.total_liquidity.is_zero() {
                U256::ZERO
            } else {
                ray_div(total_debt, supplies.total_liquidity)?
            };

            let has_emission = emission_end_timestamp
                .map(|end| end > timestamp)
                .unwrap_or(false);
            let apy = |emission: U256, principal: U256| {
                if has_emission && !principal.is_zero() {
                    calculate_incentives_apy(
                        emission,
                        reward_token_price_base,
                        BASE_CURRENCY_DECIMALS,
                        principal,
                        reserve.price_in_base,
                        reserve.decimals,
                    )
                    .to_string()
                } else {
                    "0".to_string()
                }
            };

            let sample = reserve_indexes_30_days_ago
                .and_then(|hist| hist.iter().find(|h| h.id == reserve.id))
                .and_then(|h| h.params_history.first());
            let avg_30_days_variable_borrow_rate = sample.and_then(|s| {
                calculate_average_rate(
                    s.variable_borrow_index,
                    reserve.variable_borrow_index,
                    s.timestamp,
                    reserve.last_update_timestamp,
                )
                .ok()
                .map(|rate| rate.to_string())
            });
            let avg_30_days_liquidity_rate = sample.and_then(|s| {
                calculate_average_rate(
                    s.liquidity_index,
                    reserve.liquidity_index,
                    s.timestamp,
                    reserve.last_update_timestamp,
                )
                .ok()
                .map(|rate| rate.to_string())
            });

            Ok(FormattedReserveData {
                id: reserve.id.clone(),
                symbol: reserve.symbol.clone(),
                name: reserve.name.clone(),
                decimals: reserve.decimals,
                is_active: reserve.is_active,
                usage_as_collateral_enabled: reserve.usage_as_collateral_enabled,
                borrowing_enabled: reserve.borrowing_enabled,
                stable_borrow_rate_enabled: reserve.stable_borrow_rate_enabled,
                price_in_base: norm(reserve.price_in_base, BASE_CURRENCY_DECIMALS),
                reserve_factor: norm(reserve.reserve_factor, LTV_PRECISION),
                base_ltv_as_collateral: norm(reserve.base_ltv_as_collateral, LTV_PRECISION),
                reserve_liquidation_threshold: norm(
                    reserve.reserve_liquidation_threshold,
                    LTV_PRECISION,
                ),
                reserve_liquidation_bonus: norm(
                    reserve
                        .reserve_liquidation_bonus
                        .saturating_sub(pow10(LTV_PRECISION)),
                    LTV_PRECISION,
                ),
                variable_borrow_rate: norm(reserve.variable_borrow_rate, RAY_DECIMALS),
                stable_borrow_rate: norm(reserve.stable_borrow_rate, RAY_DECIMALS),
                liquidity_rate: norm(reserve.liquidity_rate, RAY_DECIMALS),
                liquidity_index: norm(reserve.liquidity_index, RAY_DECIMALS),
                variable_borrow_index: norm(reserve.variable_borrow_index, RAY_DECIMALS),
                total_scaled_variable_debt: norm(
                    reserve.total_scaled_variable_debt,
                    reserve.decimals,
                ),
                total_principal_stable_debt: norm(
                    reserve.total_principal_stable_debt,
                    reserve.decimals,
                ),
                available_liquidity: norm(reserve.available_liquidity, reserve.decimals),
                total_variable_debt: norm(supplies.total_variable_debt, reserve.decimals),
                total_stable_debt: norm(supplies.total_stable_debt, reserve.decimals),
                total_debt: norm(total_debt, reserve.decimals),
                total_liquidity: norm(supplies.total_liquidity, reserve.decimals),
                utilization_rate: norm(utilization_rate, RAY_DECIMALS),
                a_incentives_apy: apy(reserve.a_emission_per_second, supplies.total_liquidity),
                v_incentives_apy: apy(
                    reserve.v_emission_per_second,
                    supplies.total_variable_debt,
                ),
                s_incentives_apy: apy(reserve.s_emission_per_second, supplies.total_stable_debt),
                avg_30_days_variable_borrow_rate,
                avg_30_days_liquidity_rate,
                last_update_timestamp: reserve.last_update_timestamp,
            })
        })
        .collect()
}
