//! Legacy (v1) portfolio aggregation and display formatting.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::constants::{
    pow10, BASE_CURRENCY_DECIMALS, LEGACY_BORROW_FEE_PPM, LEGACY_BORROW_FEE_SCALE,
    LEGACY_LTV_PRECISION, RAY_DECIMALS, USD_DECIMALS, WAD,
};
use crate::error::{EngineError, MathError};
use crate::legacy::accrual::{calculate_current_underlying_balance, get_compounded_borrow_balance};
use crate::legacy::types::{
    ComputedUserReserve, FormattedReserveData, FormattedUserReserve, FormattedUserSummary,
    ReserveData, ReserveRatesData, UserReserveData, UserSummaryData,
};
use crate::math::pool_math::{base_and_usd_value, calculate_average_rate};
use crate::math::wad_ray::wad_to_decimal_saturating;

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

/// Legacy health factor: risk-adjusted collateral over debt plus
/// origination fees, threshold in whole percents. Sentinel `-1` when the
/// user has no borrows.
pub fn calculate_health_factor_from_balances(
    collateral_balance_base: U256,
    borrow_balance_base: U256,
    total_fees_base: U256,
    current_liquidation_threshold: U256,
) -> Result<Decimal, MathError> {
    if borrow_balance_base.is_zero() {
        return Ok(dec!(-1));
    }
    let numerator = mul(mul(collateral_balance_base, current_liquidation_threshold)?, WAD)?;
    let denominator = mul(add(borrow_balance_base, total_fees_base)?, U256::from(100))?;
    Ok(wad_to_decimal_saturating(numerator / denominator))
}

/// Legacy borrow headroom: `collateral · ltv - debt - fees`, floored at
/// zero, then shaved by the protocol's 0.25% borrow fee. `ltv` in whole
/// percents.
pub fn calculate_available_borrows(
    collateral_balance_base: U256,
    borrow_balance_base: U256,
    total_fees_base: U256,
    current_ltv: U256,
) -> Result<U256, MathError> {
    if current_ltv.is_zero() {
        return Ok(U256::ZERO);
    }
    let available = mul(collateral_balance_base, current_ltv)? / U256::from(100);
    let committed = add(borrow_balance_base, total_fees_base)?;
    if available <= committed {
        return Ok(U256::ZERO);
    }
    let headroom = available - committed;
    let borrow_fee =
        mul(headroom, U256::from(LEGACY_BORROW_FEE_PPM))? / U256::from(LEGACY_BORROW_FEE_SCALE);
    Ok(headroom - borrow_fee)
}

fn compute_user_reserve_data(
    pool_reserve: &ReserveData,
    user_reserve: &UserReserveData,
    usd_price_base: U256,
    current_timestamp: u64,
) -> Result<ComputedUserReserve, MathError> {
    let current_underlying_balance =
        calculate_current_underlying_balance(user_reserve, pool_reserve, current_timestamp)?;
    let (current_underlying_balance_base, current_underlying_balance_usd) = base_and_usd_value(
        current_underlying_balance,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    let (principal_borrows_base, principal_borrows_usd) = base_and_usd_value(
        user_reserve.principal_borrows,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    let current_borrows =
        get_compounded_borrow_balance(pool_reserve, user_reserve, current_timestamp)?;
    let (current_borrows_base, current_borrows_usd) = base_and_usd_value(
        current_borrows,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    let (origination_fee_base, origination_fee_usd) = base_and_usd_value(
        user_reserve.origination_fee,
        pool_reserve.price_in_base,
        pool_reserve.decimals,
        usd_price_base,
    )?;

    Ok(ComputedUserReserve {
        reserve_id: user_reserve.reserve_id.clone(),
        symbol: pool_reserve.symbol.clone(),
        decimals: pool_reserve.decimals,
        usage_as_collateral_enabled_on_user: user_reserve.usage_as_collateral_enabled_on_user,
        borrow_rate_mode: user_reserve.borrow_rate_mode,
        principal_atoken_balance: user_reserve.principal_atoken_balance,
        user_balance_index: user_reserve.user_balance_index,
        redirected_balance: user_reserve.redirected_balance,
        interest_redirection_address: user_reserve.interest_redirection_address,
        borrow_rate: user_reserve.borrow_rate,
        variable_borrow_index: user_reserve.variable_borrow_index,
        origination_fee: user_reserve.origination_fee,
        principal_borrows: user_reserve.principal_borrows,
        last_update_timestamp: user_reserve.last_update_timestamp,
        current_underlying_balance,
        current_underlying_balance_base,
        current_underlying_balance_usd,
        current_borrows,
        current_borrows_base,
        current_borrows_usd,
        principal_borrows_base,
        principal_borrows_usd,
        origination_fee_base,
        origination_fee_usd,
    })
}

/// Fold a user's legacy positions into portfolio totals at
/// `current_timestamp`. Every position must reference a reserve in
/// `pool_reserves`; a missing one is a data-integrity error, never
/// skipped.
pub fn compute_raw_user_summary(
    pool_reserves: &[ReserveData],
    raw_user_reserves: &[UserReserveData],
    user_id: &str,
    usd_price_base: U256,
    current_timestamp: u64,
) -> Result<UserSummaryData, EngineError> {
    let mut total_liquidity_base = U256::ZERO;
    let mut total_collateral_base = U256::ZERO;
    let mut total_borrows_base = U256::ZERO;
    let mut total_fees_base = U256::ZERO;
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
        )?;

        total_liquidity_base = add(
            total_liquidity_base,
            computed.current_underlying_balance_base,
        )?;
        total_borrows_base = add(total_borrows_base, computed.current_borrows_base)?;
        total_fees_base = add(total_fees_base, computed.origination_fee_base)?;

        if pool_reserve.usage_as_collateral_enabled
            && user_reserve.usage_as_collateral_enabled_on_user
        {
            total_collateral_base = add(
                total_collateral_base,
                computed.current_underlying_balance_base,
            )?;
            weighted_ltv = add(
                weighted_ltv,
                mul(
                    computed.current_underlying_balance_base,
                    pool_reserve.base_ltv_as_collateral,
                )?,
            )?;
            weighted_liquidation_threshold = add(
                weighted_liquidation_threshold,
                mul(
                    computed.current_underlying_balance_base,
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
        total_fees_base,
        current_liquidation_threshold,
    )
    .map_err(EngineError::from)?;

    let available_borrows_base = calculate_available_borrows(
        total_collateral_base,
        total_borrows_base,
        total_fees_base,
        current_loan_to_value,
    )
    .map_err(EngineError::from)?;

    let total_borrows_with_fees_base =
        add(total_borrows_base, total_fees_base).map_err(EngineError::from)?;
    let max_amount_to_withdraw_in_base = if total_borrows_with_fees_base.is_zero() {
        total_liquidity_base
    } else if current_liquidation_threshold.is_zero() {
        U256::ZERO
    } else {
        let locked = mul(total_borrows_with_fees_base, U256::from(100))
            .map_err(EngineError::from)?
            / current_liquidation_threshold;
        total_liquidity_base.saturating_sub(locked)
    };

    let summary = UserSummaryData {
        id: user_id.to_string(),
        total_liquidity_usd: to_usd(total_liquidity_base, usd_price_base)?,
        total_collateral_usd: to_usd(total_collateral_base, usd_price_base)?,
        total_borrows_usd: to_usd(total_borrows_base, usd_price_base)?,
        total_fees_usd: to_usd(total_fees_base, usd_price_base)?,
        total_borrows_with_fees_usd: to_usd(total_borrows_with_fees_base, usd_price_base)?,
        total_liquidity_base,
        total_collateral_base,
        total_borrows_base,
        total_fees_base,
        total_borrows_with_fees_base,
        available_borrows_base,
        current_loan_to_value,
        current_liquidation_threshold,
        max_amount_to_withdraw_in_base,
        health_factor,
        reserves_data,
    };

    debug!(
        user = user_id,
        reserves = summary.reserves_data.len(),
        health_factor = %summary.health_factor,
        "computed legacy user summary"
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
) -> Result<FormattedUserSummary, EngineError> {
    let data = compute_raw_user_summary(
        pool_reserves,
        raw_user_reserves,
        user_id,
        usd_price_base,
        current_timestamp,
    )?;

    let norm = crate::normalize::normalize;
    let reserves_data = data
        .reserves_data
        .into_iter()
        .map(|r| FormattedUserReserve {
            principal_atoken_balance: norm(r.principal_atoken_balance, r.decimals),
            user_balance_index: norm(r.user_balance_index, RAY_DECIMALS),
            redirected_balance: norm(r.redirected_balance, r.decimals),
            borrow_rate: norm(r.borrow_rate, RAY_DECIMALS),
            variable_borrow_index: norm(r.variable_borrow_index, RAY_DECIMALS),
            origination_fee: norm(r.origination_fee, r.decimals),
            origination_fee_base: norm(r.origination_fee_base, BASE_CURRENCY_DECIMALS),
            origination_fee_usd: norm(r.origination_fee_usd, USD_DECIMALS),
            principal_borrows: norm(r.principal_borrows, r.decimals),
            principal_borrows_base: norm(r.principal_borrows_base, BASE_CURRENCY_DECIMALS),
            principal_borrows_usd: norm(r.principal_borrows_usd, USD_DECIMALS),
            current_borrows: norm(r.current_borrows, r.decimals),
            current_borrows_base: norm(r.current_borrows_base, BASE_CURRENCY_DECIMALS),
            current_borrows_usd: norm(r.current_borrows_usd, USD_DECIMALS),
            current_underlying_balance: norm(r.current_underlying_balance, r.decimals),
            current_underlying_balance_base: norm(
                r.current_underlying_balance_base,
                BASE_CURRENCY_DECIMALS,
            ),
            current_underlying_balance_usd: norm(
                r.current_underlying_balance_usd,
                USD_DECIMALS,
            ),
            reserve_id: r.reserve_id,
            symbol: r.symbol,
            usage_as_collateral_enabled_on_user: r.usage_as_collateral_enabled_on_user,
            borrow_rate_mode: r.borrow_rate_mode,
            last_update_timestamp: r.last_update_timestamp,
        })
        .collect();

    Ok(FormattedUserSummary {
        id: data.id,
        total_liquidity_base: norm(data.total_liquidity_base, BASE_CURRENCY_DECIMALS),
        total_collateral_base: norm(data.total_collateral_base, BASE_CURRENCY_DECIMALS),
        total_borrows_base: norm(data.total_borrows_base, BASE_CURRENCY_DECIMALS),
        total_fees_base: norm(data.total_fees_base, BASE_CURRENCY_DECIMALS),
        total_liquidity_usd: norm(data.total_liquidity_usd, USD_DECIMALS),
        total_collateral_usd: norm(data.total_collateral_usd, USD_DECIMALS),
        total_borrows_usd: norm(data.total_borrows_usd, USD_DECIMALS),
        total_fees_usd: norm(data.total_fees_usd, USD_DECIMALS),
        total_borrows_with_fees_base: norm(
            data.total_borrows_with_fees_base,
            BASE_CURRENCY_DECIMALS,
        ),
        total_borrows_with_fees_usd: norm(data.total_borrows_with_fees_usd, USD_DECIMALS),
        available_borrows_base: norm(data.available_borrows_base, BASE_CURRENCY_DECIMALS),
        current_loan_to_value: norm(data.current_loan_to_value, LEGACY_LTV_PRECISION),
        current_liquidation_threshold: norm(
            data.current_liquidation_threshold,
            LEGACY_LTV_PRECISION,
        ),
        max_amount_to_withdraw_in_base: norm(
            data.max_amount_to_withdraw_in_base,
            BASE_CURRENCY_DECIMALS,
        ),
        health_factor: data.health_factor,
        reserves_data,
    })
}

/// Project reserve snapshots to display form, deriving 30-day average
/// rates from index history where available.
pub fn format_reserves(
    reserves: &[ReserveData],
    reserve_indexes_30_days_ago: Option<&[ReserveRatesData]>,
) -> Vec<FormattedReserveData> {
    let norm = crate::normalize::normalize;
    reserves
        .iter()
        .map(|reserve| {
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

            FormattedReserveData {
                id: reserve.id.clone(),
                symbol: reserve.symbol.clone(),
                name: reserve.name.clone(),
                decimals: reserve.decimals,
                is_active: reserve.is_active,
                usage_as_collateral_enabled: reserve.usage_as_collateral_enabled,
                borrowing_enabled: reserve.borrowing_enabled,
                stable_borrow_rate_enabled: reserve.stable_borrow_rate_enabled,
                price_in_base: norm(reserve.price_in_base, BASE_CURRENCY_DECIMALS),
                base_ltv_as_collateral: norm(
                    reserve.base_ltv_as_collateral,
                    LEGACY_LTV_PRECISION,
                ),
                reserve_liquidation_threshold: norm(
                    reserve.reserve_liquidation_threshold,
                    LEGACY_LTV_PRECISION,
                ),
                reserve_liquidation_bonus: norm(
                    reserve.reserve_liquidation_bonus.saturating_sub(U256::from(100)),
                    LEGACY_LTV_PRECISION,
                ),
                variable_borrow_rate: norm(reserve.variable_borrow_rate, RAY_DECIMALS),
                stable_borrow_rate: norm(reserve.stable_borrow_rate, RAY_DECIMALS),
                liquidity_rate: norm(reserve.liquidity_rate, RAY_DECIMALS),
                liquidity_index: norm(reserve.liquidity_index, RAY_DECIMALS),
                variable_borrow_index: norm(reserve.variable_borrow_index, RAY_DECIMALS),
                total_liquidity: norm(reserve.total_liquidity, reserve.decimals),
                available_liquidity: norm(reserve.available_liquidity, reserve.decimals),
                total_borrows: norm(reserve.total_borrows, reserve.decimals),
                total_borrows_stable: norm(reserve.total_borrows_stable, reserve.decimals),
                total_borrows_variable: norm(reserve.total_borrows_variable, reserve.decimals),
                avg_30_days_variable_borrow_rate,
                avg_30_days_liquidity_rate,
                last_update_timestamp: reserve.last_update_timestamp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RAY;
    use crate::legacy::types::{BorrowRateMode, ReserveRatesSample};
    use alloy::primitives::Address;

    // All fixtures use price 1 base/token, 18 decimals, unit indices and
    // zero rates, so balances convert 1:1 and numbers stay exact. The usd
    // price of 1e18 makes one base unit worth exactly one USD.
    const TS: u64 = 1_000;

    fn usd_price() -> U256 {
        WAD
    }

    fn reserve(id: &str, symbol: &str, collateral_enabled: bool) -> ReserveData {
        ReserveData {
            id: id.into(),
            underlying_asset: Address::ZERO,
            name: symbol.into(),
            symbol: symbol.into(),
            decimals: 18,
            is_active: true,
            is_frozen: false,
            usage_as_collateral_enabled: collateral_enabled,
            borrowing_enabled: true,
            stable_borrow_rate_enabled: true,
            base_ltv_as_collateral: U256::from(75u64),
            reserve_liquidation_threshold: U256::from(80u64),
            reserve_liquidation_bonus: U256::from(105u64),
            optimal_utilisation_rate: RAY / U256::from(2),
            base_variable_borrow_rate: U256::ZERO,
            variable_rate_slope1: U256::ZERO,
            variable_rate_slope2: U256::ZERO,
            stable_rate_slope1: U256::ZERO,
            stable_rate_slope2: U256::ZERO,
            average_stable_borrow_rate: U256::ZERO,
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            variable_borrow_rate: U256::ZERO,
            stable_borrow_rate: U256::ZERO,
            liquidity_rate: U256::ZERO,
            available_liquidity: U256::from(1_000u64) * WAD,
            total_borrows: U256::ZERO,
            total_borrows_stable: U256::ZERO,
            total_borrows_variable: U256::ZERO,
            total_liquidity: U256::from(1_000u64) * WAD,
            utilization_rate: U256::ZERO,
            last_update_timestamp: TS,
            price_in_base: WAD,
        }
    }

    fn deposit(reserve_id: &str, amount_units: u64, as_collateral: bool) -> UserReserveData {
        UserReserveData {
            reserve_id: reserve_id.into(),
            principal_atoken_balance: U256::from(amount_units) * WAD,
            user_balance_index: RAY,
            redirected_balance: U256::ZERO,
            interest_redirection_address: Address::ZERO,
            usage_as_collateral_enabled_on_user: as_collateral,
            borrow_rate: U256::ZERO,
            borrow_rate_mode: BorrowRateMode::None,
            origination_fee: U256::ZERO,
            principal_borrows: U256::ZERO,
            variable_borrow_index: RAY,
            last_update_timestamp: TS,
        }
    }

    fn borrow(reserve_id: &str, amount_units: u64, fee_units: u64) -> UserReserveData {
        let mut user = deposit(reserve_id, 0, false);
        user.principal_borrows = U256::from(amount_units) * WAD;
        user.origination_fee = U256::from(fee_units) * WAD;
        user.borrow_rate_mode = BorrowRateMode::Variable;
        user
    }

    #[test]
    fn test_unknown_reserve_is_fatal() {
        let reserves = vec![reserve("0xa", "AAA", true)];
        let users = vec![deposit("0xmissing", 10, true)];
        let err =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownReserve {
                id: "0xmissing".into()
            }
        );
    }

    #[test]
    fn test_empty_portfolio() {
        let summary =
            compute_raw_user_summary(&[reserve("0xa", "AAA", true)], &[], "user", usd_price(), TS)
                .unwrap();
        assert_eq!(summary.total_liquidity_base, U256::ZERO);
        assert_eq!(summary.health_factor, dec!(-1));
        assert_eq!(summary.current_loan_to_value, U256::ZERO);
        assert_eq!(summary.current_liquidation_threshold, U256::ZERO);
    }

    #[test]
    fn test_non_collateral_reserve_excluded_from_weighting() {
        // 100 in a collateral reserve, 50 in a non-collateral one: total
        // liquidity counts both, collateral and the weighted ratios only
        // the first.
        let reserves = vec![reserve("0xa", "AAA", true), reserve("0xb", "BBB", false)];
        let users = vec![deposit("0xa", 100, true), deposit("0xb", 50, true)];

        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        assert_eq!(summary.total_liquidity_base, U256::from(150u64) * WAD);
        assert_eq!(summary.total_collateral_base, U256::from(100u64) * WAD);
        assert_eq!(summary.current_loan_to_value, U256::from(75u64));
        assert_eq!(summary.current_liquidation_threshold, U256::from(80u64));
    }

    #[test]
    fn test_user_opt_out_excludes_from_collateral() {
        let reserves = vec![reserve("0xa", "AAA", true)];
        let users = vec![deposit("0xa", 100, false)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        assert_eq!(summary.total_liquidity_base, U256::from(100u64) * WAD);
        assert_eq!(summary.total_collateral_base, U256::ZERO);
        assert_eq!(summary.current_loan_to_value, U256::ZERO);
    }

    #[test]
    fn test_health_factor_with_fees() {
        // collateral 100·0.8 / (40 + 10 fees) = 1.6
        let reserves = vec![reserve("0xa", "AAA", true), reserve("0xb", "BBB", true)];
        let users = vec![deposit("0xa", 100, true), borrow("0xb", 40, 10)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        assert_eq!(summary.total_borrows_base, U256::from(40u64) * WAD);
        assert_eq!(summary.total_fees_base, U256::from(10u64) * WAD);
        assert_eq!(summary.health_factor, dec!(1.6));
    }

    #[test]
    fn test_available_borrows_shaves_borrow_fee() {
        // 100·0.75 - 40 - 10 = 25, minus 0.25% → 24.9375
        let reserves = vec![reserve("0xa", "AAA", true), reserve("0xb", "BBB", true)];
        let users = vec![deposit("0xa", 100, true), borrow("0xb", 40, 10)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        let expected = U256::from(25u64) * WAD - U256::from(25u64) * WAD * U256::from(25u64)
            / U256::from(10_000u64);
        assert_eq!(summary.available_borrows_base, expected);
    }

    #[test]
    fn test_weighted_ratios_stay_in_percent_range() {
        let reserves = vec![reserve("0xa", "AAA", true), reserve("0xb", "BBB", true)];
        let users = vec![deposit("0xa", 123, true), deposit("0xb", 77, true)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        assert!(summary.current_loan_to_value <= U256::from(100u64));
        assert!(summary.current_liquidation_threshold <= U256::from(100u64));
        assert!(summary.current_loan_to_value > U256::ZERO);
    }

    #[test]
    fn test_reserves_sorted_by_symbol() {
        let reserves = vec![
            reserve("0xc", "CCC", true),
            reserve("0xa", "AAA", true),
            reserve("0xb", "bbb", true),
        ];
        let users = vec![
            deposit("0xc", 1, true),
            deposit("0xb", 1, true),
            deposit("0xa", 1, true),
        ];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        let symbols: Vec<_> = summary
            .reserves_data
            .iter()
            .map(|r| r.symbol.as_str())
            .collect();
        // Case-sensitive: uppercase sorts before lowercase.
        assert_eq!(symbols, vec!["AAA", "CCC", "bbb"]);
    }

    #[test]
    fn test_max_withdraw_unencumbered() {
        let reserves = vec![reserve("0xa", "AAA", true)];
        let users = vec![deposit("0xa", 100, true)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        assert_eq!(
            summary.max_amount_to_withdraw_in_base,
            U256::from(100u64) * WAD
        );
    }

    #[test]
    fn test_max_withdraw_holds_back_debt_cover() {
        // debt+fees 50, threshold 80% → 62.5 locked, 150 - 62.5 = 87.5.
        let reserves = vec![reserve("0xa", "AAA", true), reserve("0xb", "BBB", true)];
        let users = vec![deposit("0xa", 150, true), borrow("0xb", 40, 10)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        let expected = U256::from(875u64) * WAD / U256::from(10u64);
        assert_eq!(summary.max_amount_to_withdraw_in_base, expected);
    }

    #[test]
    fn test_usd_totals_at_unit_price() {
        let reserves = vec![reserve("0xa", "AAA", true)];
        let users = vec![deposit("0xa", 100, true)];
        let summary =
            compute_raw_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        // 100 base units at $1 → 100 at the USD quote scale.
        assert_eq!(
            summary.total_liquidity_usd,
            U256::from(100u64) * pow10(USD_DECIMALS)
        );
    }

    #[test]
    fn test_format_user_summary_strings() {
        let reserves = vec![reserve("0xa", "AAA", true), reserve("0xb", "BBB", true)];
        let users = vec![deposit("0xa", 100, true), borrow("0xb", 40, 10)];
        let formatted =
            format_user_summary(&reserves, &users, "user", usd_price(), TS).unwrap();
        assert_eq!(formatted.total_liquidity_base, "100");
        assert_eq!(formatted.total_borrows_base, "40");
        assert_eq!(formatted.total_fees_base, "10");
        assert_eq!(formatted.current_loan_to_value, "0.75");
        assert_eq!(formatted.current_liquidation_threshold, "0.8");
        assert_eq!(formatted.health_factor, dec!(1.6));
    }

    #[test]
    fn test_format_reserves_normalizes_and_derives_bonus() {
        let formatted = format_reserves(&[reserve("0xa", "AAA", true)], None);
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].reserve_liquidation_bonus, "0.05");
        assert_eq!(formatted[0].total_liquidity, "1000");
        assert_eq!(formatted[0].liquidity_index, "1");
        assert!(formatted[0].avg_30_days_liquidity_rate.is_none());
    }

    #[test]
    fn test_rate_projection_input_mirrors_reserve_totals() {
        let r = reserve("0xa", "AAA", true);
        let input = r.rate_projection_input();
        assert_eq!(input.total_liquidity, r.total_liquidity);
        assert_eq!(input.total_borrows_stable, r.total_borrows_stable);
        assert_eq!(input.optimal_utilisation_rate, r.optimal_utilisation_rate);
        assert_eq!(
            input.average_stable_borrow_rate,
            r.average_stable_borrow_rate
        );
    }

    #[test]
    fn test_format_reserves_average_rates_from_history() {
        let mut r = reserve("0xa", "AAA", true);
        r.liquidity_index = RAY + RAY / U256::from(50); // 1.02
        r.last_update_timestamp = crate::constants::SECONDS_PER_YEAR / 2;
        let history = vec![ReserveRatesData {
            id: "0xa".into(),
            symbol: "AAA".into(),
            params_history: vec![ReserveRatesSample {
                variable_borrow_index: RAY,
                liquidity_index: RAY,
                timestamp: 0,
            }],
        }];
        let formatted = format_reserves(&[r], Some(&history));
        let avg = formatted[0].avg_30_days_liquidity_rate.as_ref().unwrap();
        // ~4% annualised.
        assert!(avg.starts_with("0.04") || avg.starts_with("0.039"));
    }
}
