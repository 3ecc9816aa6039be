//! Snapshot and summary types for the scaled (v2) pool.
//!
//! The scaled pool stores three independent scaled quantities per user
//! (aToken collateral, variable debt, stable debt) and runs an
//! index-based incentive scheme over each. No origination fees, no
//! interest redirection.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-reserve pool state at a snapshot instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveData {
    pub id: String,
    pub underlying_asset: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub is_active: bool,
    pub is_frozen: bool,
    pub usage_as_collateral_enabled: bool,
    pub borrowing_enabled: bool,
    pub stable_borrow_rate_enabled: bool,

    /// Share of interest routed to the collector, basis points.
    pub reserve_factor: U256,
    /// Max borrowable fraction of collateral value, basis points.
    pub base_ltv_as_collateral: U256,
    /// Liquidation trigger fraction, basis points.
    pub reserve_liquidation_threshold: U256,
    /// Liquidator discount, basis points (10000 = no bonus).
    pub reserve_liquidation_bonus: U256,

    /// Kink point of the rate curve (ray).
    pub optimal_utilisation_rate: U256,
    pub base_variable_borrow_rate: U256,
    pub variable_rate_slope1: U256,
    pub variable_rate_slope2: U256,
    pub stable_rate_slope1: U256,
    pub stable_rate_slope2: U256,

    /// Deposit-side accrual index (ray).
    pub liquidity_index: U256,
    /// Variable-debt accrual index (ray).
    pub variable_borrow_index: U256,
    pub variable_borrow_rate: U256,
    pub stable_borrow_rate: U256,
    pub liquidity_rate: U256,
    /// Average rate across outstanding stable debt (ray).
    pub average_stable_rate: U256,

    pub available_liquidity: U256,
    pub total_principal_stable_debt: U256,
    pub total_scaled_variable_debt: U256,

    pub last_update_timestamp: u64,
    /// Stable debt accrues from its own update instant.
    pub stable_debt_last_update_timestamp: u64,

    /// Asset price in the chain's base currency (wad).
    pub price_in_base: U256,

    // Incentive state per token type: deposit (a), variable debt (v),
    // stable debt (s).
    pub a_emission_per_second: U256,
    pub v_emission_per_second: U256,
    pub s_emission_per_second: U256,
    pub a_incentives_last_update_timestamp: u64,
    pub v_incentives_last_update_timestamp: u64,
    pub s_incentives_last_update_timestamp: u64,
    pub a_token_incentives_index: U256,
    pub v_token_incentives_index: U256,
    pub s_token_incentives_index: U256,
}

/// One user's position in one scaled reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReserveData {
    pub reserve_id: String,
    pub scaled_atoken_balance: U256,
    pub usage_as_collateral_enabled_on_user: bool,
    pub scaled_variable_debt: U256,
    pub variable_borrow_index: U256,
    /// User's own stable rate (ray).
    pub stable_borrow_rate: U256,
    pub principal_stable_debt: U256,
    pub stable_borrow_last_update_timestamp: u64,
    /// Incentive indices recorded at the user's last interaction.
    pub a_token_incentives_user_index: U256,
    pub v_token_incentives_user_index: U256,
    pub s_token_incentives_user_index: U256,
}

/// Configuration of one incentive scheme, supplied per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsInformation {
    pub reward_token_address: Address,
    pub reward_token_decimals: u32,
    /// Fixed-point precision of the on-chain incentive accounting.
    pub incentive_precision: u32,
    /// Reward token price in base currency (wad).
    pub reward_token_price_base: U256,
    pub emission_end_timestamp: u64,
}

/// Reserve fields needed to derive live supply totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSupplyData {
    pub total_scaled_variable_debt: U256,
    pub variable_borrow_index: U256,
    pub variable_borrow_rate: U256,
    pub total_principal_stable_debt: U256,
    pub average_stable_rate: U256,
    pub available_liquidity: U256,
    pub stable_debt_last_update_timestamp: u64,
    pub last_update_timestamp: u64,
}

/// Live supply totals at an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplies {
    pub total_variable_debt: U256,
    pub total_stable_debt: U256,
    pub total_liquidity: U256,
}

/// [`UserReserveData`] augmented with point-in-time derived balances and
/// reward accruals. Recomputed on every query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedUserReserve {
    pub reserve_id: String,
    pub symbol: String,
    pub decimals: u32,
    pub usage_as_collateral_enabled_on_user: bool,
    pub scaled_atoken_balance: U256,
    pub scaled_variable_debt: U256,
    pub variable_borrow_index: U256,
    pub stable_borrow_rate: U256,
    pub principal_stable_debt: U256,
    pub stable_borrow_last_update_timestamp: u64,

    pub underlying_balance: U256,
    pub underlying_balance_base: U256,
    pub underlying_balance_usd: U256,
    pub variable_borrows: U256,
    pub variable_borrows_base: U256,
    pub variable_borrows_usd: U256,
    pub stable_borrows: U256,
    pub stable_borrows_base: U256,
    pub stable_borrows_usd: U256,
    pub total_borrows: U256,
    pub total_borrows_base: U256,
    pub total_borrows_usd: U256,

    pub a_token_rewards: U256,
    pub a_token_rewards_base: U256,
    pub a_token_rewards_usd: U256,
    pub v_token_rewards: U256,
    pub v_token_rewards_base: U256,
    pub v_token_rewards_usd: U256,
    pub s_token_rewards: U256,
    pub s_token_rewards_base: U256,
    pub s_token_rewards_usd: U256,
    pub total_rewards: U256,
    pub total_rewards_base: U256,
    pub total_rewards_usd: U256,
}

/// Portfolio aggregate for one user. Query-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryData {
    pub id: String,
    pub total_liquidity_base: U256,
    pub total_collateral_base: U256,
    pub total_borrows_base: U256,
    pub total_liquidity_usd: U256,
    pub total_collateral_usd: U256,
    pub total_borrows_usd: U256,
    pub available_borrows_base: U256,
    /// Weighted LTV, basis points.
    pub current_loan_to_value: U256,
    /// Weighted liquidation threshold, basis points.
    pub current_liquidation_threshold: U256,
    /// `-1` when the user has no debt.
    pub health_factor: Decimal,
    pub total_rewards: U256,
    pub total_rewards_base: U256,
    pub total_rewards_usd: U256,
    /// Sorted by symbol, ascending, case-sensitive.
    pub reserves_data: Vec<ComputedUserReserve>,
}

/// Historical index samples for average-rate derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRatesData {
    pub id: String,
    pub symbol: String,
    pub params_history: Vec<ReserveRatesSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRatesSample {
    pub variable_borrow_index: U256,
    pub liquidity_index: U256,
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// Formatted projections — human-decimal strings, display only
// ---------------------------------------------------------------------------

/// Reserve snapshot with live totals derived and every fixed-point field
/// rendered as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedReserveData {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub is_active: bool,
    pub usage_as_collateral_enabled: bool,
    pub borrowing_enabled: bool,
    pub stable_borrow_rate_enabled: bool,
    pub price_in_base: String,
    pub reserve_factor: String,
    pub base_ltv_as_collateral: String,
    pub reserve_liquidation_threshold: String,
    /// Bonus over par, e.g. `"0.05"` for a 5% liquidator discount.
    pub reserve_liquidation_bonus: String,
    pub variable_borrow_rate: String,
    pub stable_borrow_rate: String,
    pub liquidity_rate: String,
    pub liquidity_index: String,
    pub variable_borrow_index: String,
    pub total_scaled_variable_debt: String,
    pub total_principal_stable_debt: String,
    pub available_liquidity: String,
    pub total_variable_debt: String,
    pub total_stable_debt: String,
    pub total_debt: String,
    pub total_liquidity: String,
    pub utilization_rate: String,
    pub a_incentives_apy: String,
    pub v_incentives_apy: String,
    pub s_incentives_apy: String,
    pub avg_30_days_variable_borrow_rate: Option<String>,
    pub avg_30_days_liquidity_rate: Option<String>,
    pub last_update_timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedUserReserve {
    pub reserve_id: String,
    pub symbol: String,
    pub usage_as_collateral_enabled_on_user: bool,
    pub scaled_atoken_balance: String,
    pub scaled_variable_debt: String,
    pub variable_borrow_index: String,
    pub stable_borrow_rate: String,
    pub principal_stable_debt: String,
    pub underlying_balance: String,
    pub underlying_balance_base: String,
    pub underlying_balance_usd: String,
    pub variable_borrows: String,
    pub variable_borrows_base: String,
    pub variable_borrows_usd: String,
    pub stable_borrows: String,
    pub stable_borrows_base: String,
    pub stable_borrows_usd: String,
    pub total_borrows: String,
    pub total_borrows_base: String,
    pub total_borrows_usd: String,
    pub total_rewards: String,
    pub total_rewards_base: String,
    pub total_rewards_usd: String,
    pub stable_borrow_last_update_timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedUserSummary {
    pub id: String,
    pub total_liquidity_base: String,
    pub total_collateral_base: String,
    pub total_borrows_base: String,
    pub total_liquidity_usd: String,
    pub total_collateral_usd: String,
    pub total_borrows_usd: String,
    pub available_borrows_base: String,
    pub current_loan_to_value: String,
    pub current_liquidation_threshold: String,
    pub health_factor: Decimal,
    pub total_rewards: String,
    pub total_rewards_base: String,
    pub total_rewards_usd: String,
    pub reserves_data: Vec<FormattedUserReserve>,
}
