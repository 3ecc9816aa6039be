//! Snapshot and summary types for the legacy (v1) pool.
//!
//! The legacy pool tracks whole principal balances with per-user recorded
//! indices, charges origination fees on borrows, and supports redirecting
//! deposit interest to another address. Field meanings follow the
//! on-chain storage it snapshots; all fixed-point scales are noted.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate mode of a legacy borrow position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorrowRateMode {
    None,
    Stable,
    Variable,
}

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

    /// Max borrowable fraction of collateral value, whole percents.
    pub base_ltv_as_collateral: U256,
    /// Liquidation trigger fraction, whole percents.
    pub reserve_liquidation_threshold: U256,
    /// Liquidator discount, whole percents (100 = no bonus).
    pub reserve_liquidation_bonus: U256,

    /// Kink point of the rate curve (ray).
    pub optimal_utilisation_rate: U256,
    pub base_variable_borrow_rate: U256,
    pub variable_rate_slope1: U256,
    pub variable_rate_slope2: U256,
    pub stable_rate_slope1: U256,
    pub stable_rate_slope2: U256,
    pub average_stable_borrow_rate: U256,

    /// Deposit-side accrual index (ray).
    pub liquidity_index: U256,
    /// Variable-debt accrual index (ray).
    pub variable_borrow_index: U256,
    pub variable_borrow_rate: U256,
    pub stable_borrow_rate: U256,
    pub liquidity_rate: U256,

    pub available_liquidity: U256,
    pub total_borrows: U256,
    pub total_borrows_stable: U256,
    pub total_borrows_variable: U256,
    pub total_liquidity: U256,
    pub utilization_rate: U256,

    pub last_update_timestamp: u64,

    /// Asset price in the chain's base currency (wad).
    pub price_in_base: U256,
}

/// One user's position in one legacy reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReserveData {
    pub reserve_id: String,
    pub principal_atoken_balance: U256,
    /// Deposit index recorded at the user's last interaction (ray).
    pub user_balance_index: U256,
    /// Balance whose interest has been redirected to this user.
    pub redirected_balance: U256,
    /// Recipient of this position's own interest; zero when not set.
    pub interest_redirection_address: Address,
    pub usage_as_collateral_enabled_on_user: bool,
    /// User's stable borrow rate (ray); meaningful for stable positions.
    pub borrow_rate: U256,
    pub borrow_rate_mode: BorrowRateMode,
    pub origination_fee: U256,
    pub principal_borrows: U256,
    /// Variable index recorded at the user's last borrow action (ray).
    pub variable_borrow_index: U256,
    pub last_update_timestamp: u64,
}

/// [`UserReserveData`] augmented with point-in-time derived balances.
/// Recomputed on every query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedUserReserve {
    pub reserve_id: String,
    pub symbol: String,
    pub decimals: u32,
    pub usage_as_collateral_enabled_on_user: bool,
    pub borrow_rate_mode: BorrowRateMode,
    pub principal_atoken_balance: U256,
    pub user_balance_index: U256,
    pub redirected_balance: U256,
    pub interest_redirection_address: Address,
    pub borrow_rate: U256,
    pub variable_borrow_index: U256,
    pub origination_fee: U256,
    pub principal_borrows: U256,
    pub last_update_timestamp: u64,

    pub current_underlying_balance: U256,
    pub current_underlying_balance_base: U256,
    pub current_underlying_balance_usd: U256,
    pub current_borrows: U256,
    pub current_borrows_base: U256,
    pub current_borrows_usd: U256,
    pub principal_borrows_base: U256,
    pub principal_borrows_usd: U256,
    pub origination_fee_base: U256,
    pub origination_fee_usd: U256,
}

/// Portfolio aggregate for one user. Query-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryData {
    pub id: String,
    pub total_liquidity_base: U256,
    pub total_collateral_base: U256,
    pub total_borrows_base: U256,
    pub total_fees_base: U256,
    pub total_liquidity_usd: U256,
    pub total_collateral_usd: U256,
    pub total_borrows_usd: U256,
    pub total_fees_usd: U256,
    pub total_borrows_with_fees_base: U256,
    pub total_borrows_with_fees_usd: U256,
    pub available_borrows_base: U256,
    /// Weighted LTV, whole percents.
    pub current_loan_to_value: U256,
    /// Weighted liquidation threshold, whole percents.
    pub current_liquidation_threshold: U256,
    pub max_amount_to_withdraw_in_base: U256,
    /// `-1` when the user has no debt.
    pub health_factor: Decimal,
    /// Sorted by symbol, ascending, case-sensitive.
    pub reserves_data: Vec<ComputedUserReserve>,
}

impl ReserveData {
    /// Curve parameters and current totals for hypothetical rate
    /// projection.
    pub fn rate_projection_input(&self) -> crate::rates::RateProjectionInput {
        crate::rates::RateProjectionInput {
            optimal_utilisation_rate: self.optimal_utilisation_rate,
            base_variable_borrow_rate: self.base_variable_borrow_rate,
            variable_rate_slope1: self.variable_rate_slope1,
            variable_rate_slope2: self.variable_rate_slope2,
            stable_rate_slope1: self.stable_rate_slope1,
            stable_rate_slope2: self.stable_rate_slope2,
            stable_borrow_rate: self.stable_borrow_rate,
            average_stable_borrow_rate: self.average_stable_borrow_rate,
            total_borrows_stable: self.total_borrows_stable,
            total_borrows_variable: self.total_borrows_variable,
            total_liquidity: self.total_liquidity,
        }
    }
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
    pub base_ltv_as_collateral: String,
    pub reserve_liquidation_threshold: String,
    /// Bonus over par, e.g. `"0.05"` for a 5% liquidator discount.
    pub reserve_liquidation_bonus: String,
    pub variable_borrow_rate: String,
    pub stable_borrow_rate: String,
    pub liquidity_rate: String,
    pub liquidity_index: String,
    pub variable_borrow_index: String,
    pub total_liquidity: String,
    pub available_liquidity: String,
    pub total_borrows: String,
    pub total_borrows_stable: String,
    pub total_borrows_variable: String,
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
    pub borrow_rate_mode: BorrowRateMode,
    pub principal_atoken_balance: String,
    pub user_balance_index: String,
    pub redirected_balance: String,
    pub borrow_rate: String,
    pub variable_borrow_index: String,
    pub origination_fee: String,
    pub origination_fee_base: String,
    pub origination_fee_usd: String,
    pub principal_borrows: String,
    pub principal_borrows_base: String,
    pub principal_borrows_usd: String,
    pub current_borrows: String,
    pub current_borrows_base: String,
    pub current_borrows_usd: String,
    pub current_underlying_balance: String,
    pub current_underlying_balance_base: String,
    pub current_underlying_balance_usd: String,
    pub last_update_timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedUserSummary {
    pub id: String,
    pub total_liquidity_base: String,
    pub total_collateral_base: String,
    pub total_borrows_base: String,
    pub total_fees_base: String,
    pub total_liquidity_usd: String,
    pub total_collateral_usd: String,
    pub total_borrows_usd: String,
    pub total_fees_usd: String,
    pub total_borrows_with_fees_base: String,
    pub total_borrows_with_fees_usd: String,
    pub available_borrows_base: String,
    pub current_loan_to_value: String,
    pub current_liquidation_threshold: String,
    pub max_amount_to_withdraw_in_base: String,
    pub health_factor: Decimal,
    pub reserves_data: Vec<FormattedUserReserve>,
}
