use alloy::primitives::{uint, U256};

// ---------------------------------------------------------------------------
// Fixed-point scales
// ---------------------------------------------------------------------------

/// WAD: 1e18 — token amounts, prices, health factors.
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Half a WAD, used for round-half-up at wad scale.
pub const HALF_WAD: U256 = uint!(500_000_000_000_000_000_U256);

/// RAY: 1e27 — interest rates and accrual indices.
pub const RAY: U256 = uint!(1_000_000_000_000_000_000_000_000_000_U256);

/// Half a RAY, used for round-half-up at ray scale.
pub const HALF_RAY: U256 = uint!(500_000_000_000_000_000_000_000_000_U256);

/// 1e9 — the ratio between the ray and wad scales.
pub const WAD_RAY_RATIO: U256 = uint!(1_000_000_000_U256);

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Seconds in a non-leap year, the accrual period unit used on-chain.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

// ---------------------------------------------------------------------------
// Display scales
// ---------------------------------------------------------------------------

/// Decimals of the ray scale when rendered as a human decimal.
pub const RAY_DECIMALS: u32 = 27;

/// Decimals of the chain's base currency (wrapped native coin).
pub const BASE_CURRENCY_DECIMALS: u32 = 18;

/// Decimals of the oracle's USD quote unit.
pub const USD_DECIMALS: u32 = 10;

// ---------------------------------------------------------------------------
// Risk-parameter precisions
// ---------------------------------------------------------------------------

/// v2 stores LTV / liquidation threshold in basis points (1e4 = 100%).
pub const LTV_PRECISION: u32 = 4;

/// v1 stores LTV / liquidation threshold as whole percents (1e2 = 100%).
pub const LEGACY_LTV_PRECISION: u32 = 2;

/// Protocol borrow fee charged by the legacy pool on new borrows: 0.25%,
/// expressed as parts per ten thousand.
pub const LEGACY_BORROW_FEE_PPM: u64 = 25;

/// Denominator for [`LEGACY_BORROW_FEE_PPM`].
pub const LEGACY_BORROW_FEE_SCALE: u64 = 10_000;

/// Returns `10^decimals` as a [`U256`].
pub fn pow10(decimals: u32) -> U256 {
    U256::from(10).pow(U256::from(decimals))
}
