//! Exact fixed-point → human-decimal string projection.
//!
//! The only place scale conversion to display decimals happens. String
//! arithmetic, not `Decimal`: ray values carry 27 fractional digits plus
//! integer digits, which exceeds `rust_decimal`'s 28-digit mantissa.

use alloy::primitives::U256;
use thiserror::Error;

use crate::constants::pow10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("not a decimal number: {0:?}")]
    Malformed(String),

    #[error("value does not fit in 256 bits: {0:?}")]
    OutOfRange(String),
}

/// Render `value` shifted down by `decimals`, with trailing fractional
/// zeros (and a bare trailing point) trimmed: `normalize(1_050, 2)` is
/// `"10.5"`, `normalize(0, n)` is `"0"`.
pub fn normalize(value: U256, decimals: u32) -> String {
    let digits = value.to_string();
    if decimals == 0 {
        return digits;
    }

    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_trimmed}")
    }
}

/// Parse a decimal string back to the integer at `decimals` scale.
///
/// Fractional digits beyond `decimals` are dropped (floor), so
/// `parse_units(&normalize(x, d), d)` recovers `x` exactly.
pub fn parse_units(value: &str, decimals: u32) -> Result<U256, NormalizeError> {
    let malformed = || NormalizeError::Malformed(value.to_string());

    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(malformed());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }

    let int_value: U256 = if int_part.is_empty() {
        U256::ZERO
    } else {
        int_part
            .parse()
            .map_err(|_| NormalizeError::OutOfRange(value.to_string()))?
    };

    let decimals = decimals as usize;
    let frac_padded: String = frac_part
        .chars()
        .chain(std::iter::repeat('0'))
        .take(decimals)
        .collect();
    let frac_value: U256 = if frac_padded.is_empty() {
        U256::ZERO
    } else {
        frac_padded
            .parse()
            .map_err(|_| NormalizeError::OutOfRange(value.to_string()))?
    };

    int_value
        .checked_mul(pow10(decimals as u32))
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| NormalizeError::OutOfRange(value.to_string()))
}
