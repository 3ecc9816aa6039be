//! Explicit input validation for the public encoding entry points.
//!
//! Every `PoolService` / `Erc20Service` method calls these before
//! touching the ABI layer, so malformed input surfaces as a typed
//! [`ClientError`] instead of an encoded transaction that reverts.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A transaction amount: an exact quantity, or "everything" (encoded
/// on-chain as `type(uint256).max` for full repayments/withdrawals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Amount {
    Exact(U256),
    Max,
}

impl Amount {
    /// On-chain representation.
    pub fn into_raw(self) -> U256 {
        match self {
            Amount::Exact(value) => value,
            Amount::Max => U256::MAX,
        }
    }
}

/// Parse and validate an EVM address string.
pub fn check_address(value: &str) -> Result<Address, ClientError> {
    value.parse().map_err(|_| ClientError::InvalidAddress {
        value: value.to_string(),
    })
}

/// Reject the zero address (a common placeholder for "unset").
pub fn check_known_address(value: Address) -> Result<Address, ClientError> {
    if value == Address::ZERO {
        return Err(ClientError::InvalidAddress {
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Require a strictly positive exact amount.
pub fn check_amount(amount: U256) -> Result<U256, ClientError> {
    if amount.is_zero() {
        return Err(ClientError::ZeroAmount);
    }
    Ok(amount)
}

/// Require a strictly positive amount, allowing the `Max` marker.
pub fn check_amount_or_max(amount: Amount) -> Result<U256, ClientError> {
    match amount {
        Amount::Exact(value) => check_amount(value),
        Amount::Max => Ok(U256::MAX),
    }
}

/// Require a strictly positive exact amount where `Max` has no on-chain
/// meaning (deposits, borrows).
pub fn check_exact_amount(amount: Amount, operation: &'static str) -> Result<U256, ClientError> {
    match amount {
        Amount::Exact(value) => check_amount(value),
        Amount::Max => Err(ClientError::MaxAmountNotAllowed { operation }),
    }
}
