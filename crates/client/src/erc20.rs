//! ERC-20 reads and approval encoding.
//!
//! Async methods are RPC reads over a shared Alloy provider; encoding is
//! sync and local. The pool services consume the allowance read to
//! decide whether an approval transaction must precede an action.

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::RootProvider;
use anyhow::{Context, Result};
use tracing::debug;

use crate::contracts::IERC20;

/// Concrete provider type: Alloy HTTP provider over Ethereum network.
pub type HttpProvider = RootProvider;

/// Encode `approve(spender, amount)` calldata.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    let call = IERC20::approveCall { spender, amount };
    Bytes::from(alloy::sol_types::SolCall::abi_encode(&call))
}

/// Async read wrapper over ERC-20 tokens.
pub struct Erc20Service {
    provider: HttpProvider,
}

impl Erc20Service {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    /// Current allowance granted by `owner` to `spender`.
    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        let allowance = IERC20::new(token, self.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .context("allowance RPC call failed")?;
        debug!(%token, %owner, %spender, %allowance, "erc20 allowance");
        Ok(allowance)
    }

    /// Whether `spender` may already pull `amount` from `owner`.
    pub async fn is_approved(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool> {
        Ok(self.allowance(token, owner, spender).await? >= amount)
    }

    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .context("balanceOf RPC call failed")
    }

    pub async fn decimals(&self, token: Address) -> Result<u8> {
        IERC20::new(token, self.provider.clone())
            .decimals()
            .call()
            .await
            .context("decimals RPC call failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_encode_approve_selector() {
        let data = encode_approve(
            address!("7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9"),
            U256::MAX,
        );
        // approve(address,uint256) selector = 0x095ea7b3
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn test_encode_approve_roundtrip() {
        let spender = address!("7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9");
        let amount = U256::from(123_456u64);
        let data = encode_approve(spender, amount);
        let decoded =
            <IERC20::approveCall as alloy::sol_types::SolCall>::abi_decode(&data).unwrap();
        assert_eq!(decoded.spender, spender);
        assert_eq!(decoded.amount, amount);
    }
}
