//! Per-market contract address book.
//!
//! Markets are fixed, pre-deployed contract sets; one JSON document per
//! network lists them. Loading validates that every address a market's
//! generation requires is actually present, so misconfiguration fails at
//! startup rather than at encoding time.

use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// On-chain generation of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketVersion {
    Legacy,
    Scaled,
}

/// Mock address the legacy pool uses for the chain's native coin; a
/// deposit/repay against it attaches value instead of pulling ERC-20s.
pub const NATIVE_MOCK_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Variable rate mode discriminant shared by both pool generations.
pub const RATE_MODE_STABLE: U256 = U256::from_limbs([1, 0, 0, 0]);
pub const RATE_MODE_VARIABLE: U256 = U256::from_limbs([2, 0, 0, 0]);

/// Deployed contract addresses of one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAddresses {
    pub name: String,
    pub version: MarketVersion,
    pub lending_pool: Address,
    /// Legacy markets move funds through a separate core contract, which
    /// is what ERC-20 approvals must target.
    #[serde(default)]
    pub lending_pool_core: Option<Address>,
    #[serde(default)]
    pub incentives_controller: Option<Address>,
    #[serde(default)]
    pub price_oracle: Option<Address>,
}

impl MarketAddresses {
    /// The contract that pulls ERC-20 funds, i.e. the approval target.
    pub fn spender(&self) -> Result<Address, ClientError> {
        match self.version {
            MarketVersion::Legacy => {
                self.lending_pool_core
                    .ok_or_else(|| ClientError::MissingContract {
                        market: self.name.clone(),
                        name: "lendingPoolCore",
                    })
            }
            MarketVersion::Scaled => Ok(self.lending_pool),
        }
    }

    pub fn incentives_controller(&self) -> Result<Address, ClientError> {
        self.incentives_controller
            .ok_or_else(|| ClientError::MissingContract {
                market: self.name.clone(),
                name: "incentivesController",
            })
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.lending_pool == Address::ZERO {
            return Err(ClientError::MissingContract {
                market: self.name.clone(),
                name: "lendingPool",
            });
        }
        if self.version == MarketVersion::Legacy {
            self.spender()?;
        }
        Ok(())
    }
}

/// Parse and validate a JSON market list.
pub fn load_markets(json: &str) -> Result<Vec<MarketAddresses>, ClientError> {
    let markets: Vec<MarketAddresses> = serde_json::from_str(json)?;
    for market in &markets {
        market.validate()?;
    }
    Ok(markets)
}
