//! Incentive-reward claiming against the incentives controller.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};

use crate::contracts::IIncentivesController;
use crate::erc20::HttpProvider;
use crate::error::ClientError;
use crate::market::MarketAddresses;
use crate::pool::{PreparedTx, TxKind};
use crate::validation::{check_amount_or_max, check_known_address, Amount};

/// Claim encoder and pending-reward reader for one market's incentives
/// controller.
pub struct IncentivesService {
    market: MarketAddresses,
}

impl IncentivesService {
    pub fn new(market: MarketAddresses) -> Self {
        Self { market }
    }

    /// Encode `claimRewards` over the given incentivised token addresses
    /// (aTokens and debt tokens, not underlyings).
    pub fn claim_rewards(
        &self,
        assets: &[Address],
        amount: Amount,
        to: Address,
    ) -> Result<PreparedTx, ClientError> {
        let controller = self.market.incentives_controller()?;
        let to = check_known_address(to)?;
        let amount = check_amount_or_max(amount)?;

        let call = IIncentivesController::claimRewardsCall {
            assets: assets.to_vec(),
            amount,
            to,
        };
        Ok(PreparedTx {
            to: controller,
            value: U256::ZERO,
            data: alloy::sol_types::SolCall::abi_encode(&call).into(),
            kind: TxKind::RewardClaim,
        })
    }

    /// Read the user's pending reward total across the given tokens.
    pub async fn rewards_balance(
        provider: &HttpProvider,
        controller: Address,
        assets: &[Address],
        user: Address,
    ) -> Result<U256> {
        IIncentivesController::new(controller, provider.clone())
            .getRewardsBalance(assets.to_vec(), user)
            .call()
            .await
            .context("getRewardsBalance RPC call failed")
    }
}
