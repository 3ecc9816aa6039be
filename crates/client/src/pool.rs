//! Lending-pool transaction construction.
//!
//! Sync calldata encoding only — no submission, no gas estimation, no
//! signing. Each public method validates its inputs, then returns the
//! ordered transaction sequence the wallet must send: an ERC-20 approval
//! first when the supplied allowance is insufficient, then the pool
//! action. Native-coin operations attach value instead of approving.

use alloy::primitives::{Address, Bytes, U256};
use palisade_engine::InterestRateMode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contracts::{IATokenV1, ILendingPool, ILendingPoolV1};
use crate::erc20::encode_approve;
use crate::error::ClientError;
use crate::market::{
    MarketAddresses, MarketVersion, NATIVE_MOCK_ADDRESS, RATE_MODE_STABLE, RATE_MODE_VARIABLE,
};
use crate::validation::{
    check_amount_or_max, check_exact_amount, check_known_address, Amount,
};

/// Role of one transaction in a prepared sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxKind {
    Approval,
    PoolAction,
    RewardClaim,
}

/// A transaction ready for gas estimation and signing by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTx {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub kind: TxKind,
}

fn rate_mode_value(mode: InterestRateMode) -> U256 {
    match mode {
        InterestRateMode::Stable => RATE_MODE_STABLE,
        InterestRateMode::Variable => RATE_MODE_VARIABLE,
    }
}

fn encode<C: alloy::sol_types::SolCall>(call: &C) -> Bytes {
    Bytes::from(call.abi_encode())
}

/// Calldata encoder for one market's lending pool.
pub struct PoolService {
    market: MarketAddresses,
}

impl PoolService {
    pub fn new(market: MarketAddresses) -> Self {
        Self { market }
    }

    pub fn market(&self) -> &MarketAddresses {
        &self.market
    }

    fn require_version(
        &self,
        version: MarketVersion,
        operation: &'static str,
    ) -> Result<(), ClientError> {
        if self.market.version != version {
            return Err(ClientError::UnsupportedOperation {
                operation,
                version: self.market.version,
            });
        }
        Ok(())
    }

    /// Approval transaction when `current_allowance` cannot cover
    /// `amount`. Approvals are unlimited, matching the pool frontend's
    /// one-time-approval flow.
    fn approval_if_needed(
        &self,
        asset: Address,
        amount: U256,
        current_allowance: U256,
    ) -> Result<Option<PreparedTx>, ClientError> {
        if asset == NATIVE_MOCK_ADDRESS || current_allowance >= amount {
            return Ok(None);
        }
        Ok(Some(PreparedTx {
            to: asset,
            value: U256::ZERO,
            data: encode_approve(self.market.spender()?, U256::MAX),
            kind: TxKind::Approval,
        }))
    }

    // -----------------------------------------------------------------------
    // Scaled (v2) operations
    // -----------------------------------------------------------------------

    pub fn deposit(
        &self,
        asset: Address,
        amount: Amount,
        on_behalf_of: Address,
        referral_code: u16,
        current_allowance: U256,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "deposit")?;
        let asset = check_known_address(asset)?;
        let on_behalf_of = check_known_address(on_behalf_of)?;
        let amount = check_exact_amount(amount, "deposit")?;

        let mut txs = Vec::new();
        txs.extend(self.approval_if_needed(asset, amount, current_allowance)?);
        txs.push(PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::depositCall {
                asset,
                amount,
                onBehalfOf: on_behalf_of,
                referralCode: referral_code,
            }),
            kind: TxKind::PoolAction,
        });
        debug!(market = %self.market.name, %asset, %amount, txs = txs.len(), "encoded deposit");
        Ok(txs)
    }

    pub fn withdraw(
        &self,
        asset: Address,
        amount: Amount,
        to: Address,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "withdraw")?;
        let asset = check_known_address(asset)?;
        let to = check_known_address(to)?;
        let amount = check_amount_or_max(amount)?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::withdrawCall { asset, amount, to }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn borrow(
        &self,
        asset: Address,
        amount: Amount,
        interest_rate_mode: InterestRateMode,
        referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "borrow")?;
        let asset = check_known_address(asset)?;
        let on_behalf_of = check_known_address(on_behalf_of)?;
        let amount = check_exact_amount(amount, "borrow")?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::borrowCall {
                asset,
                amount,
                interestRateMode: rate_mode_value(interest_rate_mode),
                referralCode: referral_code,
                onBehalfOf: on_behalf_of,
            }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn repay(
        &self,
        asset: Address,
        amount: Amount,
        interest_rate_mode: InterestRateMode,
        on_behalf_of: Address,
        current_allowance: U256,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "repay")?;
        let asset = check_known_address(asset)?;
        let on_behalf_of = check_known_address(on_behalf_of)?;
        let amount = check_amount_or_max(amount)?;

        let mut txs = Vec::new();
        txs.extend(self.approval_if_needed(asset, amount, current_allowance)?);
        txs.push(PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::repayCall {
                asset,
                amount,
                rateMode: rate_mode_value(interest_rate_mode),
                onBehalfOf: on_behalf_of,
            }),
            kind: TxKind::PoolAction,
        });
        Ok(txs)
    }

    pub fn swap_borrow_rate_mode(
        &self,
        asset: Address,
        current_rate_mode: InterestRateMode,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "swapBorrowRateMode")?;
        let asset = check_known_address(asset)?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::swapBorrowRateModeCall {
                asset,
                rateMode: rate_mode_value(current_rate_mode),
            }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn set_usage_as_collateral(
        &self,
        asset: Address,
        use_as_collateral: bool,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "setUserUseReserveAsCollateral")?;
        let asset = check_known_address(asset)?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::setUserUseReserveAsCollateralCall {
                asset,
                useAsCollateral: use_as_collateral,
            }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn liquidation_call(
        &self,
        collateral_asset: Address,
        debt_asset: Address,
        user: Address,
        debt_to_cover: Amount,
        receive_atoken: bool,
        current_allowance: U256,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Scaled, "liquidationCall")?;
        let collateral_asset = check_known_address(collateral_asset)?;
        let debt_asset = check_known_address(debt_asset)?;
        let user = check_known_address(user)?;
        let debt_to_cover = check_amount_or_max(debt_to_cover)?;

        let mut txs = Vec::new();
        txs.extend(self.approval_if_needed(debt_asset, debt_to_cover, current_allowance)?);
        txs.push(PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPool::liquidationCallCall {
                collateralAsset: collateral_asset,
                debtAsset: debt_asset,
                user,
                debtToCover: debt_to_cover,
                receiveAToken: receive_atoken,
            }),
            kind: TxKind::PoolAction,
        });
        Ok(txs)
    }

    // -----------------------------------------------------------------------
    // Legacy (v1) operations
    // -----------------------------------------------------------------------

    pub fn legacy_deposit(
        &self,
        reserve: Address,
        amount: Amount,
        referral_code: u16,
        current_allowance: U256,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "deposit")?;
        let reserve = check_known_address(reserve)?;
        let amount = check_exact_amount(amount, "deposit")?;

        let is_native = reserve == NATIVE_MOCK_ADDRESS;
        let mut txs = Vec::new();
        txs.extend(self.approval_if_needed(reserve, amount, current_allowance)?);
        txs.push(PreparedTx {
            to: self.market.lending_pool,
            value: if is_native { amount } else { U256::ZERO },
            data: encode(&ILendingPoolV1::depositCall {
                reserve,
                amount,
                referralCode: referral_code,
            }),
            kind: TxKind::PoolAction,
        });
        Ok(txs)
    }

    pub fn legacy_borrow(
        &self,
        reserve: Address,
        amount: Amount,
        interest_rate_mode: InterestRateMode,
        referral_code: u16,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "borrow")?;
        let reserve = check_known_address(reserve)?;
        let amount = check_exact_amount(amount, "borrow")?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPoolV1::borrowCall {
                reserve,
                amount,
                interestRateMode: rate_mode_value(interest_rate_mode),
                referralCode: referral_code,
            }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn legacy_repay(
        &self,
        reserve: Address,
        amount: Amount,
        on_behalf_of: Address,
        current_allowance: U256,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "repay")?;
        let reserve = check_known_address(reserve)?;
        let on_behalf_of = check_known_address(on_behalf_of)?;

        let is_native = reserve == NATIVE_MOCK_ADDRESS;
        // Native repayments attach value, so "everything" has no
        // representable value to attach.
        let amount = if is_native {
            check_exact_amount(amount, "repay")?
        } else {
            check_amount_or_max(amount)?
        };

        let mut txs = Vec::new();
        txs.extend(self.approval_if_needed(reserve, amount, current_allowance)?);
        txs.push(PreparedTx {
            to: self.market.lending_pool,
            value: if is_native { amount } else { U256::ZERO },
            data: encode(&ILendingPoolV1::repayCall {
                reserve,
                amount,
                onBehalfOf: on_behalf_of,
            }),
            kind: TxKind::PoolAction,
        });
        Ok(txs)
    }

    /// Legacy withdrawals redeem through the aToken, not the pool.
    pub fn legacy_redeem(
        &self,
        atoken: Address,
        amount: Amount,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "redeem")?;
        let atoken = check_known_address(atoken)?;
        let amount = check_amount_or_max(amount)?;

        Ok(vec![PreparedTx {
            to: atoken,
            value: U256::ZERO,
            data: encode(&IATokenV1::redeemCall { amount }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn legacy_swap_borrow_rate_mode(
        &self,
        reserve: Address,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "swapBorrowRateMode")?;
        let reserve = check_known_address(reserve)?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPoolV1::swapBorrowRateModeCall { reserve }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn legacy_set_usage_as_collateral(
        &self,
        reserve: Address,
        use_as_collateral: bool,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "setUserUseReserveAsCollateral")?;
        let reserve = check_known_address(reserve)?;

        Ok(vec![PreparedTx {
            to: self.market.lending_pool,
            value: U256::ZERO,
            data: encode(&ILendingPoolV1::setUserUseReserveAsCollateralCall {
                reserve,
                useAsCollateral: use_as_collateral,
            }),
            kind: TxKind::PoolAction,
        }])
    }

    pub fn legacy_liquidation_call(
        &self,
        collateral: Address,
        reserve: Address,
        user: Address,
        purchase_amount: Amount,
        receive_atoken: bool,
        current_allowance: U256,
    ) -> Result<Vec<PreparedTx>, ClientError> {
        self.require_version(MarketVersion::Legacy, "liquidationCall")?;
        let collateral = check_known_address(collateral)?;
        let reserve = check_known_address(reserve)?;
        let user = check_known_address(user)?;
        let purchase_amount = check_exact_amount(purchase_amount, "liquidationCall")?;

        let is_native = reserve == NATIVE_MOCK_ADDRESS;
        let mut txs = Vec::new();
        txs.extend(self.approval_if_needed(reserve, purchase_amount, current_allowance)?);
        txs.push(PreparedTx {
            to: self.market.lending_pool,
            value: if is_native { purchase_amount } else { U256::ZERO },
            data: encode(&ILendingPoolV1::liquidationCallCall {
                collateral,
                reserve,
                user,
                purchaseAmount: purchase_amount,
                receiveAToken: receive_atoken,
            }),
            kind: TxKind::PoolAction,
        });
        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol_types::SolCall;

    const ASSET: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
    const USER: Address = address!("1234567890123456789012345678901234567890");

    fn scaled_market() -> MarketAddresses {
        MarketAddresses {
            name: "main".into(),
            version: MarketVersion::Scaled,
            lending_pool: address!("7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9"),
            lending_pool_core: None,
            incentives_controller: None,
            price_oracle: None,
        }
    }

    fn legacy_market() -> MarketAddresses {
        MarketAddresses {
            name: "classic".into(),
            version: MarketVersion::Legacy,
            lending_pool: address!("398eC7346DcD622eDc5ae82352F02bE94C62d119"),
            lending_pool_core: Some(address!("3dfd23A6c5E8BbcFc9581d2E864a68feb6a076d3")),
            incentives_controller: None,
            price_oracle: None,
        }
    }

    fn one_token() -> Amount {
        Amount::Exact(U256::from(1_000_000_000_000_000_000u128))
    }

    // -----------------------------------------------------------------------
    // Scaled encoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_deposit_selector() {
        let txs = PoolService::new(scaled_market())
            .deposit(ASSET, one_token(), USER, 0, U256::MAX)
            .unwrap();
        assert_eq!(txs.len(), 1);
        // deposit(address,uint256,address,uint16) selector = 0xe8eda9df
        assert_eq!(&txs[0].data[..4], &[0xe8, 0xed, 0xa9, 0xdf]);
        assert_eq!(txs[0].to, scaled_market().lending_pool);
    }

    #[test]
    fn test_deposit_prepends_approval_when_allowance_short() {
        let txs = PoolService::new(scaled_market())
            .deposit(ASSET, one_token(), USER, 0, U256::ZERO)
            .unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind, TxKind::Approval);
        assert_eq!(txs[0].to, ASSET);
        assert_eq!(txs[1].kind, TxKind::PoolAction);

        let approve =
            <crate::contracts::IERC20::approveCall as SolCall>::abi_decode(&txs[0].data)
                .unwrap();
        assert_eq!(approve.spender, scaled_market().lending_pool);
        assert_eq!(approve.amount, U256::MAX);
    }

    #[test]
    fn test_deposit_rejects_max_amount() {
        let err = PoolService::new(scaled_market())
            .deposit(ASSET, Amount::Max, USER, 0, U256::MAX)
            .unwrap_err();
        assert!(matches!(err, ClientError::MaxAmountNotAllowed { .. }));
    }

    #[test]
    fn test_withdraw_selector_and_max() {
        let txs = PoolService::new(scaled_market())
            .withdraw(ASSET, Amount::Max, USER)
            .unwrap();
        // withdraw(address,uint256,address) selector = 0x69328dec
        assert_eq!(&txs[0].data[..4], &[0x69, 0x32, 0x8d, 0xec]);
        let decoded =
            <ILendingPool::withdrawCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.amount, U256::MAX);
    }

    #[test]
    fn test_borrow_selector_and_rate_mode() {
        let txs = PoolService::new(scaled_market())
            .borrow(ASSET, one_token(), InterestRateMode::Variable, 0, USER)
            .unwrap();
        // borrow(address,uint256,uint256,uint16,address) selector = 0xa415bcad
        assert_eq!(&txs[0].data[..4], &[0xa4, 0x15, 0xbc, 0xad]);
        let decoded = <ILendingPool::borrowCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.interestRateMode, U256::from(2u64));
    }

    #[test]
    fn test_repay_selector() {
        let txs = PoolService::new(scaled_market())
            .repay(ASSET, one_token(), InterestRateMode::Stable, USER, U256::MAX)
            .unwrap();
        // repay(address,uint256,uint256,address) selector = 0x573ade81
        assert_eq!(&txs[0].data[..4], &[0x57, 0x3a, 0xde, 0x81]);
        let decoded = <ILendingPool::repayCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.rateMode, U256::from(1u64));
    }

    #[test]
    fn test_set_usage_as_collateral_selector() {
        let txs = PoolService::new(scaled_market())
            .set_usage_as_collateral(ASSET, true)
            .unwrap();
        // setUserUseReserveAsCollateral(address,bool) selector = 0x5a3b74b9
        assert_eq!(&txs[0].data[..4], &[0x5a, 0x3b, 0x74, 0xb9]);
    }

    #[test]
    fn test_liquidation_call_selector() {
        let txs = PoolService::new(scaled_market())
            .liquidation_call(ASSET, ASSET, USER, one_token(), false, U256::MAX)
            .unwrap();
        // liquidationCall(address,address,address,uint256,bool) = 0x00a718a9
        assert_eq!(&txs[0].data[..4], &[0x00, 0xa7, 0x18, 0xa9]);
    }

    #[test]
    fn test_zero_address_rejected() {
        let err = PoolService::new(scaled_market())
            .deposit(Address::ZERO, one_token(), USER, 0, U256::MAX)
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress { .. }));
    }

    #[test]
    fn test_version_guard() {
        let err = PoolService::new(legacy_market())
            .deposit(ASSET, one_token(), USER, 0, U256::MAX)
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedOperation { .. }));

        let err = PoolService::new(scaled_market())
            .legacy_deposit(ASSET, one_token(), 0, U256::MAX)
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedOperation { .. }));
    }

    // -----------------------------------------------------------------------
    // Legacy encoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_legacy_deposit_roundtrip() {
        let txs = PoolService::new(legacy_market())
            .legacy_deposit(ASSET, one_token(), 0, U256::MAX)
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].value, U256::ZERO);
        let decoded =
            <ILendingPoolV1::depositCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.reserve, ASSET);
        assert_eq!(decoded.amount, one_token().into_raw());
    }

    #[test]
    fn test_legacy_native_deposit_attaches_value_without_approval() {
        let txs = PoolService::new(legacy_market())
            .legacy_deposit(NATIVE_MOCK_ADDRESS, one_token(), 0, U256::ZERO)
            .unwrap();
        // No approval even at zero allowance, value carries the amount.
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].value, one_token().into_raw());
    }

    #[test]
    fn test_legacy_approval_targets_core() {
        let txs = PoolService::new(legacy_market())
            .legacy_deposit(ASSET, one_token(), 0, U256::ZERO)
            .unwrap();
        assert_eq!(txs.len(), 2);
        let approve =
            <crate::contracts::IERC20::approveCall as SolCall>::abi_decode(&txs[0].data)
                .unwrap();
        assert_eq!(
            approve.spender,
            legacy_market().lending_pool_core.unwrap()
        );
    }

    #[test]
    fn test_legacy_native_repay_rejects_max() {
        let err = PoolService::new(legacy_market())
            .legacy_repay(NATIVE_MOCK_ADDRESS, Amount::Max, USER, U256::ZERO)
            .unwrap_err();
        assert!(matches!(err, ClientError::MaxAmountNotAllowed { .. }));
    }

    #[test]
    fn test_legacy_repay_roundtrip() {
        let txs = PoolService::new(legacy_market())
            .legacy_repay(ASSET, Amount::Max, USER, U256::MAX)
            .unwrap();
        let decoded =
            <ILendingPoolV1::repayCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.amount, U256::MAX);
        assert_eq!(decoded.onBehalfOf, USER);
    }

    #[test]
    fn test_legacy_redeem_targets_atoken() {
        let atoken = address!("fC1E690f61EFd961294b3e1Ce3313fBD8aa4f85d");
        let txs = PoolService::new(legacy_market())
            .legacy_redeem(atoken, one_token())
            .unwrap();
        assert_eq!(txs[0].to, atoken);
        let decoded = <IATokenV1::redeemCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.amount, one_token().into_raw());
    }

    #[test]
    fn test_legacy_borrow_roundtrip() {
        let txs = PoolService::new(legacy_market())
            .legacy_borrow(ASSET, one_token(), InterestRateMode::Stable, 0)
            .unwrap();
        let decoded =
            <ILendingPoolV1::borrowCall as SolCall>::abi_decode(&txs[0].data).unwrap();
        assert_eq!(decoded.interestRateMode, U256::from(1u64));
    }

    #[test]
    fn test_legacy_swap_rate_mode_roundtrip() {
        let txs = PoolService::new(legacy_market())
            .legacy_swap_borrow_rate_mode(ASSET)
            .unwrap();
        let decoded =
            <ILendingPoolV1::swapBorrowRateModeCall as SolCall>::abi_decode(&txs[0].data)
                .unwrap();
        assert_eq!(decoded.reserve, ASSET);
    }

    #[test]
    fn test_legacy_liquidation_native_value() {
        let txs = PoolService::new(legacy_market())
            .legacy_liquidation_call(
                ASSET,
                NATIVE_MOCK_ADDRESS,
                USER,
                one_token(),
                true,
                U256::ZERO,
            )
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].value, one_token().into_raw());
        let decoded =
            <ILendingPoolV1::liquidationCallCall as SolCall>::abi_decode(&txs[0].data)
                .unwrap();
        assert!(decoded.receiveAToken);
    }
}
