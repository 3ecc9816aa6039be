//! Compile-time ABI definitions for the Palisade contracts via Alloy
//! `sol!` — encoding mistakes become compile errors instead of reverts.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

// ---------------------------------------------------------------------------
// Legacy (v1) Lending Pool
// ---------------------------------------------------------------------------

sol! {
    /// Legacy pool — whole-balance accounting, payable native entry
    /// points, origination fees charged on borrow.
    #[sol(rpc)]
    interface ILendingPoolV1 {
        function deposit(
            address reserve,
            uint256 amount,
            uint16 referralCode
        ) external payable;

        function borrow(
            address reserve,
            uint256 amount,
            uint256 interestRateMode,
            uint16 referralCode
        ) external;

        function repay(
            address reserve,
            uint256 amount,
            address onBehalfOf
        ) external payable;

        function swapBorrowRateMode(address reserve) external;

        function setUserUseReserveAsCollateral(
            address reserve,
            bool useAsCollateral
        ) external;

        function liquidationCall(
            address collateral,
            address reserve,
            address user,
            uint256 purchaseAmount,
            bool receiveAToken
        ) external payable;
    }
}

sol! {
    /// Legacy interest-bearing deposit token; withdrawal happens here,
    /// not on the pool.
    #[sol(rpc)]
    interface IATokenV1 {
        function redeem(uint256 amount) external;

        function redirectInterestStream(address to) external;

        function principalBalanceOf(address user) external view returns (uint256);
    }
}

// ---------------------------------------------------------------------------
// Scaled (v2) Lending Pool
// ---------------------------------------------------------------------------

sol! {
    /// Scaled pool — all entry points on the pool itself, amounts in
    /// ERC-20 units, `type(uint256).max` meaning "everything".
    #[sol(rpc)]
    interface ILendingPool {
        function deposit(
            address asset,
            uint256 amount,
            address onBehalfOf,
            uint16 referralCode
        ) external;

        function withdraw(
            address asset,
            uint256 amount,
            address to
        ) external returns (uint256);

        function borrow(
            address asset,
            uint256 amount,
            uint256 interestRateMode,
            uint16 referralCode,
            address onBehalfOf
        ) external;

        function repay(
            address asset,
            uint256 amount,
            uint256 rateMode,
            address onBehalfOf
        ) external returns (uint256);

        function swapBorrowRateMode(address asset, uint256 rateMode) external;

        function setUserUseReserveAsCollateral(
            address asset,
            bool useAsCollateral
        ) external;

        function liquidationCall(
            address collateralAsset,
            address debtAsset,
            address user,
            uint256 debtToCover,
            bool receiveAToken
        ) external;

        /// Aggregated user position in base currency.
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralBase,
            uint256 totalDebtBase,
            uint256 availableBorrowsBase,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );
    }
}

// ---------------------------------------------------------------------------
// ERC-20
// ---------------------------------------------------------------------------

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
    }
}

// ---------------------------------------------------------------------------
// Incentives Controller
// ---------------------------------------------------------------------------

sol! {
    /// Index-based liquidity-mining controller shared by the v2 tokens.
    #[sol(rpc)]
    interface IIncentivesController {
        function claimRewards(
            address[] calldata assets,
            uint256 amount,
            address to
        ) external returns (uint256);

        function getRewardsBalance(
            address[] calldata assets,
            address user
        ) external view returns (uint256);
    }
}
