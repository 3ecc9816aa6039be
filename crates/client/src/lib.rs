//! Transaction-construction glue for the Palisade money market.
//!
//! Typed contract bindings (Alloy `sol!`), explicit parameter
//! validation, a per-market address book, and sync calldata encoding for
//! every pool operation on both on-chain generations. Reads are async
//! over a shared Alloy provider; nothing here estimates gas, signs, or
//! submits — prepared transactions go back to the caller's wallet layer.
//!
//! Numeric pre-flight checks (health factor projections, hypothetical
//! rates) live in [`palisade_engine`]; this crate only moves data.

pub mod contracts;
pub mod erc20;
pub mod error;
pub mod incentives;
pub mod market;
pub mod pool;
pub mod validation;

pub use erc20::{Erc20Service, HttpProvider};
pub use error::ClientError;
pub use incentives::IncentivesService;
pub use market::{load_markets, MarketAddresses, MarketVersion, NATIVE_MOCK_ADDRESS};
pub use pool::{PoolService, PreparedTx, TxKind};
pub use validation::Amount;
