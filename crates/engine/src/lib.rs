//! Off-chain interest-accrual and risk-aggregation engine for the
//! Palisade money market.
//!
//! Recomputes, from raw on-chain snapshots, the same fixed-point
//! quantities the pool contracts compute internally: compounded and
//! linear accrual indices, live balances, utilization-curve rates,
//! health factors, and incentive rewards. Everything is a pure function
//! of its snapshot inputs and a caller-supplied `current_timestamp` —
//! no clock reads, no I/O, no shared state — so results are
//! deterministic and replayable.
//!
//! Two on-chain generations are mirrored as two separate pipelines:
//!
//! - [`legacy`] — the v1 pool (origination fees, interest redirection,
//!   per-user recorded indices).
//! - [`scaled`] — the v2 pool (scaled balances, stable/variable debt
//!   split, index-based incentives).
//!
//! They share only the fixed-point primitives in [`math`]; their accrual
//! semantics differ and are deliberately not abstracted over.
//!
//! Fixed-point conventions: amounts are integers at their asset's
//! native decimals, prices are wad (1e18), rates and accrual indices are
//! ray (1e27). [`normalize`] is the single place values become human
//! decimal strings.

pub mod constants;
pub mod error;
pub mod legacy;
pub mod math;
pub mod normalize;
pub mod rates;
pub mod rewards;
pub mod scaled;

pub use error::{EngineError, MathError};
pub use normalize::{normalize, parse_units, NormalizeError};
pub use rates::{project_interest_rates, ComputedRates, InterestRateMode, RateProjectionInput};
pub use rewards::{calculate_incentives_apy, calculate_rewards};
