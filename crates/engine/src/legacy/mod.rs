//! Legacy (v1) pool engine: origination fees, redirectable balances,
//! per-user recorded indices.

pub mod accrual;
pub mod summary;
pub mod types;
