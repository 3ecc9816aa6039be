use thiserror::Error;

/// Typed error hierarchy for the client crate.
///
/// Encoding and validation errors use specific variants; application
/// code wraps provider I/O with `anyhow::Context` for propagation.
#[derive(Error, Debug)]
pub enum ClientError {
    // -- Validation ----------------------------------------------------------
    #[error("invalid address: {value:?}")]
    InvalidAddress { value: String },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("\"max\" amount is not accepted for {operation}")]
    MaxAmountNotAllowed { operation: &'static str },

    // -- Market configuration ------------------------------------------------
    #[error("market {market} does not configure a {name} contract")]
    MissingContract { market: String, name: &'static str },

    #[error("operation {operation} is not available on a {version:?} market")]
    UnsupportedOperation {
        operation: &'static str,
        version: crate::market::MarketVersion,
    },

    // -- Forwarded errors ----------------------------------------------------
    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}
