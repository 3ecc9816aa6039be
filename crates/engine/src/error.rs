use thiserror::Error;

/// Numeric-range failures inside the fixed-point primitives.
///
/// These are fatal to the computation that raised them: silently
/// saturating or wrapping would misstate risk numbers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("fixed-point overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("current timestamp {current} precedes last update {last_update}")]
    NegativeTimeDelta { last_update: u64, current: u64 },
}

/// Errors surfaced by the engine's public entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // -- Data integrity ------------------------------------------------------
    /// A user position references a reserve absent from the supplied
    /// reserve set. Never defaulted to zero.
    #[error("user position references unknown reserve {id}")]
    UnknownReserve { id: String },

    // -- Numeric -------------------------------------------------------------
    #[error(transparent)]
    Math(#[from] MathError),
}
