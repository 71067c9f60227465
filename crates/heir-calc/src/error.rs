//! Error types for the heir-calc crate.

use thiserror::Error;

/// Failure reported by the external Calculation Engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug)]
pub enum CalcError {
    /// The case's records cannot be handed to the engine as they are.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Calculation failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Engine returned an invalid share {numerator}/{denominator} for heir {heir_id}")]
    InvalidShare {
        heir_id: String,
        numerator: u64,
        denominator: u64,
    },
}
