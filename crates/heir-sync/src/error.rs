//! Error types for the heir-sync crate.

use heir_calc::CalcError;
use heir_core::ErrorKind;
use heir_graph::GraphError;
use heir_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Absent, or owned by another caller. The two are never distinguished.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Relational store error: {0}")]
    Store(#[source] StoreError),

    #[error("Graph store error: {0}")]
    Graph(#[from] GraphError),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_) | Self::Graph(_) => ErrorKind::StoreFailure,
            Self::Calculation(_) => ErrorKind::CalculationFailure,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Store(other),
        }
    }
}

impl From<CalcError> for SyncError {
    fn from(err: CalcError) -> Self {
        match err {
            CalcError::Validation(message) => Self::Validation(message),
            CalcError::Engine(engine) => Self::Calculation(engine.0),
            other => Self::Calculation(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
