//! Error types for the heir-store crate.

use heir_core::types::ParseEnumError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Absent, or present but owned by someone else.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {source}")]
    Corrupt {
        table: &'static str,
        #[source]
        source: ParseEnumError,
    },
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
