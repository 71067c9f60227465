//! heir-store: the authoritative relational record.
//!
//! Cases, persons, and relationships live here first; the graph mirror is a
//! derived projection correlated through the `graph_node_ref` and
//! `graph_edge_ref` columns. Every relational step runs in its own short
//! transaction and is committed before any graph work starts.
//!
//! Child records are only reachable through an [`OwnedCase`], which can only
//! be obtained from [`Store::resolve_owned_case`].

pub mod cases;
pub mod error;
pub mod guard;
pub mod persons;
pub mod relationships;
mod rows;
pub mod schema;

use std::str::FromStr;

use heir_core::config::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use error::StoreError;
pub use guard::OwnedCase;
pub use relationships::ProjectionCounts;

/// Handle to the relational store. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect using the configured URL. Foreign keys are always enforced so
    /// that case and person deletes cascade.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&settings.url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(url = %settings.url, "Connected to relational store");
        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Pinned to a single connection that is never recycled; the database
    /// lives exactly as long as that connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
