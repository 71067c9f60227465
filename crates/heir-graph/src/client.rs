//! Neo4j connection management and shared graph client.

use heir_core::config::Neo4jSettings;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Graph {element} not found: {id}")]
    NotFound { element: &'static str, id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// One long-lived client is shared across requests; every query borrows its
/// own session from the pool. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect and verify the server answers before handing the client out.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        let client = Self { graph };
        client.ping().await?;

        tracing::info!(uri = %config.uri, "Connected to graph store");
        Ok(client)
    }

    /// Round-trip a trivial query. Any failure is reported as a connection error.
    pub async fn ping(&self) -> Result<(), GraphError> {
        let mut stream = self
            .graph
            .execute(query("RETURN 1 AS ok"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        stream
            .next()
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Execute a statement that returns nothing the caller needs.
    pub async fn run(&self, q: Query) -> Result<(), GraphError> {
        self.graph.run(q).await.map_err(|e| {
            tracing::debug!(error = %e, "Graph statement failed");
            GraphError::Query(e)
        })
    }

    pub async fn query_rows(&self, q: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        tracing::debug!(rows = rows.len(), "Graph query returned");
        Ok(rows)
    }

    /// First row only; CREATE ... RETURN and single-element MATCHes.
    pub async fn query_one(&self, q: Query) -> Result<Option<Row>, GraphError> {
        let mut stream = self.graph.execute(q).await?;
        Ok(stream.next().await?)
    }
}
