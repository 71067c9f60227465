//! Configuration management for heir services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`HEIR__` prefix, `__` separator)
//! 2. Config file (`heir.toml`)
//! 3. Defaults

use serde::Deserialize;

use crate::error::HeirError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub neo4j: Neo4jSettings,
}

/// Relational store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection URL (e.g. `sqlite://heir.db?mode=rwc`).
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_database_connections")]
    pub max_connections: u32,
}

/// Graph store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,

    #[serde(default = "default_neo4j_user")]
    pub user: String,

    #[serde(default = "default_neo4j_password")]
    pub password: String,

    #[serde(default = "default_neo4j_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

fn default_database_url() -> String {
    "sqlite://heir.db?mode=rwc".to_string()
}

fn default_database_connections() -> u32 {
    5
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "heir-dev".to_string()
}

fn default_neo4j_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_database_connections(),
        }
    }
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            max_connections: default_neo4j_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and `HEIR__*`
    /// environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, HeirError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("HEIR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = cfg.try_deserialize()?;
        tracing::debug!(
            database_url = %app.database.url,
            neo4j_uri = %app.neo4j.uri,
            "Configuration loaded"
        );
        Ok(app)
    }
}
