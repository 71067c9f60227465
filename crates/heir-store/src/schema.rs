//! Development bootstrap of the three case tables.
//!
//! Production schemas are managed outside this crate; this exists for local
//! databases, the operator CLI, and tests.

use crate::{Store, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cases (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT,
    status      TEXT NOT NULL DEFAULT 'draft',
    owner_id    INTEGER NOT NULL,
    graph_id    TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cases_owner ON cases (owner_id);

CREATE TABLE IF NOT EXISTS persons (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id           INTEGER NOT NULL REFERENCES cases (id) ON DELETE CASCADE,
    name              TEXT NOT NULL,
    is_alive          INTEGER NOT NULL DEFAULT 1,
    birth_date        TEXT,
    death_date        TEXT,
    gender            TEXT,
    is_decedent       INTEGER NOT NULL DEFAULT 0,
    is_spouse         INTEGER NOT NULL DEFAULT 0,
    graph_node_ref    TEXT,
    projection_status TEXT NOT NULL DEFAULT 'pending',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_persons_case ON persons (case_id);

CREATE TABLE IF NOT EXISTS person_relationships (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id           INTEGER NOT NULL REFERENCES cases (id) ON DELETE CASCADE,
    from_person_id    INTEGER NOT NULL REFERENCES persons (id) ON DELETE CASCADE,
    to_person_id      INTEGER NOT NULL REFERENCES persons (id) ON DELETE CASCADE,
    relationship_type TEXT NOT NULL,
    is_biological     INTEGER,
    is_adopted        INTEGER,
    blood_type        TEXT,
    graph_edge_ref    TEXT,
    projection_status TEXT NOT NULL DEFAULT 'pending',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_relationships_case ON person_relationships (case_id);
CREATE INDEX IF NOT EXISTS idx_relationships_from ON person_relationships (from_person_id);
CREATE INDEX IF NOT EXISTS idx_relationships_to ON person_relationships (to_person_id);
"#;

impl Store {
    /// Create the case tables if they do not exist. Idempotent.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::debug!("Relational schema ensured");
        Ok(())
    }
}
