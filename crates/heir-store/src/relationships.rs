//! Relationship relational operations, always scoped to an owned case.

use chrono::Utc;
use serde::Serialize;

use heir_core::types::{
    EdgeRef, PersonRelationship, ProjectionStatus, RelationshipCreate, RelationshipId,
    RelationshipUpdate,
};

use crate::rows::{hydrate_all, ProjectionCountRow, RelationshipRow, RELATIONSHIP_COLUMNS};
use crate::{OwnedCase, Store, StoreError};

/// Projection status tallies for one case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionCounts {
    pub persons_pending: i64,
    pub persons_projected: i64,
    pub persons_failed: i64,
    pub relationships_pending: i64,
    pub relationships_projected: i64,
    pub relationships_failed: i64,
}

impl Store {
    /// Insert a relationship with no graph reference and `pending` projection.
    ///
    /// Callers must already have resolved both endpoints inside `owned`.
    pub async fn insert_relationship(
        &self,
        owned: &OwnedCase,
        data: &RelationshipCreate,
    ) -> Result<PersonRelationship, StoreError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO person_relationships (case_id, from_person_id, to_person_id,
                 relationship_type, is_biological, is_adopted, blood_type, projection_status,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {RELATIONSHIP_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, RelationshipRow>(&sql)
            .bind(owned.id().0)
            .bind(data.from_person_id.0)
            .bind(data.to_person_id.0)
            .bind(data.relationship_type.as_str())
            .bind(data.is_biological)
            .bind(data.is_adopted)
            .bind(data.blood_type.map(|b| b.as_str()))
            .bind(ProjectionStatus::Pending.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        PersonRelationship::try_from(row)
    }

    pub async fn get_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
    ) -> Result<PersonRelationship, StoreError> {
        let sql = format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM person_relationships WHERE id = ? AND case_id = ?"
        );
        let row = sqlx::query_as::<_, RelationshipRow>(&sql)
            .bind(relationship_id.0)
            .bind(owned.id().0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("relationship", relationship_id.0))?;
        PersonRelationship::try_from(row)
    }

    pub async fn list_relationships(
        &self,
        owned: &OwnedCase,
    ) -> Result<Vec<PersonRelationship>, StoreError> {
        let sql = format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM person_relationships WHERE case_id = ? ORDER BY id"
        );
        let rows = sqlx::query_as::<_, RelationshipRow>(&sql)
            .bind(owned.id().0)
            .fetch_all(&self.pool)
            .await?;
        hydrate_all(rows)
    }

    /// Relationships whose edge is missing or known to be stale.
    ///
    /// A `failed` row may still carry the reference of an edge that no longer
    /// matches it; that edge has to be replaced.
    pub async fn list_relationships_to_project(
        &self,
        owned: &OwnedCase,
    ) -> Result<Vec<PersonRelationship>, StoreError> {
        let sql = format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM person_relationships
             WHERE case_id = ? AND (graph_edge_ref IS NULL OR projection_status = ?)
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, RelationshipRow>(&sql)
            .bind(owned.id().0)
            .bind(ProjectionStatus::Failed.as_str())
            .fetch_all(&self.pool)
            .await?;
        hydrate_all(rows)
    }

    /// Apply only the present fields of `update` in one transaction.
    pub async fn update_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
        update: &RelationshipUpdate,
    ) -> Result<PersonRelationship, StoreError> {
        let select = format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM person_relationships WHERE id = ? AND case_id = ?"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, RelationshipRow>(&select)
            .bind(relationship_id.0)
            .bind(owned.id().0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("relationship", relationship_id.0))?;

        let mut rel = PersonRelationship::try_from(row)?;
        update.apply_to(&mut rel);
        rel.updated_at = Utc::now();

        sqlx::query(
            "UPDATE person_relationships
             SET relationship_type = ?, is_biological = ?, is_adopted = ?, blood_type = ?,
                 updated_at = ?
             WHERE id = ? AND case_id = ?",
        )
        .bind(rel.relationship_type.as_str())
        .bind(rel.is_biological)
        .bind(rel.is_adopted)
        .bind(rel.blood_type.map(|b| b.as_str()))
        .bind(rel.updated_at)
        .bind(rel.id.0)
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(rel)
    }

    /// Write back the graph edge id and mark the relationship `projected`.
    pub async fn set_relationship_edge_ref(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
        edge_ref: &EdgeRef,
    ) -> Result<PersonRelationship, StoreError> {
        let sql = format!(
            "UPDATE person_relationships
             SET graph_edge_ref = ?, projection_status = ?, updated_at = ?
             WHERE id = ? AND case_id = ?
             RETURNING {RELATIONSHIP_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, RelationshipRow>(&sql)
            .bind(&edge_ref.0)
            .bind(ProjectionStatus::Projected.as_str())
            .bind(Utc::now())
            .bind(relationship_id.0)
            .bind(owned.id().0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("relationship", relationship_id.0))?;
        tx.commit().await?;

        PersonRelationship::try_from(row)
    }

    /// Drop the edge reference, leaving the relationship with `status`.
    pub async fn clear_relationship_edge_ref(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
        status: ProjectionStatus,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE person_relationships SET graph_edge_ref = NULL, projection_status = ?
             WHERE id = ? AND case_id = ?",
        )
        .bind(status.as_str())
        .bind(relationship_id.0)
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("relationship", relationship_id.0));
        }
        Ok(())
    }

    pub async fn set_relationship_projection_status(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
        status: ProjectionStatus,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE person_relationships SET projection_status = ? WHERE id = ? AND case_id = ?",
        )
        .bind(status.as_str())
        .bind(relationship_id.0)
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("relationship", relationship_id.0));
        }
        Ok(())
    }

    pub async fn delete_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM person_relationships WHERE id = ? AND case_id = ?")
            .bind(relationship_id.0)
            .bind(owned.id().0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("relationship", relationship_id.0));
        }
        Ok(())
    }

    /// Forget every graph reference in the case and mark all rows `pending`.
    ///
    /// Used after the case's subgraph has been cleared, so the reconciler can
    /// rebuild it from scratch.
    pub async fn reset_case_projection(&self, owned: &OwnedCase) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let persons = sqlx::query(
            "UPDATE persons SET graph_node_ref = NULL, projection_status = ? WHERE case_id = ?",
        )
        .bind(ProjectionStatus::Pending.as_str())
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        let relationships = sqlx::query(
            "UPDATE person_relationships SET graph_edge_ref = NULL, projection_status = ?
             WHERE case_id = ?",
        )
        .bind(ProjectionStatus::Pending.as_str())
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(persons.rows_affected() + relationships.rows_affected())
    }

    /// Tally projection statuses of persons and relationships in a case.
    pub async fn projection_counts(
        &self,
        owned: &OwnedCase,
    ) -> Result<ProjectionCounts, StoreError> {
        let rows = sqlx::query_as::<_, ProjectionCountRow>(
            "SELECT 'person' AS kind, projection_status, COUNT(*) AS n
             FROM persons WHERE case_id = ? GROUP BY projection_status
             UNION ALL
             SELECT 'relationship' AS kind, projection_status, COUNT(*) AS n
             FROM person_relationships WHERE case_id = ? GROUP BY projection_status",
        )
        .bind(owned.id().0)
        .bind(owned.id().0)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = ProjectionCounts::default();
        for row in rows {
            let status: ProjectionStatus =
                row.projection_status
                    .parse()
                    .map_err(|source| StoreError::Corrupt {
                        table: if row.kind == "person" {
                            "persons"
                        } else {
                            "person_relationships"
                        },
                        source,
                    })?;
            let slot = match (row.kind.as_str(), status) {
                ("person", ProjectionStatus::Pending) => &mut counts.persons_pending,
                ("person", ProjectionStatus::Projected) => &mut counts.persons_projected,
                ("person", ProjectionStatus::Failed) => &mut counts.persons_failed,
                (_, ProjectionStatus::Pending) => &mut counts.relationships_pending,
                (_, ProjectionStatus::Projected) => &mut counts.relationships_projected,
                (_, ProjectionStatus::Failed) => &mut counts.relationships_failed,
            };
            *slot += row.n;
        }
        Ok(counts)
    }
}
