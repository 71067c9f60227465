//! Read operations for the family-tree graph.

use neo4rs::query;

use heir_core::types::CaseId;

use crate::client::{GraphClient, GraphError};
use crate::mirror::{FamilyTreeGraph, MirrorEdge, MirrorNode};

impl GraphClient {
    /// All mirrored persons of a case and the edges between them.
    pub async fn family_tree(&self, case_id: CaseId) -> Result<FamilyTreeGraph, GraphError> {
        let persons_q = query(
            "MATCH (p:Person {case_id: $case_id})
             RETURN elementId(p) AS id, p.person_id AS person_id, p.name AS name,
                    p.is_alive AS is_alive, p.is_decedent AS is_decedent,
                    p.is_spouse AS is_spouse, p.birth_date AS birth_date,
                    p.death_date AS death_date, p.gender AS gender
             ORDER BY p.person_id",
        )
        .param("case_id", case_id.0);

        let rows = self.query_rows(persons_q).await?;
        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let node_ref: String = row.get("id").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node id: {e}"))
            })?;
            nodes.push(MirrorNode {
                node_ref,
                person_id: row.get("person_id").ok(),
                name: row.get("name").unwrap_or_default(),
                is_alive: row.get("is_alive").ok(),
                is_decedent: row.get("is_decedent").ok(),
                is_spouse: row.get("is_spouse").ok(),
                birth_date: row.get("birth_date").ok(),
                death_date: row.get("death_date").ok(),
                gender: row.get("gender").ok(),
            });
        }

        let rels_q = query(
            "MATCH (from:Person {case_id: $case_id})-[r]->(to:Person)
             RETURN elementId(r) AS id, elementId(from) AS from_id, elementId(to) AS to_id,
                    type(r) AS rel_type, r.is_biological AS is_biological,
                    r.is_adopted AS is_adopted, r.blood_type AS blood_type",
        )
        .param("case_id", case_id.0);

        let rows = self.query_rows(rels_q).await?;
        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let edge_ref: String = row.get("id").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize relation id: {e}"))
            })?;
            edges.push(MirrorEdge {
                edge_ref,
                from_ref: row.get("from_id").unwrap_or_default(),
                to_ref: row.get("to_id").unwrap_or_default(),
                edge_type: row.get("rel_type").unwrap_or_default(),
                is_biological: row.get("is_biological").ok(),
                is_adopted: row.get("is_adopted").ok(),
                blood_type: row.get("blood_type").ok(),
            });
        }

        tracing::debug!(
            case_id = %case_id,
            nodes = nodes.len(),
            edges = edges.len(),
            "Fetched case family tree"
        );
        Ok(FamilyTreeGraph { nodes, edges })
    }

    /// Count `Person` nodes of a case.
    pub async fn count_case_nodes(&self, case_id: CaseId) -> Result<i64, GraphError> {
        let q = query(
            "MATCH (p:Person {case_id: $case_id})
             RETURN count(p) AS cnt",
        )
        .param("case_id", case_id.0);

        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }
}
