//! Write operations for the family-tree graph.
//!
//! Nodes and edges are addressed by their Neo4j element ids, which are
//! written back onto the relational rows as `graph_node_ref` /
//! `graph_edge_ref`.

use neo4rs::{query, BoltNull, BoltType, Query};

use heir_core::types::{CaseId, EdgeRef, NodeRef};

use crate::client::{GraphClient, GraphError};
use crate::mirror::{PersonNode, RelationshipEdge};
use crate::projection::{iso_date, PropertyChange, PropertyValue};

impl GraphClient {
    // ── Person Nodes ─────────────────────────────────────────────

    /// Create a `Person` node. Returns its element id.
    pub async fn create_person(&self, node: &PersonNode) -> Result<NodeRef, GraphError> {
        let q = query(
            "CREATE (p:Person {
               case_id: $case_id, person_id: $person_id, name: $name,
               is_alive: $is_alive, death_date: $death_date, birth_date: $birth_date,
               gender: $gender, is_decedent: $is_decedent, is_spouse: $is_spouse
             })
             RETURN elementId(p) AS node_id",
        )
        .param("case_id", node.case_id.0)
        .param("person_id", node.person_id.0)
        .param("name", node.name.clone())
        .param("is_alive", node.is_alive)
        .param("death_date", opt_text(node.death_date.map(iso_date)))
        .param("birth_date", opt_text(node.birth_date.map(iso_date)))
        .param("gender", opt_text(node.gender.clone()))
        .param("is_decedent", node.is_decedent)
        .param("is_spouse", node.is_spouse);

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::Serialization("CREATE returned no row".to_string()))?;
        let node_id: String = row
            .get("node_id")
            .map_err(|e| GraphError::Serialization(format!("Failed to read node id: {e}")))?;

        tracing::debug!(person_id = %node.person_id, node_id = %node_id, "Created person node");
        Ok(NodeRef(node_id))
    }

    /// Set the given properties on a `Person` node.
    pub async fn set_person_properties(
        &self,
        node_ref: &NodeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError> {
        if changes.is_empty() {
            return Ok(());
        }

        let cypher = format!(
            "MATCH (p:Person) WHERE elementId(p) = $node_id
             SET {}
             RETURN elementId(p) AS node_id",
            set_clause("p", changes)
        );
        let q = bind_changes(query(&cypher).param("node_id", node_ref.0.clone()), changes);

        match self.query_one(q).await? {
            Some(_) => Ok(()),
            None => Err(GraphError::NotFound {
                element: "node",
                id: node_ref.0.clone(),
            }),
        }
    }

    /// Delete a `Person` node and every relationship touching it.
    pub async fn detach_delete_person(&self, node_ref: &NodeRef) -> Result<(), GraphError> {
        let q = query(
            "MATCH (p:Person) WHERE elementId(p) = $node_id
             DETACH DELETE p",
        )
        .param("node_id", node_ref.0.clone());

        self.run(q).await
    }

    // ── Relationship Edges ───────────────────────────────────────

    /// Create a typed edge between two existing `Person` nodes.
    pub async fn create_edge(
        &self,
        from: &NodeRef,
        to: &NodeRef,
        edge: &RelationshipEdge,
    ) -> Result<EdgeRef, GraphError> {
        let rel_type = edge.relationship_type.graph_label();
        let cypher = format!(
            "MATCH (from:Person), (to:Person)
             WHERE elementId(from) = $from_node_id AND elementId(to) = $to_node_id
             CREATE (from)-[r:{rel_type} {{
               is_biological: $is_biological, is_adopted: $is_adopted, blood_type: $blood_type
             }}]->(to)
             RETURN elementId(r) AS rel_id"
        );

        let q = query(&cypher)
            .param("from_node_id", from.0.clone())
            .param("to_node_id", to.0.clone())
            .param("is_biological", opt_bool(edge.is_biological))
            .param("is_adopted", opt_bool(edge.is_adopted))
            .param(
                "blood_type",
                opt_text(edge.blood_type.map(|b| b.as_str().to_string())),
            );

        let row = self.query_one(q).await?.ok_or_else(|| GraphError::NotFound {
            element: "node",
            id: format!("{from} or {to}"),
        })?;
        let rel_id: String = row
            .get("rel_id")
            .map_err(|e| GraphError::Serialization(format!("Failed to read edge id: {e}")))?;

        tracing::debug!(rel_type, edge_id = %rel_id, "Created relationship edge");
        Ok(EdgeRef(rel_id))
    }

    /// Set the given properties on an edge.
    pub async fn set_edge_properties(
        &self,
        edge_ref: &EdgeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError> {
        if changes.is_empty() {
            return Ok(());
        }

        let cypher = format!(
            "MATCH ()-[r]->() WHERE elementId(r) = $relationship_id
             SET {}
             RETURN elementId(r) AS rel_id",
            set_clause("r", changes)
        );
        let q = bind_changes(
            query(&cypher).param("relationship_id", edge_ref.0.clone()),
            changes,
        );

        match self.query_one(q).await? {
            Some(_) => Ok(()),
            None => Err(GraphError::NotFound {
                element: "edge",
                id: edge_ref.0.clone(),
            }),
        }
    }

    /// Delete a single edge.
    pub async fn delete_edge(&self, edge_ref: &EdgeRef) -> Result<(), GraphError> {
        let q = query(
            "MATCH ()-[r]->() WHERE elementId(r) = $relationship_id
             DELETE r",
        )
        .param("relationship_id", edge_ref.0.clone());

        self.run(q).await
    }

    // ── Case Teardown ────────────────────────────────────────────

    /// Detach-delete every `Person` node of a case.
    pub async fn clear_case(&self, case_id: CaseId) -> Result<(), GraphError> {
        let q = query(
            "MATCH (p:Person {case_id: $case_id})
             DETACH DELETE p",
        )
        .param("case_id", case_id.0);

        self.run(q).await?;
        tracing::info!(case_id = %case_id, "Cleared case graph");
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn set_clause(var: &str, changes: &[PropertyChange]) -> String {
    changes
        .iter()
        .map(|c| format!("{var}.{key} = ${key}", key = c.key))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind_changes(mut q: Query, changes: &[PropertyChange]) -> Query {
    for change in changes {
        q = match &change.value {
            PropertyValue::Text(s) => q.param(change.key, s.clone()),
            PropertyValue::Bool(b) => q.param(change.key, *b),
        };
    }
    q
}

fn opt_text(opt: Option<String>) -> BoltType {
    match opt {
        Some(s) => s.into(),
        None => BoltType::Null(BoltNull),
    }
}

fn opt_bool(opt: Option<bool>) -> BoltType {
    match opt {
        Some(b) => b.into(),
        None => BoltType::Null(BoltNull),
    }
}
