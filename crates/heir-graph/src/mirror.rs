//! The graph mirror contract consumed by the dual-store coordinator.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use heir_core::types::{
    BloodType, CaseId, EdgeRef, NodeRef, Person, PersonId, PersonRelationship, RelationshipType,
};

use crate::client::{GraphClient, GraphError};
use crate::projection::PropertyChange;

/// Denormalized person attributes carried by a `Person` node.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonNode {
    pub case_id: CaseId,
    pub person_id: PersonId,
    pub name: String,
    pub is_alive: bool,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub is_decedent: bool,
    pub is_spouse: bool,
}

impl From<&Person> for PersonNode {
    fn from(p: &Person) -> Self {
        Self {
            case_id: p.case_id,
            person_id: p.id,
            name: p.name.clone(),
            is_alive: p.is_alive,
            birth_date: p.birth_date,
            death_date: p.death_date,
            gender: p.gender.clone(),
            is_decedent: p.is_decedent,
            is_spouse: p.is_spouse,
        }
    }
}

/// Type and properties of a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipEdge {
    pub relationship_type: RelationshipType,
    pub is_biological: Option<bool>,
    pub is_adopted: Option<bool>,
    pub blood_type: Option<BloodType>,
}

impl From<&PersonRelationship> for RelationshipEdge {
    fn from(r: &PersonRelationship) -> Self {
        Self {
            relationship_type: r.relationship_type,
            is_biological: r.is_biological,
            is_adopted: r.is_adopted,
            blood_type: r.blood_type,
        }
    }
}

/// A node as read back from the mirror.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorNode {
    pub node_ref: String,
    pub person_id: Option<i64>,
    pub name: String,
    pub is_alive: Option<bool>,
    pub is_decedent: Option<bool>,
    pub is_spouse: Option<bool>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub gender: Option<String>,
}

/// An edge as read back from the mirror.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorEdge {
    pub edge_ref: String,
    pub from_ref: String,
    pub to_ref: String,
    pub edge_type: String,
    pub is_biological: Option<bool>,
    pub is_adopted: Option<bool>,
    pub blood_type: Option<String>,
}

/// The mirrored subgraph of one case.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FamilyTreeGraph {
    pub nodes: Vec<MirrorNode>,
    pub edges: Vec<MirrorEdge>,
}

/// Node/edge CRUD keyed by opaque store-assigned identifiers.
///
/// Each call is an independent unit of work against the graph store; there
/// is no transaction shared with the relational record.
#[async_trait]
pub trait GraphMirror: Send + Sync {
    /// Create a `Person` node and return its element id.
    async fn create_person_node(&self, node: &PersonNode) -> Result<NodeRef, GraphError>;

    /// Set the given properties on an existing node.
    async fn update_person_node(
        &self,
        node_ref: &NodeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError>;

    /// Delete a node together with every incident edge.
    async fn delete_person_node(&self, node_ref: &NodeRef) -> Result<(), GraphError>;

    /// Create a typed edge `from -> to` and return its element id.
    async fn create_relationship_edge(
        &self,
        from: &NodeRef,
        to: &NodeRef,
        edge: &RelationshipEdge,
    ) -> Result<EdgeRef, GraphError>;

    async fn update_relationship_edge(
        &self,
        edge_ref: &EdgeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError>;

    async fn delete_relationship_edge(&self, edge_ref: &EdgeRef) -> Result<(), GraphError>;

    /// Remove every node of the case and all their edges in one operation.
    async fn clear_case_graph(&self, case_id: CaseId) -> Result<(), GraphError>;

    async fn fetch_family_tree(&self, case_id: CaseId) -> Result<FamilyTreeGraph, GraphError>;
}

#[async_trait]
impl GraphMirror for GraphClient {
    async fn create_person_node(&self, node: &PersonNode) -> Result<NodeRef, GraphError> {
        self.create_person(node).await
    }

    async fn update_person_node(
        &self,
        node_ref: &NodeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError> {
        self.set_person_properties(node_ref, changes).await
    }

    async fn delete_person_node(&self, node_ref: &NodeRef) -> Result<(), GraphError> {
        self.detach_delete_person(node_ref).await
    }

    async fn create_relationship_edge(
        &self,
        from: &NodeRef,
        to: &NodeRef,
        edge: &RelationshipEdge,
    ) -> Result<EdgeRef, GraphError> {
        self.create_edge(from, to, edge).await
    }

    async fn update_relationship_edge(
        &self,
        edge_ref: &EdgeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError> {
        self.set_edge_properties(edge_ref, changes).await
    }

    async fn delete_relationship_edge(&self, edge_ref: &EdgeRef) -> Result<(), GraphError> {
        self.delete_edge(edge_ref).await
    }

    async fn clear_case_graph(&self, case_id: CaseId) -> Result<(), GraphError> {
        self.clear_case(case_id).await
    }

    async fn fetch_family_tree(&self, case_id: CaseId) -> Result<FamilyTreeGraph, GraphError> {
        self.family_tree(case_id).await
    }
}
