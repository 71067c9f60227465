//! Dual-Store Coordinator.
//!
//! Every mutation writes the relational record first and commits it, then
//! derives the graph operations and writes any returned graph identifier
//! back onto the row. The two stores share no transaction: a graph failure
//! after the relational commit is reported to the caller, but the committed
//! relational change stays.
//!
//! Deletes run the other way round. The graph element is removed first and
//! the relational row is only deleted once that succeeded.

use std::sync::Arc;

use heir_core::types::{
    CaseId, NodeRef, Person, PersonCreate, PersonId, PersonRelationship, PersonUpdate,
    ProjectionStatus, RelationshipCreate, RelationshipId, RelationshipUpdate, UserId,
};
use heir_graph::projection::{person_changes, relationship_changes};
use heir_graph::{FamilyTreeGraph, GraphMirror, PersonNode, RelationshipEdge};
use heir_store::{OwnedCase, Store};

use crate::error::Result;

/// Orchestrates person and relationship lifecycles across both stores.
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) store: Store,
    pub(crate) graph: Arc<dyn GraphMirror>,
}

impl Coordinator {
    pub fn new(store: Store, graph: Arc<dyn GraphMirror>) -> Self {
        Self { store, graph }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Ownership guard. Every case-scoped operation starts here.
    pub async fn resolve(&self, case_id: CaseId, caller: UserId) -> Result<OwnedCase> {
        Ok(self.store.resolve_owned_case(case_id, caller).await?)
    }

    // ── Persons ───────────────────────────────────────────────────

    pub async fn get_person(&self, owned: &OwnedCase, person_id: PersonId) -> Result<Person> {
        Ok(self.store.get_person(owned, person_id).await?)
    }

    /// Insert the person, then project it as a graph node.
    ///
    /// On a graph failure the person stays in the relational store without a
    /// node reference, marked `failed`, and the error is returned.
    pub async fn create_person(&self, owned: &OwnedCase, data: &PersonCreate) -> Result<Person> {
        let person = self.store.insert_person(owned, data).await?;
        tracing::info!(case_id = %owned.id(), person_id = %person.id, "Person recorded");

        match self.project_person(owned, &person).await {
            Ok(projected) => Ok(projected),
            Err(e) => {
                tracing::warn!(
                    case_id = %owned.id(),
                    person_id = %person.id,
                    error = %e,
                    "Person committed without graph projection"
                );
                self.mark_person(owned, person.id, ProjectionStatus::Failed)
                    .await;
                Err(e)
            }
        }
    }

    /// Apply the present fields relationally, then push the explicitly
    /// valued ones to the node if the person has one.
    pub async fn update_person(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
        update: &PersonUpdate,
    ) -> Result<Person> {
        let person = self.store.update_person(owned, person_id, update).await?;
        tracing::info!(case_id = %owned.id(), person_id = %person_id, "Person updated");

        let Some(node_ref) = &person.graph_node_ref else {
            tracing::debug!(person_id = %person_id, "No graph node; update not propagated");
            return Ok(person);
        };

        let changes = person_changes(update);
        if !changes.is_empty() {
            if let Err(e) = self.graph.update_person_node(node_ref, &changes).await {
                tracing::warn!(
                    person_id = %person_id,
                    error = %e,
                    "Person updated relationally but graph node is stale"
                );
                return Err(e.into());
            }
        }
        Ok(person)
    }

    /// Remove the node (and its incident edges), then the row. Relational
    /// relationships referencing the person go with it by cascade.
    pub async fn delete_person(&self, owned: &OwnedCase, person_id: PersonId) -> Result<()> {
        let person = self.store.get_person(owned, person_id).await?;

        if let Some(node_ref) = &person.graph_node_ref {
            self.graph.delete_person_node(node_ref).await?;
        }
        self.store.delete_person(owned, person_id).await?;

        tracing::info!(case_id = %owned.id(), person_id = %person_id, "Person deleted");
        Ok(())
    }

    // ── Relationships ─────────────────────────────────────────────

    pub async fn get_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
    ) -> Result<PersonRelationship> {
        Ok(self.store.get_relationship(owned, relationship_id).await?)
    }

    /// Insert the relationship, then create its edge if both endpoints are
    /// already projected. Otherwise it stays `pending` with no edge.
    pub async fn create_relationship(
        &self,
        owned: &OwnedCase,
        data: &RelationshipCreate,
    ) -> Result<PersonRelationship> {
        let from = self.store.get_person(owned, data.from_person_id).await?;
        let to = self.store.get_person(owned, data.to_person_id).await?;

        let rel = self.store.insert_relationship(owned, data).await?;
        tracing::info!(
            case_id = %owned.id(),
            relationship_id = %rel.id,
            relationship_type = rel.relationship_type.as_str(),
            "Relationship recorded"
        );

        let (Some(from_ref), Some(to_ref)) = (&from.graph_node_ref, &to.graph_node_ref) else {
            tracing::warn!(
                case_id = %owned.id(),
                relationship_id = %rel.id,
                "Endpoint has no graph node; relationship left unprojected"
            );
            return Ok(rel);
        };

        match self.project_relationship(owned, &rel, from_ref, to_ref).await {
            Ok(projected) => Ok(projected),
            Err(e) => {
                tracing::warn!(
                    case_id = %owned.id(),
                    relationship_id = %rel.id,
                    error = %e,
                    "Relationship committed without graph projection"
                );
                self.mark_relationship(owned, rel.id, ProjectionStatus::Failed)
                    .await;
                Err(e)
            }
        }
    }

    /// Apply the present fields relationally. A projected relationship whose
    /// type changed gets a new edge; otherwise only edge properties change.
    pub async fn update_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
        update: &RelationshipUpdate,
    ) -> Result<PersonRelationship> {
        let before = self.store.get_relationship(owned, relationship_id).await?;
        let rel = self
            .store
            .update_relationship(owned, relationship_id, update)
            .await?;
        tracing::info!(
            case_id = %owned.id(),
            relationship_id = %relationship_id,
            "Relationship updated"
        );

        let Some(edge_ref) = &rel.graph_edge_ref else {
            return Ok(rel);
        };

        if rel.relationship_type == before.relationship_type {
            let changes = relationship_changes(update);
            if !changes.is_empty() {
                self.graph.update_relationship_edge(edge_ref, &changes).await?;
            }
            return Ok(rel);
        }

        // Edge types are immutable in the graph store.
        if let Err(e) = self.graph.delete_relationship_edge(edge_ref).await {
            tracing::warn!(
                relationship_id = %relationship_id,
                error = %e,
                "Relationship type changed but old edge is still in the graph"
            );
            self.mark_relationship(owned, relationship_id, ProjectionStatus::Failed)
                .await;
            return Err(e.into());
        }

        let from = self.store.get_person(owned, rel.from_person_id).await?;
        let to = self.store.get_person(owned, rel.to_person_id).await?;
        let (Some(from_ref), Some(to_ref)) = (&from.graph_node_ref, &to.graph_node_ref) else {
            self.store
                .clear_relationship_edge_ref(owned, relationship_id, ProjectionStatus::Pending)
                .await?;
            return Ok(self.store.get_relationship(owned, relationship_id).await?);
        };

        match self.project_relationship(owned, &rel, from_ref, to_ref).await {
            Ok(replaced) => Ok(replaced),
            Err(e) => {
                tracing::warn!(
                    relationship_id = %relationship_id,
                    error = %e,
                    "Old edge removed but replacement was not projected"
                );
                if let Err(clear_err) = self
                    .store
                    .clear_relationship_edge_ref(owned, relationship_id, ProjectionStatus::Failed)
                    .await
                {
                    tracing::warn!(error = %clear_err, "Failed to clear stale edge reference");
                }
                Err(e)
            }
        }
    }

    pub async fn delete_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
    ) -> Result<()> {
        let rel = self.store.get_relationship(owned, relationship_id).await?;

        if let Some(edge_ref) = &rel.graph_edge_ref {
            self.graph.delete_relationship_edge(edge_ref).await?;
        }
        self.store.delete_relationship(owned, relationship_id).await?;

        tracing::info!(
            case_id = %owned.id(),
            relationship_id = %relationship_id,
            "Relationship deleted"
        );
        Ok(())
    }

    /// The mirrored subgraph of a case, as the graph store currently holds it.
    pub async fn graph_snapshot(&self, owned: &OwnedCase) -> Result<FamilyTreeGraph> {
        Ok(self.graph.fetch_family_tree(owned.id()).await?)
    }

    // ── Projection steps ──────────────────────────────────────────

    /// Create the node and write its reference back.
    pub(crate) async fn project_person(&self, owned: &OwnedCase, person: &Person) -> Result<Person> {
        let node_ref = self
            .graph
            .create_person_node(&PersonNode::from(person))
            .await?;
        let projected = self
            .store
            .set_person_node_ref(owned, person.id, &node_ref)
            .await?;
        tracing::debug!(person_id = %person.id, node_ref = %node_ref, "Person projected");
        Ok(projected)
    }

    /// Create the edge between two projected endpoints and write its
    /// reference back.
    pub(crate) async fn project_relationship(
        &self,
        owned: &OwnedCase,
        rel: &PersonRelationship,
        from_ref: &NodeRef,
        to_ref: &NodeRef,
    ) -> Result<PersonRelationship> {
        let edge_ref = self
            .graph
            .create_relationship_edge(from_ref, to_ref, &RelationshipEdge::from(rel))
            .await?;
        let projected = self
            .store
            .set_relationship_edge_ref(owned, rel.id, &edge_ref)
            .await?;
        tracing::debug!(relationship_id = %rel.id, edge_ref = %edge_ref, "Relationship projected");
        Ok(projected)
    }

    /// Best-effort status write; the original failure is what gets reported.
    pub(crate) async fn mark_person(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
        status: ProjectionStatus,
    ) {
        if let Err(e) = self
            .store
            .set_person_projection_status(owned, person_id, status)
            .await
        {
            tracing::warn!(person_id = %person_id, error = %e, "Failed to record projection status");
        }
    }

    pub(crate) async fn mark_relationship(
        &self,
        owned: &OwnedCase,
        relationship_id: RelationshipId,
        status: ProjectionStatus,
    ) {
        if let Err(e) = self
            .store
            .set_relationship_projection_status(owned, relationship_id, status)
            .await
        {
            tracing::warn!(
                relationship_id = %relationship_id,
                error = %e,
                "Failed to record projection status"
            );
        }
    }
}
