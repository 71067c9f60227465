//! Projection reconciler.
//!
//! Inline mutation paths never retro-project. This is the explicit,
//! operator-invoked pass that converges a case's graph mirror onto its
//! relational record.

use std::collections::HashMap;

use serde::Serialize;

use heir_core::types::{NodeRef, PersonId, ProjectionStatus};
use heir_store::{OwnedCase, ProjectionCounts};

use crate::coordinator::Coordinator;
use crate::error::Result;

/// Outcome of one reconcile pass over a case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub persons_projected: usize,
    pub persons_failed: usize,
    pub relationships_projected: usize,
    pub relationships_failed: usize,
    /// Still missing a node on at least one endpoint.
    pub relationships_waiting: usize,
}

impl ReconcileReport {
    pub fn is_converged(&self) -> bool {
        self.persons_failed == 0 && self.relationships_failed == 0 && self.relationships_waiting == 0
    }
}

impl Coordinator {
    /// Project every unprojected person, then every relationship that has no
    /// edge or a stale one, provided both endpoints have nodes.
    ///
    /// Item failures are recorded as `failed` and counted; the pass carries
    /// on. Only relational read failures abort it.
    pub async fn reconcile_case(&self, owned: &OwnedCase) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for person in self.store.list_unprojected_persons(owned).await? {
            match self.project_person(owned, &person).await {
                Ok(_) => report.persons_projected += 1,
                Err(e) => {
                    tracing::warn!(person_id = %person.id, error = %e, "Person projection failed");
                    self.mark_person(owned, person.id, ProjectionStatus::Failed)
                        .await;
                    report.persons_failed += 1;
                }
            }
        }

        let node_refs: HashMap<PersonId, NodeRef> = self
            .store
            .list_persons(owned)
            .await?
            .into_iter()
            .filter_map(|p| p.graph_node_ref.map(|node_ref| (p.id, node_ref)))
            .collect();

        for rel in self.store.list_relationships_to_project(owned).await? {
            // A failed row that still holds a ref points at an outdated edge.
            if let Some(stale) = &rel.graph_edge_ref {
                if let Err(e) = self.graph.delete_relationship_edge(stale).await {
                    tracing::warn!(
                        relationship_id = %rel.id,
                        error = %e,
                        "Stale edge could not be removed"
                    );
                    report.relationships_failed += 1;
                    continue;
                }
            }

            let endpoints = (
                node_refs.get(&rel.from_person_id),
                node_refs.get(&rel.to_person_id),
            );
            let (Some(from_ref), Some(to_ref)) = endpoints else {
                if rel.graph_edge_ref.is_some() {
                    self.store
                        .clear_relationship_edge_ref(owned, rel.id, ProjectionStatus::Pending)
                        .await?;
                }
                report.relationships_waiting += 1;
                continue;
            };
            match self.project_relationship(owned, &rel, from_ref, to_ref).await {
                Ok(_) => report.relationships_projected += 1,
                Err(e) => {
                    tracing::warn!(
                        relationship_id = %rel.id,
                        error = %e,
                        "Relationship projection failed"
                    );
                    self.mark_relationship(owned, rel.id, ProjectionStatus::Failed)
                        .await;
                    report.relationships_failed += 1;
                }
            }
        }

        tracing::info!(
            case_id = %owned.id(),
            persons_projected = report.persons_projected,
            persons_failed = report.persons_failed,
            relationships_projected = report.relationships_projected,
            relationships_failed = report.relationships_failed,
            relationships_waiting = report.relationships_waiting,
            "Reconcile pass complete"
        );
        Ok(report)
    }

    pub async fn projection_status(&self, owned: &OwnedCase) -> Result<ProjectionCounts> {
        Ok(self.store.projection_counts(owned).await?)
    }

    /// Drop the case's whole subgraph and forget every reference to it, so
    /// the next reconcile pass rebuilds from the relational record.
    pub async fn clear_projection(&self, owned: &OwnedCase) -> Result<u64> {
        self.graph.clear_case_graph(owned.id()).await?;
        let reset = self.store.reset_case_projection(owned).await?;
        tracing::info!(case_id = %owned.id(), rows = reset, "Case projection cleared");
        Ok(reset)
    }
}
