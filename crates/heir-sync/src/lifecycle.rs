//! Case Lifecycle Manager.

use serde::Serialize;

use heir_core::types::{Case, CaseCreate, CaseUpdate, Person, PersonRelationship, UserId};
use heir_store::OwnedCase;

use crate::coordinator::Coordinator;
use crate::error::Result;

/// A case with every person and relationship it holds.
#[derive(Debug, Clone, Serialize)]
pub struct CaseDetails {
    pub case: Case,
    pub persons: Vec<Person>,
    pub relationships: Vec<PersonRelationship>,
}

impl Coordinator {
    /// Create a case. The graph is not touched until the first person.
    pub async fn create_case(&self, caller: UserId, data: &CaseCreate) -> Result<Case> {
        let case = self.store.insert_case(caller, data).await?;
        tracing::info!(case_id = %case.id, owner = %caller, "Case created");
        Ok(case)
    }

    pub async fn list_cases(&self, caller: UserId) -> Result<Vec<Case>> {
        Ok(self.store.list_cases(caller).await?)
    }

    pub async fn get_case_details(&self, owned: &OwnedCase) -> Result<CaseDetails> {
        let persons = self.store.list_persons(owned).await?;
        let relationships = self.store.list_relationships(owned).await?;
        Ok(CaseDetails {
            case: owned.case().clone(),
            persons,
            relationships,
        })
    }

    /// Relational only; case fields are not mirrored.
    pub async fn update_case(&self, owned: &OwnedCase, update: &CaseUpdate) -> Result<Case> {
        let refreshed = self.store.update_case(owned, update).await?;
        tracing::info!(case_id = %owned.id(), "Case updated");
        Ok(refreshed.into_case())
    }

    /// Clear the case's subgraph in one bulk call, then delete the case row.
    ///
    /// If the graph clear fails the relational delete does not happen.
    pub async fn delete_case(&self, owned: OwnedCase) -> Result<()> {
        let case_id = owned.id();

        if let Err(e) = self.graph.clear_case_graph(case_id).await {
            tracing::warn!(case_id = %case_id, error = %e, "Graph clear failed; case kept");
            return Err(e.into());
        }
        self.store.delete_case(owned).await?;

        tracing::info!(case_id = %case_id, "Case deleted");
        Ok(())
    }
}
