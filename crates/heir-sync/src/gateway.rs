//! Calculation Gateway.
//!
//! Loads a case's records from the relational store and hands them to the
//! pure translation/summary functions in `heir-calc`. The graph mirror is
//! never consulted.

use std::sync::Arc;

use heir_calc::{CalculationEngine, CalculationSummary};
use heir_core::types::{Person, PersonRelationship};
use heir_store::{OwnedCase, Store};

use crate::error::Result;

#[derive(Clone)]
pub struct CalculationGateway {
    store: Store,
    engine: Arc<dyn CalculationEngine>,
}

impl CalculationGateway {
    pub fn new(store: Store, engine: Arc<dyn CalculationEngine>) -> Self {
        Self { store, engine }
    }

    pub async fn prepare_and_calculate(&self, owned: &OwnedCase) -> Result<CalculationSummary> {
        let (persons, relationships) = self.load(owned).await?;
        let summary = heir_calc::calculate(self.engine.as_ref(), &persons, &relationships)?;
        tracing::info!(
            case_id = %owned.id(),
            heirs = summary.heirs.len(),
            "Inheritance calculated"
        );
        Ok(summary)
    }

    pub async fn render_tree(&self, owned: &OwnedCase) -> Result<String> {
        let (persons, relationships) = self.load(owned).await?;
        Ok(heir_calc::render_tree(
            self.engine.as_ref(),
            &persons,
            &relationships,
        )?)
    }

    async fn load(&self, owned: &OwnedCase) -> Result<(Vec<Person>, Vec<PersonRelationship>)> {
        let persons = self.store.list_persons(owned).await?;
        let relationships = self.store.list_relationships(owned).await?;
        Ok((persons, relationships))
    }
}
