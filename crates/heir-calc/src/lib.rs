//! heir-calc: Calculation Gateway between case records and the external
//! inheritance Calculation Engine.
//!
//! Everything in this crate is a pure function of its inputs. Loading the
//! records is the caller's job; this crate validates them, translates them
//! into the engine's model, invokes the engine, and reshapes the result.

pub mod engine;
pub mod error;
pub mod summary;
pub mod translate;

pub use engine::{
    CalculationEngine, EnginePerson, EngineRelationship, EngineRelationshipType, Heir,
    InheritanceResult, Share,
};
pub use error::{CalcError, EngineError};
pub use summary::{CalculationSummary, DecedentSummary, HeirSummary};
pub use translate::EngineInput;

use heir_core::types::{Person, PersonRelationship};

/// Validate, translate, and run the engine over one case's records.
pub fn run_engine(
    engine: &dyn CalculationEngine,
    persons: &[Person],
    relationships: &[PersonRelationship],
) -> Result<InheritanceResult, CalcError> {
    let input = translate::prepare(persons, relationships)?;
    let result = engine.calculate(&input.decedent, &input.persons, &input.relationships)?;
    tracing::debug!(
        decedent = %input.decedent.id,
        heirs = result.heirs.len(),
        "Calculation engine returned"
    );
    Ok(result)
}

/// Calculate and reshape into the client-facing summary.
pub fn calculate(
    engine: &dyn CalculationEngine,
    persons: &[Person],
    relationships: &[PersonRelationship],
) -> Result<CalculationSummary, CalcError> {
    let result = run_engine(engine, persons, relationships)?;
    summary::summarize(&result)
}

/// Calculate and render the engine's textual family tree.
pub fn render_tree(
    engine: &dyn CalculationEngine,
    persons: &[Person],
    relationships: &[PersonRelationship],
) -> Result<String, CalcError> {
    let result = run_engine(engine, persons, relationships)?;
    Ok(engine.render_tree(&result)?)
}
