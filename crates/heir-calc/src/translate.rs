//! Relational records → engine input model.

use std::collections::HashMap;

use heir_core::types::{Person, PersonId, PersonRelationship, RelationshipType};

use crate::engine::{EnginePerson, EngineRelationship, EngineRelationshipType};
use crate::error::CalcError;

/// Everything the engine needs for one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInput {
    pub decedent: EnginePerson,
    pub persons: Vec<EnginePerson>,
    pub relationships: Vec<EngineRelationship>,
}

pub fn engine_person(person: &Person) -> EnginePerson {
    EnginePerson {
        id: person.id.0.to_string(),
        name: person.name.clone(),
        is_alive: person.is_alive,
        birth_date: person.birth_date,
        death_date: person.death_date,
        gender: person.gender.clone(),
    }
}

fn engine_relationship_type(rt: RelationshipType) -> EngineRelationshipType {
    match rt {
        RelationshipType::ChildOf => EngineRelationshipType::ChildOf,
        RelationshipType::SpouseOf => EngineRelationshipType::SpouseOf,
        RelationshipType::SiblingOf => EngineRelationshipType::SiblingOf,
    }
}

/// Validate a case's records and translate them.
///
/// Requires at least one person, exactly one decedent, and every
/// relationship endpoint to be among `persons`.
pub fn prepare(
    persons: &[Person],
    relationships: &[PersonRelationship],
) -> Result<EngineInput, CalcError> {
    if persons.is_empty() {
        return Err(CalcError::Validation(
            "No persons found in this case".to_string(),
        ));
    }

    let decedents: Vec<&Person> = persons.iter().filter(|p| p.is_decedent).collect();
    let decedent = match decedents.as_slice() {
        [] => {
            return Err(CalcError::Validation(
                "No decedent specified in this case".to_string(),
            ))
        }
        [one] => *one,
        many => {
            return Err(CalcError::Validation(format!(
                "Exactly one decedent is required, found {}",
                many.len()
            )))
        }
    };

    let by_id: HashMap<PersonId, EnginePerson> = persons
        .iter()
        .map(|p| (p.id, engine_person(p)))
        .collect();

    let mut engine_relationships = Vec::with_capacity(relationships.len());
    for rel in relationships {
        let endpoint = |id: PersonId| {
            by_id.get(&id).cloned().ok_or_else(|| {
                CalcError::Validation(format!(
                    "Relationship {} references person {} outside this case",
                    rel.id, id
                ))
            })
        };
        engine_relationships.push(EngineRelationship {
            from_person: endpoint(rel.from_person_id)?,
            to_person: endpoint(rel.to_person_id)?,
            relationship_type: engine_relationship_type(rel.relationship_type),
            is_biological: rel.is_biological,
            is_adopted: rel.is_adopted,
            blood_type: rel.blood_type.map(|b| b.as_str().to_string()),
        });
    }

    Ok(EngineInput {
        decedent: engine_person(decedent),
        persons: persons.iter().map(engine_person).collect(),
        relationships: engine_relationships,
    })
}
