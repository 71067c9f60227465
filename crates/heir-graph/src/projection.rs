//! Field → graph property mapping for partial updates.
//!
//! Only fields that are present in an update *and* carry a value are
//! propagated. Clearing a nullable field (`Some(None)`) updates the relational
//! row only; the graph keeps its previous value.

use chrono::NaiveDate;

use heir_core::types::{PersonUpdate, RelationshipUpdate};

/// A scalar graph property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
}

/// One property assignment on a node or edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    /// Always one of the static keys in the mapping tables below.
    pub key: &'static str,
    pub value: PropertyValue,
}

type PersonSetter = fn(&PersonUpdate) -> Option<PropertyValue>;
type RelationshipSetter = fn(&RelationshipUpdate) -> Option<PropertyValue>;

/// Dates are stored on the graph as ISO-8601 text.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

const PERSON_PROPERTY_MAP: &[(&str, PersonSetter)] = &[
    ("name", |u: &PersonUpdate| u.name.clone().map(PropertyValue::Text)),
    ("is_alive", |u: &PersonUpdate| u.is_alive.map(PropertyValue::Bool)),
    ("birth_date", |u: &PersonUpdate| {
        u.birth_date.flatten().map(|d| PropertyValue::Text(iso_date(d)))
    }),
    ("death_date", |u: &PersonUpdate| {
        u.death_date.flatten().map(|d| PropertyValue::Text(iso_date(d)))
    }),
    ("gender", |u: &PersonUpdate| u.gender.clone().flatten().map(PropertyValue::Text)),
    ("is_decedent", |u: &PersonUpdate| u.is_decedent.map(PropertyValue::Bool)),
    ("is_spouse", |u: &PersonUpdate| u.is_spouse.map(PropertyValue::Bool)),
];

const RELATIONSHIP_PROPERTY_MAP: &[(&str, RelationshipSetter)] = &[
    ("is_biological", |u: &RelationshipUpdate| u.is_biological.flatten().map(PropertyValue::Bool)),
    ("is_adopted", |u: &RelationshipUpdate| u.is_adopted.flatten().map(PropertyValue::Bool)),
    ("blood_type", |u: &RelationshipUpdate| {
        u.blood_type
            .flatten()
            .map(|b| PropertyValue::Text(b.as_str().to_string()))
    }),
];

/// Node property changes carried by a person update.
pub fn person_changes(update: &PersonUpdate) -> Vec<PropertyChange> {
    PERSON_PROPERTY_MAP
        .iter()
        .filter_map(|&(key, setter)| setter(update).map(|value| PropertyChange { key, value }))
        .collect()
}

/// Edge property changes carried by a relationship update.
///
/// A change of relationship type is not a property change; the edge has to
/// be replaced instead.
pub fn relationship_changes(update: &RelationshipUpdate) -> Vec<PropertyChange> {
    RELATIONSHIP_PROPERTY_MAP
        .iter()
        .filter_map(|&(key, setter)| setter(update).map(|value| PropertyChange { key, value }))
        .collect()
}
