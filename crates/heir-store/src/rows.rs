//! Raw row shapes and their conversion into domain records.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use heir_core::types::{
    Case, CaseId, CaseStatus, EdgeRef, NodeRef, Person, PersonId, PersonRelationship,
    RelationshipId, UserId,
};

use crate::StoreError;

pub(crate) const CASE_COLUMNS: &str =
    "id, title, description, status, owner_id, graph_id, created_at, updated_at";

pub(crate) const PERSON_COLUMNS: &str = "id, case_id, name, is_alive, birth_date, death_date, \
     gender, is_decedent, is_spouse, graph_node_ref, projection_status, created_at, updated_at";

pub(crate) const RELATIONSHIP_COLUMNS: &str = "id, case_id, from_person_id, to_person_id, \
     relationship_type, is_biological, is_adopted, blood_type, graph_edge_ref, \
     projection_status, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CaseRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: String,
    owner_id: i64,
    graph_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct PersonRow {
    id: i64,
    case_id: i64,
    name: String,
    is_alive: bool,
    birth_date: Option<NaiveDate>,
    death_date: Option<NaiveDate>,
    gender: Option<String>,
    is_decedent: bool,
    is_spouse: bool,
    graph_node_ref: Option<String>,
    projection_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct RelationshipRow {
    id: i64,
    case_id: i64,
    from_person_id: i64,
    to_person_id: i64,
    relationship_type: String,
    is_biological: Option<bool>,
    is_adopted: Option<bool>,
    blood_type: Option<String>,
    graph_edge_ref: Option<String>,
    projection_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One `(kind, status, count)` tally from the projection status query.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProjectionCountRow {
    pub kind: String,
    pub projection_status: String,
    pub n: i64,
}

impl TryFrom<CaseRow> for Case {
    type Error = StoreError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let status: CaseStatus = row.status.parse().map_err(|source| StoreError::Corrupt {
            table: "cases",
            source,
        })?;
        Ok(Case {
            id: CaseId(row.id),
            title: row.title,
            description: row.description,
            status,
            owner_id: UserId(row.owner_id),
            graph_id: row.graph_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<PersonRow> for Person {
    type Error = StoreError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let projection_status =
            row.projection_status
                .parse()
                .map_err(|source| StoreError::Corrupt {
                    table: "persons",
                    source,
                })?;
        Ok(Person {
            id: PersonId(row.id),
            case_id: CaseId(row.case_id),
            name: row.name,
            is_alive: row.is_alive,
            birth_date: row.birth_date,
            death_date: row.death_date,
            gender: row.gender,
            is_decedent: row.is_decedent,
            is_spouse: row.is_spouse,
            graph_node_ref: row.graph_node_ref.map(NodeRef),
            projection_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<RelationshipRow> for PersonRelationship {
    type Error = StoreError;

    fn try_from(row: RelationshipRow) -> Result<Self, Self::Error> {
        let corrupt = |source| StoreError::Corrupt {
            table: "person_relationships",
            source,
        };
        let relationship_type = row.relationship_type.parse().map_err(corrupt)?;
        let blood_type = row
            .blood_type
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(corrupt)?;
        let projection_status = row.projection_status.parse().map_err(corrupt)?;
        Ok(PersonRelationship {
            id: RelationshipId(row.id),
            case_id: CaseId(row.case_id),
            from_person_id: PersonId(row.from_person_id),
            to_person_id: PersonId(row.to_person_id),
            relationship_type,
            is_biological: row.is_biological,
            is_adopted: row.is_adopted,
            blood_type,
            graph_edge_ref: row.graph_edge_ref.map(EdgeRef),
            projection_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
pub(crate) fn hydrate_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
