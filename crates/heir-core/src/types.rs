//! Core domain types for inheritance cases.
//!
//! These types mirror the relational record, which is the authoritative
//! owner of every entity. Graph-store identifiers appear here only as
//! opaque correlation references.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Identifiers ───────────────────────────────────────────────────

/// The authenticated caller. Issued by the session layer, never by this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(pub i64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub i64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a Person node in the graph mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeRef(pub String);

/// Store-assigned identifier of a relationship edge in the graph mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EdgeRef(pub String);

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Enums ─────────────────────────────────────────────────────────

/// Returned when a stored token does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Archived,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for CaseStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseEnumError::new("case status", s)),
        }
    }
}

/// Directed family relationship: `from` is the child / spouse / sibling of `to`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    ChildOf,
    SpouseOf,
    SiblingOf,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChildOf => "child_of",
            Self::SpouseOf => "spouse_of",
            Self::SiblingOf => "sibling_of",
        }
    }

    /// Graph edge type: the upper-cased relationship token.
    pub fn graph_label(&self) -> &'static str {
        match self {
            Self::ChildOf => "CHILD_OF",
            Self::SpouseOf => "SPOUSE_OF",
            Self::SiblingOf => "SIBLING_OF",
        }
    }
}

impl FromStr for RelationshipType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "child_of" => Ok(Self::ChildOf),
            "spouse_of" => Ok(Self::SpouseOf),
            "sibling_of" => Ok(Self::SiblingOf),
            _ => Err(ParseEnumError::new("relationship type", s)),
        }
    }
}

/// Full or half blood; only meaningful for `sibling_of`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BloodType {
    Full,
    Half,
}

impl BloodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
        }
    }
}

impl FromStr for BloodType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "half" => Ok(Self::Half),
            _ => Err(ParseEnumError::new("blood type", s)),
        }
    }
}

/// Whether a relational row has been reflected into the graph mirror.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    #[default]
    Pending,
    Projected,
    Failed,
}

impl ProjectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Projected => "projected",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for ProjectionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "projected" => Ok(Self::Projected),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseEnumError::new("projection status", s)),
        }
    }
}

// ── Records ───────────────────────────────────────────────────────

/// A single inheritance-calculation workspace owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub id: CaseId,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub owner_id: UserId,
    /// Reserved graph-store case marker; not used for correlation.
    pub graph_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member of the decedent's family network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub case_id: CaseId,
    pub name: String,
    pub is_alive: bool,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub is_decedent: bool,
    pub is_spouse: bool,
    /// Null until the graph node has been created and written back.
    pub graph_node_ref: Option<NodeRef>,
    pub projection_status: ProjectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A directed relationship between two persons of the same case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonRelationship {
    pub id: RelationshipId,
    pub case_id: CaseId,
    pub from_person_id: PersonId,
    pub to_person_id: PersonId,
    pub relationship_type: RelationshipType,
    pub is_biological: Option<bool>,
    pub is_adopted: Option<bool>,
    pub blood_type: Option<BloodType>,
    pub graph_edge_ref: Option<EdgeRef>,
    pub projection_status: ProjectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Payloads ──────────────────────────────────────────────────────
//
// Update payloads use `Option<Option<T>>` for nullable columns:
// `None` leaves the column untouched, `Some(None)` clears it.

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: CaseStatus,
}

impl CaseCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: CaseStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
}

impl CaseUpdate {
    pub fn apply_to(&self, case: &mut Case) {
        if let Some(title) = &self.title {
            case.title = title.clone();
        }
        if let Some(description) = &self.description {
            case.description = description.clone();
        }
        if let Some(status) = self.status {
            case.status = status;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonCreate {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_alive: bool,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub is_decedent: bool,
    #[serde(default)]
    pub is_spouse: bool,
}

fn default_true() -> bool {
    true
}

impl PersonCreate {
    /// A living, non-decedent person with no optional attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_alive: true,
            birth_date: None,
            death_date: None,
            gender: None,
            is_decedent: false,
            is_spouse: false,
        }
    }

    /// Mark this person as the decedent (deceased, estate being divided).
    pub fn decedent(mut self, death_date: Option<NaiveDate>) -> Self {
        self.is_decedent = true;
        self.is_alive = false;
        self.death_date = death_date;
        self
    }

    pub fn spouse(mut self) -> Self {
        self.is_spouse = true;
        self
    }
}

/// Partial update of a Person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alive: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub death_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_decedent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_spouse: Option<bool>,
}

impl PersonUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every present field to `person`.
    pub fn apply_to(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(is_alive) = self.is_alive {
            person.is_alive = is_alive;
        }
        if let Some(birth_date) = self.birth_date {
            person.birth_date = birth_date;
        }
        if let Some(death_date) = self.death_date {
            person.death_date = death_date;
        }
        if let Some(gender) = &self.gender {
            person.gender = gender.clone();
        }
        if let Some(is_decedent) = self.is_decedent {
            person.is_decedent = is_decedent;
        }
        if let Some(is_spouse) = self.is_spouse {
            person.is_spouse = is_spouse;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCreate {
    pub from_person_id: PersonId,
    pub to_person_id: PersonId,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub is_biological: Option<bool>,
    #[serde(default)]
    pub is_adopted: Option<bool>,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
}

impl RelationshipCreate {
    pub fn new(from: PersonId, to: PersonId, relationship_type: RelationshipType) -> Self {
        Self {
            from_person_id: from,
            to_person_id: to,
            relationship_type,
            is_biological: None,
            is_adopted: None,
            blood_type: None,
        }
    }
}

/// Partial update of a PersonRelationship. Endpoints are immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_biological: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_adopted: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub blood_type: Option<Option<BloodType>>,
}

impl RelationshipUpdate {
    pub fn apply_to(&self, rel: &mut PersonRelationship) {
        if let Some(relationship_type) = self.relationship_type {
            rel.relationship_type = relationship_type;
        }
        if let Some(is_biological) = self.is_biological {
            rel.is_biological = is_biological;
        }
        if let Some(is_adopted) = self.is_adopted {
            rel.is_adopted = is_adopted;
        }
        if let Some(blood_type) = self.blood_type {
            rel.blood_type = blood_type;
        }
    }
}
