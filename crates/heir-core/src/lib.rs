//! heir-core: Shared types, configuration, and error handling for inheritance cases.
//!
//! This crate provides the foundational types used across all heir components:
//! - Case, Person, and PersonRelationship records (the relational shape)
//! - Create and update payloads with explicit "unset" vs "clear" semantics
//! - Identifiers that correlate relational rows with graph-store elements
//! - Configuration management
//! - The error taxonomy shared by every request boundary

pub mod config;
pub mod error;
pub mod types;

pub use error::{ErrorKind, HeirError};
pub use types::{
    BloodType, Case, CaseCreate, CaseId, CaseStatus, CaseUpdate, EdgeRef, NodeRef, Person,
    PersonCreate, PersonId, PersonRelationship, PersonUpdate, ProjectionStatus,
    RelationshipCreate, RelationshipId, RelationshipType, RelationshipUpdate, UserId,
};
