//! heir-graph: Neo4j mirror of each case's family network.
//!
//! The graph store holds a derived, best-effort projection of the relational
//! record: one `Person` node per person and one typed edge per relationship.
//! Callers never talk to Neo4j directly; they go through the [`GraphMirror`]
//! trait, which [`GraphClient`] implements.

pub mod client;
pub mod mirror;
pub mod mutations;
pub mod projection;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use mirror::{FamilyTreeGraph, GraphMirror, MirrorEdge, MirrorNode, PersonNode, RelationshipEdge};
pub use projection::{PropertyChange, PropertyValue};
