//! The Calculation Engine contract.
//!
//! The legal share computation and the tree rendering live outside this
//! repository. They are consumed through [`CalculationEngine`], whose input
//! and output model is defined here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A person as the engine sees it. Identifiers are strings in engine space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnginePerson {
    pub id: String,
    pub name: String,
    pub is_alive: bool,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineRelationshipType {
    ChildOf,
    SpouseOf,
    SiblingOf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRelationship {
    pub from_person: EnginePerson,
    pub to_person: EnginePerson,
    pub relationship_type: EngineRelationshipType,
    pub is_biological: Option<bool>,
    pub is_adopted: Option<bool>,
    pub blood_type: Option<String>,
}

/// An exact fractional share of the estate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub numerator: u64,
    pub denominator: u64,
}

impl Share {
    /// A share in lowest terms. `None` if the denominator is zero.
    pub fn new(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let g = gcd(numerator, denominator);
        Some(Self {
            numerator: numerator / g,
            denominator: denominator / g,
        })
    }

    pub fn decimal(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn percentage(&self) -> f64 {
        self.decimal() * 100.0
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// One heir in the engine's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heir {
    pub person: EnginePerson,
    /// Human-readable relationship to the decedent (engine-defined label).
    pub relationship: String,
    /// Inheritance priority rank (engine-defined; lower inherits first).
    pub rank: u32,
    pub share: Share,
}

/// The engine's answer for one decedent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceResult {
    pub decedent: EnginePerson,
    pub heirs: Vec<Heir>,
    pub has_spouse: bool,
    pub has_children: bool,
    pub calculation_basis: Vec<String>,
}

/// The external share-computation algorithm and its tree renderer.
///
/// Both operations are pure functions of their inputs.
pub trait CalculationEngine: Send + Sync {
    fn calculate(
        &self,
        decedent: &EnginePerson,
        persons: &[EnginePerson],
        relationships: &[EngineRelationship],
    ) -> Result<InheritanceResult, EngineError>;

    /// Render the result as a textual family tree.
    fn render_tree(&self, result: &InheritanceResult) -> Result<String, EngineError>;
}
