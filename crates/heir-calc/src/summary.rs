//! Engine result → client-facing summary.

use serde::Serialize;

use crate::engine::InheritanceResult;
use crate::error::CalcError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecedentSummary {
    pub id: String,
    pub name: String,
}

/// One heir with the share as an exact fraction plus derived decimal views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeirSummary {
    pub id: String,
    pub name: String,
    pub relationship: String,
    pub rank: u32,
    pub share_numerator: u64,
    pub share_denominator: u64,
    pub share_decimal: f64,
    pub share_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationSummary {
    pub decedent: DecedentSummary,
    pub heirs: Vec<HeirSummary>,
    pub has_spouse: bool,
    pub has_children: bool,
    pub calculation_basis: Vec<String>,
}

/// Reshape an engine result, keeping the engine's heir order.
pub fn summarize(result: &InheritanceResult) -> Result<CalculationSummary, CalcError> {
    let mut heirs = Vec::with_capacity(result.heirs.len());
    for heir in &result.heirs {
        if heir.share.denominator == 0 {
            return Err(CalcError::InvalidShare {
                heir_id: heir.person.id.clone(),
                numerator: heir.share.numerator,
                denominator: heir.share.denominator,
            });
        }
        heirs.push(HeirSummary {
            id: heir.person.id.clone(),
            name: heir.person.name.clone(),
            relationship: heir.relationship.clone(),
            rank: heir.rank,
            share_numerator: heir.share.numerator,
            share_denominator: heir.share.denominator,
            share_decimal: heir.share.decimal(),
            share_percentage: heir.share.percentage(),
        });
    }

    Ok(CalculationSummary {
        decedent: DecedentSummary {
            id: result.decedent.id.clone(),
            name: result.decedent.name.clone(),
        },
        heirs,
        has_spouse: result.has_spouse,
        has_children: result.has_children,
        calculation_basis: result.calculation_basis.clone(),
    })
}
