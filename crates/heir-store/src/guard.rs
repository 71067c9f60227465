//! Identity & ownership guard.
//!
//! Resolves a case only when it is owned by the caller and hands back an
//! [`OwnedCase`] capability. Every child-record operation in this crate takes
//! `&OwnedCase`, so nothing can reach a person or relationship without first
//! passing through here.

use heir_core::types::{Case, CaseId, UserId};

use crate::rows::{CaseRow, CASE_COLUMNS};
use crate::{Store, StoreError};

/// Proof that the caller owns this case. Only the guard can construct one.
#[derive(Debug, Clone)]
pub struct OwnedCase {
    case: Case,
}

impl OwnedCase {
    pub fn id(&self) -> CaseId {
        self.case.id
    }

    pub fn owner(&self) -> UserId {
        self.case.owner_id
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn into_case(self) -> Case {
        self.case
    }

    pub(crate) fn refreshed(case: Case) -> Self {
        Self { case }
    }
}

impl Store {
    /// Resolve `case_id` for `caller`.
    ///
    /// A case owned by another user is reported exactly like a missing one.
    pub async fn resolve_owned_case(
        &self,
        case_id: CaseId,
        caller: UserId,
    ) -> Result<OwnedCase, StoreError> {
        let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ? AND owner_id = ?");
        let row = sqlx::query_as::<_, CaseRow>(&sql)
            .bind(case_id.0)
            .bind(caller.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(OwnedCase {
                case: Case::try_from(row)?,
            }),
            None => {
                tracing::debug!(case_id = %case_id, caller = %caller, "Case not resolved for caller");
                Err(StoreError::not_found("case", case_id.0))
            }
        }
    }
}
