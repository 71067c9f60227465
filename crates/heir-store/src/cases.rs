//! Case-level relational operations.

use chrono::Utc;

use heir_core::types::{Case, CaseCreate, CaseUpdate, UserId};

use crate::rows::{hydrate_all, CaseRow, CASE_COLUMNS};
use crate::{OwnedCase, Store, StoreError};

impl Store {
    /// Insert a new case owned by `owner`.
    pub async fn insert_case(&self, owner: UserId, data: &CaseCreate) -> Result<Case, StoreError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO cases (title, description, status, owner_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {CASE_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, CaseRow>(&sql)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.status.as_str())
            .bind(owner.0)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Case::try_from(row)
    }

    /// All cases owned by `owner`, most recently updated first.
    pub async fn list_cases(&self, owner: UserId) -> Result<Vec<Case>, StoreError> {
        let sql = format!(
            "SELECT {CASE_COLUMNS} FROM cases
             WHERE owner_id = ?
             ORDER BY updated_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CaseRow>(&sql)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;
        hydrate_all(rows)
    }

    /// Apply the present fields of `update` to the current row and return
    /// the refreshed handle.
    ///
    /// The row is re-read inside the transaction, so fields absent from
    /// `update` keep whatever was last committed, not the handle's snapshot.
    pub async fn update_case(
        &self,
        owned: &OwnedCase,
        update: &CaseUpdate,
    ) -> Result<OwnedCase, StoreError> {
        let select = format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ? AND owner_id = ?");

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, CaseRow>(&select)
            .bind(owned.id().0)
            .bind(owned.owner().0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("case", owned.id().0))?;

        let mut case = Case::try_from(row)?;
        update.apply_to(&mut case);
        case.updated_at = Utc::now();

        sqlx::query(
            "UPDATE cases SET title = ?, description = ?, status = ?, updated_at = ?
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&case.title)
        .bind(&case.description)
        .bind(case.status.as_str())
        .bind(case.updated_at)
        .bind(case.id.0)
        .bind(case.owner_id.0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(OwnedCase::refreshed(case))
    }

    /// Delete the case row. Persons and relationships go with it through the
    /// foreign-key cascade.
    pub async fn delete_case(&self, owned: OwnedCase) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM cases WHERE id = ? AND owner_id = ?")
            .bind(owned.id().0)
            .bind(owned.owner().0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("case", owned.id().0));
        }
        Ok(())
    }
}
