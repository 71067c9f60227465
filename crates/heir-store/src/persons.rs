//! Person relational operations, always scoped to an owned case.

use chrono::Utc;

use heir_core::types::{NodeRef, Person, PersonCreate, PersonId, PersonUpdate, ProjectionStatus};

use crate::rows::{hydrate_all, PersonRow, PERSON_COLUMNS};
use crate::{OwnedCase, Store, StoreError};

impl Store {
    /// Insert a person with no graph reference and `pending` projection.
    pub async fn insert_person(
        &self,
        owned: &OwnedCase,
        data: &PersonCreate,
    ) -> Result<Person, StoreError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO persons (case_id, name, is_alive, birth_date, death_date, gender,
                                  is_decedent, is_spouse, projection_status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {PERSON_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(owned.id().0)
            .bind(&data.name)
            .bind(data.is_alive)
            .bind(data.birth_date)
            .bind(data.death_date)
            .bind(&data.gender)
            .bind(data.is_decedent)
            .bind(data.is_spouse)
            .bind(ProjectionStatus::Pending.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Person::try_from(row)
    }

    /// Look up a person by id, filtered by the owned case.
    pub async fn get_person(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
    ) -> Result<Person, StoreError> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ? AND case_id = ?");
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(person_id.0)
            .bind(owned.id().0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("person", person_id.0))?;
        Person::try_from(row)
    }

    pub async fn list_persons(&self, owned: &OwnedCase) -> Result<Vec<Person>, StoreError> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE case_id = ? ORDER BY id");
        let rows = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(owned.id().0)
            .fetch_all(&self.pool)
            .await?;
        hydrate_all(rows)
    }

    /// Persons that have no graph node yet (pending or failed projection).
    pub async fn list_unprojected_persons(
        &self,
        owned: &OwnedCase,
    ) -> Result<Vec<Person>, StoreError> {
        let sql = format!(
            "SELECT {PERSON_COLUMNS} FROM persons
             WHERE case_id = ? AND graph_node_ref IS NULL
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(owned.id().0)
            .fetch_all(&self.pool)
            .await?;
        hydrate_all(rows)
    }

    /// Apply only the present fields of `update` in one transaction.
    pub async fn update_person(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
        update: &PersonUpdate,
    ) -> Result<Person, StoreError> {
        let select = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ? AND case_id = ?");

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, PersonRow>(&select)
            .bind(person_id.0)
            .bind(owned.id().0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("person", person_id.0))?;

        let mut person = Person::try_from(row)?;
        update.apply_to(&mut person);
        person.updated_at = Utc::now();

        sqlx::query(
            "UPDATE persons SET name = ?, is_alive = ?, birth_date = ?, death_date = ?,
                                gender = ?, is_decedent = ?, is_spouse = ?, updated_at = ?
             WHERE id = ? AND case_id = ?",
        )
        .bind(&person.name)
        .bind(person.is_alive)
        .bind(person.birth_date)
        .bind(person.death_date)
        .bind(&person.gender)
        .bind(person.is_decedent)
        .bind(person.is_spouse)
        .bind(person.updated_at)
        .bind(person.id.0)
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(person)
    }

    /// Write back the graph node id and mark the person `projected`.
    pub async fn set_person_node_ref(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
        node_ref: &NodeRef,
    ) -> Result<Person, StoreError> {
        let sql = format!(
            "UPDATE persons SET graph_node_ref = ?, projection_status = ?, updated_at = ?
             WHERE id = ? AND case_id = ?
             RETURNING {PERSON_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(&node_ref.0)
            .bind(ProjectionStatus::Projected.as_str())
            .bind(Utc::now())
            .bind(person_id.0)
            .bind(owned.id().0)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("person", person_id.0))?;
        tx.commit().await?;

        Person::try_from(row)
    }

    pub async fn set_person_projection_status(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
        status: ProjectionStatus,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE persons SET projection_status = ? WHERE id = ? AND case_id = ?",
        )
        .bind(status.as_str())
        .bind(person_id.0)
        .bind(owned.id().0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("person", person_id.0));
        }
        Ok(())
    }

    /// Delete a person. Relationships referencing it cascade.
    pub async fn delete_person(
        &self,
        owned: &OwnedCase,
        person_id: PersonId,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM persons WHERE id = ? AND case_id = ?")
            .bind(person_id.0)
            .bind(owned.id().0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("person", person_id.0));
        }
        Ok(())
    }
}
