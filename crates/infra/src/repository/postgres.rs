//! Postgres-backed department repository.
//!
//! Soft deletion is a `deleted_at` stamp; every query filters
//! `deleted_at IS NULL`, so deleted rows are invisible through the
//! repository seam. Name uniqueness among live rows is enforced by a
//! partial unique index as a second line of defense behind the service
//! layer's check.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use warden_core::{AccessError, AccessResult, DepartmentId};
use warden_directory::{Department, DepartmentRepository};

#[derive(Debug, Clone)]
pub struct PostgresDepartmentRepository {
    pool: Arc<PgPool>,
}

impl PostgresDepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn department_from_row(row: &PgRow) -> Result<Department, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let parent_id: Option<Uuid> = row.try_get("parent_id")?;
    Ok(Department {
        id: DepartmentId::from_uuid(id),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        parent_id: parent_id.map(DepartmentId::from_uuid),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

const COLUMNS: &str = "id, name, description, parent_id, created_at, updated_at, deleted_at";

#[async_trait]
impl DepartmentRepository for PostgresDepartmentRepository {
    #[instrument(skip(self), fields(id = %id), err)]
    async fn find(&self, id: DepartmentId) -> AccessResult<Option<Department>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM departments WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(storage_err)?;

        row.as_ref()
            .map(department_from_row)
            .transpose()
            .map_err(storage_err)
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> AccessResult<Option<Department>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM departments WHERE name = $1 AND deleted_at IS NULL"
        ))
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(storage_err)?;

        row.as_ref()
            .map(department_from_row)
            .transpose()
            .map_err(storage_err)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> AccessResult<Vec<Department>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM departments WHERE deleted_at IS NULL ORDER BY created_at"
        ))
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(storage_err)?;

        rows.iter()
            .map(department_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage_err)
    }

    #[instrument(skip(self, department), fields(id = %department.id), err)]
    async fn insert(&self, department: &Department) -> AccessResult<()> {
        sqlx::query(
            "INSERT INTO departments (id, name, description, parent_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(department.id.as_uuid())
        .bind(&department.name)
        .bind(&department.description)
        .bind(department.parent_id.map(|p| *p.as_uuid()))
        .bind(department.created_at)
        .bind(department.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_unique_violation(e, &department.name))?;
        Ok(())
    }

    #[instrument(skip(self, department), fields(id = %department.id), err)]
    async fn update(&self, department: &Department) -> AccessResult<()> {
        let result = sqlx::query(
            "UPDATE departments
             SET name = $2, description = $3, parent_id = $4, updated_at = $5
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(department.id.as_uuid())
        .bind(&department.name)
        .bind(&department.description)
        .bind(department.parent_id.map(|p| *p.as_uuid()))
        .bind(department.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_unique_violation(e, &department.name))?;

        if result.rows_affected() == 0 {
            return Err(AccessError::not_found(format!(
                "department {} does not exist",
                department.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn soft_delete(&self, id: DepartmentId) -> AccessResult<()> {
        let result = sqlx::query(
            "UPDATE departments SET deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .execute(self.pool.as_ref())
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(AccessError::not_found(format!(
                "department {id} does not exist"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn child_count(&self, id: DepartmentId) -> AccessResult<u64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS children FROM departments
             WHERE parent_id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(storage_err)?;

        let children: i64 = row.try_get("children").map_err(storage_err)?;
        Ok(children as u64)
    }
}

fn storage_err(e: sqlx::Error) -> AccessError {
    AccessError::storage(e.to_string())
}

/// Unique-index violations surface as conflicts, everything else as
/// storage failures.
fn map_unique_violation(e: sqlx::Error, name: &str) -> AccessError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return AccessError::conflict(format!("department '{name}' already exists"));
        }
    }
    storage_err(e)
}
