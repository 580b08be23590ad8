//! Schema bootstrap for the Postgres adapters.
//!
//! Idempotent: safe to run at every startup.

use sqlx::PgPool;

use warden_core::{AccessError, AccessResult};

const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS policy_rules (
        subject TEXT NOT NULL,
        object  TEXT NOT NULL,
        action  TEXT NOT NULL,
        PRIMARY KEY (subject, object, action)
    )",
    "CREATE TABLE IF NOT EXISTS role_groupings (
        principal  TEXT NOT NULL,
        group_name TEXT NOT NULL,
        PRIMARY KEY (principal, group_name)
    )",
    "CREATE TABLE IF NOT EXISTS department_groupings (
        principal  TEXT NOT NULL,
        group_name TEXT NOT NULL,
        PRIMARY KEY (principal, group_name)
    )",
    "CREATE TABLE IF NOT EXISTS departments (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        parent_id   UUID,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL,
        deleted_at  TIMESTAMPTZ
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS departments_live_name
        ON departments (name) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS departments_parent
        ON departments (parent_id) WHERE deleted_at IS NULL",
];

/// Create the adapter tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> AccessResult<()> {
    for statement in DDL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AccessError::storage(format!("schema bootstrap failed: {e}")))?;
    }
    tracing::debug!("schema ensured");
    Ok(())
}
