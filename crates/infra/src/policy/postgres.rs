//! Postgres-backed policy adapter.
//!
//! Rules and grouping relations live in unique-keyed tables
//! (`policy_rules`, `role_groupings`, `department_groupings`), so row
//! inserts are idempotent at the database level (`ON CONFLICT DO NOTHING`)
//! even when two writers race past the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use warden_authz::{GroupingKind, PolicyAdapter, PolicyRule, PolicySnapshot};
use warden_core::{AccessError, AccessResult};

#[derive(Debug, Clone)]
pub struct PostgresPolicyAdapter {
    pool: Arc<PgPool>,
}

impl PostgresPolicyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn load_groupings(&self, kind: GroupingKind) -> AccessResult<Vec<(String, String)>> {
        let query = match kind {
            GroupingKind::Role => "SELECT principal, group_name FROM role_groupings",
            GroupingKind::Department => "SELECT principal, group_name FROM department_groupings",
        };
        let rows = sqlx::query(query)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(storage_err)?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            pairs.push((
                row.try_get("principal").map_err(storage_err)?,
                row.try_get("group_name").map_err(storage_err)?,
            ));
        }
        Ok(pairs)
    }

    fn grouping_table(kind: GroupingKind) -> &'static str {
        match kind {
            GroupingKind::Role => "role_groupings",
            GroupingKind::Department => "department_groupings",
        }
    }
}

#[async_trait]
impl PolicyAdapter for PostgresPolicyAdapter {
    #[instrument(skip(self), err)]
    async fn load(&self) -> AccessResult<PolicySnapshot> {
        let rows = sqlx::query("SELECT subject, object, action FROM policy_rules")
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(storage_err)?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            rules.push(PolicyRule {
                subject: row.try_get("subject").map_err(storage_err)?,
                object: row.try_get("object").map_err(storage_err)?,
                action: row.try_get("action").map_err(storage_err)?,
            });
        }

        Ok(PolicySnapshot {
            rules,
            role_groupings: self.load_groupings(GroupingKind::Role).await?,
            department_groupings: self.load_groupings(GroupingKind::Department).await?,
        })
    }

    #[instrument(skip(self, snapshot), err)]
    async fn save(&self, snapshot: &PolicySnapshot) -> AccessResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        for table in ["policy_rules", "role_groupings", "department_groupings"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        for rule in &snapshot.rules {
            sqlx::query(
                "INSERT INTO policy_rules (subject, object, action) VALUES ($1, $2, $3)",
            )
            .bind(&rule.subject)
            .bind(&rule.object)
            .bind(&rule.action)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        for (kind, pairs) in [
            (GroupingKind::Role, &snapshot.role_groupings),
            (GroupingKind::Department, &snapshot.department_groupings),
        ] {
            let table = Self::grouping_table(kind);
            for (principal, group) in pairs {
                sqlx::query(&format!(
                    "INSERT INTO {table} (principal, group_name) VALUES ($1, $2)"
                ))
                .bind(principal)
                .bind(group)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
            }
        }

        tx.commit().await.map_err(storage_err)
    }

    #[instrument(skip(self), fields(rule = %rule), err)]
    async fn insert_rule(&self, rule: &PolicyRule) -> AccessResult<()> {
        sqlx::query(
            "INSERT INTO policy_rules (subject, object, action) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(&rule.subject)
        .bind(&rule.object)
        .bind(&rule.action)
        .execute(self.pool.as_ref())
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn insert_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<()> {
        let table = Self::grouping_table(kind);
        sqlx::query(&format!(
            "INSERT INTO {table} (principal, group_name) VALUES ($1, $2)
             ON CONFLICT DO NOTHING"
        ))
        .bind(principal)
        .bind(group)
        .execute(self.pool.as_ref())
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn remove_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<()> {
        let table = Self::grouping_table(kind);
        sqlx::query(&format!(
            "DELETE FROM {table} WHERE principal = $1 AND group_name = $2"
        ))
        .bind(principal)
        .bind(group)
        .execute(self.pool.as_ref())
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> AccessError {
    AccessError::storage(e.to_string())
}
