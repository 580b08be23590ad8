//! Policy administration: the controlled write path into the engine's state.
//!
//! This layer validates caller-supplied identifiers and maps the store's
//! boolean idempotency contract onto explicit outcomes. It performs no
//! business validation beyond that — in particular, granting a role name
//! that no role entity defines is permitted and simply creates the
//! grouping pair.

use std::sync::Arc;

use serde::Serialize;

use warden_core::{AccessResult, PrincipalId};

use crate::store::{GroupingKind, PolicyStore};

/// Outcome of a grant operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantOutcome {
    /// A new grant was persisted.
    Created,
    /// The identical grant already existed; nothing changed.
    AlreadyExists,
}

/// Outcome of a revoke operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeOutcome {
    Removed,
    NotGranted,
}

/// Administration facade over the policy store.
pub struct PolicyAdmin {
    store: Arc<PolicyStore>,
}

impl PolicyAdmin {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self { store }
    }

    /// Add a policy rule `(subject, object, action)`.
    pub async fn add_rule(
        &self,
        subject: &str,
        object: &str,
        action: &str,
    ) -> AccessResult<GrantOutcome> {
        let applied = self.store.add_rule(subject, object, action).await?;
        Ok(grant_outcome(applied))
    }

    /// Grant a role to a principal.
    pub async fn assign_role(
        &self,
        principal: &PrincipalId,
        role: &str,
    ) -> AccessResult<GrantOutcome> {
        let applied = self
            .store
            .add_grouping(GroupingKind::Role, principal.as_str(), role)
            .await?;
        Ok(grant_outcome(applied))
    }

    /// Revoke a role from a principal.
    pub async fn revoke_role(
        &self,
        principal: &PrincipalId,
        role: &str,
    ) -> AccessResult<RevokeOutcome> {
        let removed = self
            .store
            .remove_grouping(GroupingKind::Role, principal.as_str(), role)
            .await?;
        Ok(revoke_outcome(removed))
    }

    /// Grant a department to a principal.
    ///
    /// Membership is flat: a member of a child department does not inherit
    /// the parent department's rules.
    pub async fn assign_department(
        &self,
        principal: &PrincipalId,
        department: &str,
    ) -> AccessResult<GrantOutcome> {
        let applied = self
            .store
            .add_grouping(GroupingKind::Department, principal.as_str(), department)
            .await?;
        Ok(grant_outcome(applied))
    }

    /// Revoke a department from a principal.
    pub async fn revoke_department(
        &self,
        principal: &PrincipalId,
        department: &str,
    ) -> AccessResult<RevokeOutcome> {
        let removed = self
            .store
            .remove_grouping(GroupingKind::Department, principal.as_str(), department)
            .await?;
        Ok(revoke_outcome(removed))
    }

    /// Role names granted to the principal, in grant order.
    pub fn roles_for(&self, principal: &PrincipalId) -> AccessResult<Vec<String>> {
        self.store.roles_for(principal.as_str())
    }

    /// Department names granted to the principal, in grant order.
    pub fn departments_for(&self, principal: &PrincipalId) -> AccessResult<Vec<String>> {
        self.store.departments_for(principal.as_str())
    }
}

fn grant_outcome(applied: bool) -> GrantOutcome {
    if applied {
        GrantOutcome::Created
    } else {
        GrantOutcome::AlreadyExists
    }
}

fn revoke_outcome(removed: bool) -> RevokeOutcome {
    if removed {
        RevokeOutcome::Removed
    } else {
        RevokeOutcome::NotGranted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemAdapter;
    use warden_core::AccessError;

    fn admin() -> PolicyAdmin {
        PolicyAdmin::new(Arc::new(PolicyStore::new(Arc::new(MemAdapter::default()))))
    }

    fn principal(id: &str) -> PrincipalId {
        PrincipalId::new(id).unwrap()
    }

    #[tokio::test]
    async fn grants_report_created_then_already_exists() {
        let admin = admin();
        let p = principal("42");

        assert_eq!(
            admin.assign_role(&p, "admin").await.unwrap(),
            GrantOutcome::Created
        );
        assert_eq!(
            admin.assign_role(&p, "admin").await.unwrap(),
            GrantOutcome::AlreadyExists
        );
        assert_eq!(admin.roles_for(&p).unwrap(), vec!["admin"]);
    }

    #[tokio::test]
    async fn revokes_report_whether_anything_was_granted() {
        let admin = admin();
        let p = principal("9");

        admin.assign_department(&p, "IT").await.unwrap();
        assert_eq!(
            admin.revoke_department(&p, "IT").await.unwrap(),
            RevokeOutcome::Removed
        );
        assert_eq!(
            admin.revoke_department(&p, "IT").await.unwrap(),
            RevokeOutcome::NotGranted
        );
    }

    #[tokio::test]
    async fn undefined_role_names_are_grantable() {
        // No role-existence check: assigning an undefined role simply
        // creates the grouping pair.
        let admin = admin();
        let p = principal("7");
        assert_eq!(
            admin.assign_role(&p, "never-defined").await.unwrap(),
            GrantOutcome::Created
        );
    }

    #[tokio::test]
    async fn empty_group_names_are_rejected() {
        let admin = admin();
        let p = principal("7");
        assert!(matches!(
            admin.assign_role(&p, "").await.unwrap_err(),
            AccessError::Validation(_)
        ));
    }
}
