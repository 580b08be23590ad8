//! In-memory policy adapter.
//!
//! Intended for tests/dev. Nothing survives process restart.

use std::sync::RwLock;

use async_trait::async_trait;

use warden_authz::{GroupingKind, PolicyAdapter, PolicyRule, PolicySnapshot};
use warden_core::{AccessError, AccessResult};

#[derive(Debug, Default)]
pub struct InMemoryPolicyAdapter {
    snapshot: RwLock<PolicySnapshot>,
}

impl InMemoryPolicyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AccessResult<std::sync::RwLockReadGuard<'_, PolicySnapshot>> {
        self.snapshot
            .read()
            .map_err(|_| AccessError::storage("in-memory policy lock poisoned"))
    }

    fn write(&self) -> AccessResult<std::sync::RwLockWriteGuard<'_, PolicySnapshot>> {
        self.snapshot
            .write()
            .map_err(|_| AccessError::storage("in-memory policy lock poisoned"))
    }
}

#[async_trait]
impl PolicyAdapter for InMemoryPolicyAdapter {
    async fn load(&self) -> AccessResult<PolicySnapshot> {
        Ok(self.read()?.clone())
    }

    async fn save(&self, snapshot: &PolicySnapshot) -> AccessResult<()> {
        *self.write()? = snapshot.clone();
        Ok(())
    }

    async fn insert_rule(&self, rule: &PolicyRule) -> AccessResult<()> {
        let mut snap = self.write()?;
        if !snap.rules.contains(rule) {
            snap.rules.push(rule.clone());
        }
        Ok(())
    }

    async fn insert_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<()> {
        let mut snap = self.write()?;
        let pairs = match kind {
            GroupingKind::Role => &mut snap.role_groupings,
            GroupingKind::Department => &mut snap.department_groupings,
        };
        let pair = (principal.to_string(), group.to_string());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
        Ok(())
    }

    async fn remove_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<()> {
        let mut snap = self.write()?;
        let pairs = match kind {
            GroupingKind::Role => &mut snap.role_groupings,
            GroupingKind::Department => &mut snap.department_groupings,
        };
        pairs.retain(|(p, g)| p != principal || g != group);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warden_authz::{AuthorizationEngine, PolicyStore};

    use super::*;

    #[tokio::test]
    async fn adapter_backs_a_full_store_round_trip() {
        let adapter = Arc::new(InMemoryPolicyAdapter::new());
        let store = Arc::new(PolicyStore::new(adapter.clone()));
        store.load().await.unwrap();

        store.add_rule("admin", "/users/*", "*").await.unwrap();
        store
            .add_grouping(GroupingKind::Role, "42", "admin")
            .await
            .unwrap();

        // A second store over the same adapter sees the persisted rows.
        let reloaded = Arc::new(PolicyStore::new(adapter));
        reloaded.load().await.unwrap();
        let engine = AuthorizationEngine::new(reloaded);
        assert!(engine.enforce("42", "/users/*", "DELETE").unwrap());
        assert!(!engine.enforce("42", "/orders", "GET").unwrap());
    }

    #[tokio::test]
    async fn row_inserts_are_idempotent_at_the_adapter_level() {
        let adapter = InMemoryPolicyAdapter::new();
        let rule = PolicyRule::new("r", "/a", "GET").unwrap();
        adapter.insert_rule(&rule).await.unwrap();
        adapter.insert_rule(&rule).await.unwrap();
        assert_eq!(adapter.load().await.unwrap().rules.len(), 1);
    }
}
