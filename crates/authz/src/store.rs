//! Policy store: durable, reloadable storage of rules and grouping
//! relations with set semantics.
//!
//! The store keeps an indexed in-memory view behind an `RwLock` and talks to
//! a [`PolicyAdapter`] for durability. Mutations commit atomically from the
//! perspective of any concurrently-started enforcement call: the in-memory
//! state is reserved under the write lock, persistence happens outside the
//! lock, and a persistence failure rolls the reservation back.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use warden_core::{AccessError, AccessResult};

use crate::policy::PolicyRule;

/// The two independent grouping categories: a principal may simultaneously
/// hold roles and departments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingKind {
    Role,
    Department,
}

impl core::fmt::Display for GroupingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GroupingKind::Role => f.write_str("role"),
            GroupingKind::Department => f.write_str("department"),
        }
    }
}

/// Bulk representation of the policy set, exchanged with adapters on
/// `load`/`save`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub rules: Vec<PolicyRule>,
    pub role_groupings: Vec<(String, String)>,
    pub department_groupings: Vec<(String, String)>,
}

/// Durable backing for the policy store.
///
/// Row-level mutations exist so the store does not have to rewrite the full
/// policy set on every grant; `save` remains available for bulk sync.
/// Implementations must make inserts idempotent at the storage level
/// (unique-keyed rows), since two concurrent writers may both reach the
/// adapter before either observes the other.
#[async_trait]
pub trait PolicyAdapter: Send + Sync {
    async fn load(&self) -> AccessResult<PolicySnapshot>;
    async fn save(&self, snapshot: &PolicySnapshot) -> AccessResult<()>;
    async fn insert_rule(&self, rule: &PolicyRule) -> AccessResult<()>;
    async fn insert_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<()>;
    async fn remove_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<()>;
}

/// Indexed in-memory policy state.
///
/// Rules are indexed by subject and groupings by principal, maintained
/// incrementally on add/remove rather than recomputed by linear scan.
/// Per-key lists keep insertion order; set semantics are enforced on insert.
#[derive(Debug, Default)]
pub(crate) struct PolicyState {
    rules: HashMap<String, Vec<(String, String)>>,
    role_groups: HashMap<String, Vec<String>>,
    department_groups: HashMap<String, Vec<String>>,
}

impl PolicyState {
    pub(crate) fn insert_rule(&mut self, rule: &PolicyRule) -> bool {
        let entries = self.rules.entry(rule.subject.clone()).or_default();
        let pair = (rule.object.clone(), rule.action.clone());
        if entries.contains(&pair) {
            return false;
        }
        entries.push(pair);
        true
    }

    pub(crate) fn remove_rule(&mut self, rule: &PolicyRule) -> bool {
        let Some(entries) = self.rules.get_mut(&rule.subject) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(o, a)| o != &rule.object || a != &rule.action);
        if entries.is_empty() {
            self.rules.remove(&rule.subject);
            return before > 0;
        }
        before != entries.len()
    }

    fn groups_mut(&mut self, kind: GroupingKind) -> &mut HashMap<String, Vec<String>> {
        match kind {
            GroupingKind::Role => &mut self.role_groups,
            GroupingKind::Department => &mut self.department_groups,
        }
    }

    fn groups(&self, kind: GroupingKind) -> &HashMap<String, Vec<String>> {
        match kind {
            GroupingKind::Role => &self.role_groups,
            GroupingKind::Department => &self.department_groups,
        }
    }

    pub(crate) fn insert_grouping(
        &mut self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> bool {
        let entries = self.groups_mut(kind).entry(principal.to_string()).or_default();
        if entries.iter().any(|g| g == group) {
            return false;
        }
        entries.push(group.to_string());
        true
    }

    pub(crate) fn remove_grouping(
        &mut self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> bool {
        let groups = self.groups_mut(kind);
        let Some(entries) = groups.get_mut(principal) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|g| g != group);
        let removed = before != entries.len();
        if entries.is_empty() {
            groups.remove(principal);
        }
        removed
    }

    pub(crate) fn groups_of(&self, kind: GroupingKind, principal: &str) -> &[String] {
        self.groups(kind)
            .get(principal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn rules_of(&self, subject: &str) -> &[(String, String)] {
        self.rules
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn snapshot(&self) -> PolicySnapshot {
        let mut rules = Vec::new();
        for (subject, entries) in &self.rules {
            for (object, action) in entries {
                rules.push(PolicyRule {
                    subject: subject.clone(),
                    object: object.clone(),
                    action: action.clone(),
                });
            }
        }
        PolicySnapshot {
            rules,
            role_groupings: flatten_groups(&self.role_groups),
            department_groupings: flatten_groups(&self.department_groups),
        }
    }

    /// Rebuild from a persisted snapshot, skipping malformed records.
    ///
    /// A corrupt row must not block the rest of the policy set from loading.
    fn from_snapshot(snapshot: PolicySnapshot) -> Self {
        let mut state = Self::default();
        for rule in snapshot.rules {
            match PolicyRule::new(rule.subject, rule.object, rule.action) {
                Ok(rule) => {
                    state.insert_rule(&rule);
                }
                Err(e) => tracing::warn!(error = %e, "skipping malformed policy rule"),
            }
        }
        for (kind, pairs) in [
            (GroupingKind::Role, snapshot.role_groupings),
            (GroupingKind::Department, snapshot.department_groupings),
        ] {
            for (principal, group) in pairs {
                if principal.trim().is_empty() || group.trim().is_empty() {
                    tracing::warn!(%kind, "skipping malformed grouping record");
                    continue;
                }
                state.insert_grouping(kind, &principal, &group);
            }
        }
        state
    }
}

fn flatten_groups(groups: &HashMap<String, Vec<String>>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (principal, names) in groups {
        for name in names {
            pairs.push((principal.clone(), name.clone()));
        }
    }
    pairs
}

/// Durable, reloadable policy store shared across concurrent enforcement
/// and mutation calls.
pub struct PolicyStore {
    adapter: Arc<dyn PolicyAdapter>,
    state: RwLock<PolicyState>,
}

impl PolicyStore {
    pub fn new(adapter: Arc<dyn PolicyAdapter>) -> Self {
        Self {
            adapter,
            state: RwLock::new(PolicyState::default()),
        }
    }

    fn read(&self) -> AccessResult<RwLockReadGuard<'_, PolicyState>> {
        self.state
            .read()
            .map_err(|_| AccessError::storage("policy state lock poisoned"))
    }

    fn write(&self) -> AccessResult<RwLockWriteGuard<'_, PolicyState>> {
        self.state
            .write()
            .map_err(|_| AccessError::storage("policy state lock poisoned"))
    }

    /// Run a closure against a consistent read view of the policy state.
    ///
    /// Used by the engine so a single enforcement evaluates against one
    /// lock acquisition.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&PolicyState) -> R) -> AccessResult<R> {
        let state = self.read()?;
        Ok(f(&state))
    }

    /// Bulk-replace the in-memory state from durable storage.
    ///
    /// Must be called once at startup before any enforcement; malformed
    /// persisted records are skipped with a warning, never a hard failure.
    pub async fn load(&self) -> AccessResult<()> {
        let snapshot = self.adapter.load().await?;
        let fresh = PolicyState::from_snapshot(snapshot);
        *self.write()? = fresh;
        Ok(())
    }

    /// Bulk-sync the current state to durable storage.
    ///
    /// Snapshots under the read lock and persists outside it, so storage
    /// latency never blocks concurrent enforcement.
    pub async fn save(&self) -> AccessResult<()> {
        let snapshot = self.with_state(PolicyState::snapshot)?;
        self.adapter.save(&snapshot).await
    }

    /// Add a rule. Returns `false` (no error) if the identical triple
    /// already exists.
    pub async fn add_rule(
        &self,
        subject: &str,
        object: &str,
        action: &str,
    ) -> AccessResult<bool> {
        let rule = PolicyRule::new(subject, object, action)?;
        if !self.write()?.insert_rule(&rule) {
            return Ok(false);
        }
        if let Err(e) = self.adapter.insert_rule(&rule).await {
            self.write()?.remove_rule(&rule);
            return Err(e);
        }
        tracing::debug!(rule = %rule, "policy rule added");
        Ok(true)
    }

    /// Add a grouping pair. Returns `false` if the pair already exists.
    pub async fn add_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<bool> {
        validate_pair(kind, principal, group)?;
        if !self.write()?.insert_grouping(kind, principal, group) {
            return Ok(false);
        }
        if let Err(e) = self.adapter.insert_grouping(kind, principal, group).await {
            self.write()?.remove_grouping(kind, principal, group);
            return Err(e);
        }
        tracing::debug!(%kind, principal, group, "grouping added");
        Ok(true)
    }

    /// Remove a grouping pair. Returns `false` if the pair was not present.
    pub async fn remove_grouping(
        &self,
        kind: GroupingKind,
        principal: &str,
        group: &str,
    ) -> AccessResult<bool> {
        validate_pair(kind, principal, group)?;
        if !self.write()?.remove_grouping(kind, principal, group) {
            return Ok(false);
        }
        if let Err(e) = self.adapter.remove_grouping(kind, principal, group).await {
            self.write()?.insert_grouping(kind, principal, group);
            return Err(e);
        }
        tracing::debug!(%kind, principal, group, "grouping removed");
        Ok(true)
    }

    /// Role names currently granted to the principal, in grant order.
    pub fn roles_for(&self, principal: &str) -> AccessResult<Vec<String>> {
        self.with_state(|s| s.groups_of(GroupingKind::Role, principal).to_vec())
    }

    /// Department names currently granted to the principal, in grant order.
    pub fn departments_for(&self, principal: &str) -> AccessResult<Vec<String>> {
        self.with_state(|s| s.groups_of(GroupingKind::Department, principal).to_vec())
    }
}

fn validate_pair(kind: GroupingKind, principal: &str, group: &str) -> AccessResult<()> {
    if principal.trim().is_empty() {
        return Err(AccessError::validation("principal id must not be empty"));
    }
    if group.trim().is_empty() {
        return Err(AccessError::validation(format!(
            "{kind} name must not be empty"
        )));
    }
    Ok(())
}

/// Test-only adapter backed by a plain snapshot; mirrors what the real
/// in-memory adapter in the infra crate does.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub(crate) struct MemAdapter {
        pub(crate) snapshot: Mutex<PolicySnapshot>,
    }

    #[async_trait]
    impl PolicyAdapter for MemAdapter {
        async fn load(&self) -> AccessResult<PolicySnapshot> {
            Ok(self.snapshot.lock().unwrap().clone())
        }

        async fn save(&self, snapshot: &PolicySnapshot) -> AccessResult<()> {
            *self.snapshot.lock().unwrap() = snapshot.clone();
            Ok(())
        }

        async fn insert_rule(&self, rule: &PolicyRule) -> AccessResult<()> {
            self.snapshot.lock().unwrap().rules.push(rule.clone());
            Ok(())
        }

        async fn insert_grouping(
            &self,
            kind: GroupingKind,
            principal: &str,
            group: &str,
        ) -> AccessResult<()> {
            let mut snap = self.snapshot.lock().unwrap();
            let pairs = match kind {
                GroupingKind::Role => &mut snap.role_groupings,
                GroupingKind::Department => &mut snap.department_groupings,
            };
            pairs.push((principal.to_string(), group.to_string()));
            Ok(())
        }

        async fn remove_grouping(
            &self,
            kind: GroupingKind,
            principal: &str,
            group: &str,
        ) -> AccessResult<()> {
            let mut snap = self.snapshot.lock().unwrap();
            let pairs = match kind {
                GroupingKind::Role => &mut snap.role_groupings,
                GroupingKind::Department => &mut snap.department_groupings,
            };
            pairs.retain(|(p, g)| p != principal || g != group);
            Ok(())
        }
    }
}
