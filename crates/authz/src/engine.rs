//! Enforcement: the decision procedure answering whether a principal may
//! perform an action on an object.

use std::sync::Arc;

use serde::Serialize;

use warden_core::AccessResult;

use crate::policy::{field_matches, Subject, SUPER_ADMIN};
use crate::store::{GroupingKind, PolicyState, PolicyStore};

/// What granted an allow decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum Grant {
    /// The reserved superuser identity bypassed rule evaluation.
    Superuser,
    /// A rule for one of the principal's roles matched.
    Role { name: String },
    /// A rule for one of the principal's departments matched.
    Department { name: String },
    /// The exact `(subject, object, action)` triple is a stored rule.
    Direct,
}

/// An enforcement decision with its audit trail.
///
/// `enforce` collapses this to a boolean; `explain` exposes it for
/// "why was this request allowed/denied?" debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub grant: Option<Grant>,
}

/// The authorization engine.
///
/// Owned by the hosting service's dependency graph and passed by reference
/// to every handler — there is no ambient global instance. All evaluation is
/// in-memory against the policy store's current state; the only blocking IO
/// in this crate lives behind the store's adapter.
pub struct AuthorizationEngine {
    store: Arc<PolicyStore>,
}

impl AuthorizationEngine {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PolicyStore> {
        &self.store
    }

    /// Decide `(subject, object, action)`.
    ///
    /// Precedence, short-circuiting on the first match:
    /// 1. superuser identity;
    /// 2. role-inherited rule;
    /// 3. department-inherited rule;
    /// 4. direct rule;
    /// 5. deny.
    ///
    /// Absence of a matching rule is the only deny path. A storage failure
    /// propagates as an error — the decision is then non-authoritative and
    /// callers must not default to allow *or* deny.
    pub fn enforce(&self, subject: &str, object: &str, action: &str) -> AccessResult<bool> {
        Ok(self.explain(subject, object, action)?.allowed)
    }

    /// Like [`enforce`](Self::enforce), but reports which tier granted
    /// access.
    pub fn explain(&self, subject: &str, object: &str, action: &str) -> AccessResult<Decision> {
        if subject == SUPER_ADMIN {
            return Ok(Decision {
                allowed: true,
                grant: Some(Grant::Superuser),
            });
        }

        // One lock acquisition per decision: grouping resolution and rule
        // matching observe a single consistent state.
        let grant = self
            .store
            .with_state(|state| decide(state, subject, object, action))?;

        Ok(Decision {
            allowed: grant.is_some(),
            grant,
        })
    }
}

fn decide(state: &PolicyState, subject: &str, object: &str, action: &str) -> Option<Grant> {
    let mut candidates: Vec<Subject> = Vec::new();
    for role in state.groups_of(GroupingKind::Role, subject) {
        candidates.push(Subject::Role(role.clone()));
    }
    for department in state.groups_of(GroupingKind::Department, subject) {
        candidates.push(Subject::Department(department.clone()));
    }
    candidates.push(Subject::Principal(subject.to_string()));

    for candidate in candidates {
        let matched = state
            .rules_of(candidate.name())
            .iter()
            .any(|(rule_object, rule_action)| {
                field_matches(rule_object, object) && field_matches(rule_action, action)
            });
        if matched {
            return Some(match candidate {
                Subject::Role(name) => Grant::Role { name },
                Subject::Department(name) => Grant::Department { name },
                Subject::Principal(_) => Grant::Direct,
            });
        }
    }

    None
}
