//! Policy model: rule triples, the tagged subject union, and matching.

use serde::{Deserialize, Serialize};

use warden_core::AccessError;

/// Reserved identity that bypasses all rule evaluation.
///
/// This is an engine-level constant, not a stored rule.
pub const SUPER_ADMIN: &str = "super_admin";

/// Wildcard token: matches any requested value in the field it occupies.
///
/// A rule field may also end in the token after a prefix (`/users/*`),
/// which matches any requested value with that prefix. There are no other
/// glob or regex semantics.
pub const WILDCARD: &str = "*";

/// A stored grant `(subject, object, action)`.
///
/// `subject` may name a principal, a role, or a department; `object` is a
/// resource path; `action` is an operation name. `object` and `action` may
/// each be the wildcard token. All rules are positive grants — there is no
/// deny rule category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRule {
    pub subject: String,
    pub object: String,
    pub action: String,
}

impl PolicyRule {
    /// Build a rule, rejecting empty fields.
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, AccessError> {
        let rule = Self {
            subject: subject.into(),
            object: object.into(),
            action: action.into(),
        };
        if rule.subject.trim().is_empty() {
            return Err(AccessError::validation("rule subject must not be empty"));
        }
        if rule.object.trim().is_empty() {
            return Err(AccessError::validation("rule object must not be empty"));
        }
        if rule.action.trim().is_empty() {
            return Err(AccessError::validation("rule action must not be empty"));
        }
        Ok(rule)
    }

    /// Does this rule grant `(object, action)`?
    ///
    /// Object and action are matched independently: a wildcard in one field
    /// does not loosen the other.
    pub fn grants(&self, object: &str, action: &str) -> bool {
        field_matches(&self.object, object) && field_matches(&self.action, action)
    }
}

impl core::fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.object, self.action)
    }
}

/// Per-field wildcard comparison shared by rule and matcher code.
///
/// Equality, or a trailing wildcard token matching any remainder
/// (`*` matches everything, `/users/*` matches `/users/7`).
pub(crate) fn field_matches(rule_field: &str, requested: &str) -> bool {
    if rule_field == requested {
        return true;
    }
    match rule_field.strip_suffix(WILDCARD) {
        Some(prefix) => requested.starts_with(prefix),
        None => false,
    }
}

/// A candidate subject during matching.
///
/// The wire format for rule subjects stays a bare string, but the matcher
/// tags each candidate so the three-tier precedence (role, then department,
/// then direct) is explicit in code rather than implicit in string
/// convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Subject {
    Principal(String),
    Role(String),
    Department(String),
}

impl Subject {
    /// The bare string compared against stored rule subjects.
    pub fn name(&self) -> &str {
        match self {
            Subject::Principal(name) | Subject::Role(name) | Subject::Department(name) => name,
        }
    }
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Subject::Principal(name) => write!(f, "principal:{name}"),
            Subject::Role(name) => write!(f, "role:{name}"),
            Subject::Department(name) => write!(f, "department:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_rejects_empty_fields() {
        assert!(PolicyRule::new("", "/a", "GET").is_err());
        assert!(PolicyRule::new("admin", " ", "GET").is_err());
        assert!(PolicyRule::new("admin", "/a", "").is_err());
        assert!(PolicyRule::new("admin", "/a", "GET").is_ok());
    }

    #[test]
    fn wildcard_fields_match_independently() {
        let rule = PolicyRule::new("r", "/a", "*").unwrap();
        assert!(rule.grants("/a", "POST"));
        assert!(rule.grants("/a", "GET"));
        assert!(!rule.grants("/b", "POST"));

        let rule = PolicyRule::new("r", "*", "GET").unwrap();
        assert!(rule.grants("/anything", "GET"));
        assert!(!rule.grants("/anything", "DELETE"));
    }

    #[test]
    fn object_matching_is_exact_outside_the_wildcard() {
        let rule = PolicyRule::new("r", "/users", "GET").unwrap();
        assert!(rule.grants("/users", "GET"));
        assert!(!rule.grants("/users/7", "GET"));
        assert!(!rule.grants("/user", "GET"));
    }

    #[test]
    fn trailing_wildcard_matches_any_remainder() {
        let rule = PolicyRule::new("admin", "/users/*", "*").unwrap();
        assert!(rule.grants("/users/7", "DELETE"));
        assert!(rule.grants("/users/7/sessions", "GET"));
        assert!(!rule.grants("/orders/7", "GET"));
    }
}
