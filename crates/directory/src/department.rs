//! Department entity and field validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{AccessError, DepartmentId};

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// A department record.
///
/// # Invariants
/// - `name` is unique among live departments, non-empty, ≤ 50 chars.
/// - `description` is ≤ 255 chars.
/// - `parent_id`, if present, references an existing department and is
///   never the department's own id.
/// - A department with children cannot be deleted (deletion is blocked,
///   not cascaded).
///
/// Uniqueness and parent existence are relational invariants enforced by
/// [`DepartmentService`](crate::service::DepartmentService); this type only
/// validates its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub description: String,
    pub parent_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated creation/update input for a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDraft {
    pub name: String,
    pub description: String,
    pub parent_id: Option<DepartmentId>,
}

impl DepartmentDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_id: Option<DepartmentId>,
    ) -> Result<Self, AccessError> {
        let name = name.into();
        let description = description.into();

        if name.trim().is_empty() {
            return Err(AccessError::validation("department name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AccessError::validation(format!(
                "department name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AccessError::validation(format!(
                "department description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }

        Ok(Self {
            name,
            description,
            parent_id,
        })
    }

    /// Materialize a new department from this draft.
    pub fn create(self) -> Department {
        let now = Utc::now();
        Department {
            id: DepartmentId::new(),
            name: self.name,
            description: self.description,
            parent_id: self.parent_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_rejects_empty_and_oversized_names() {
        assert!(DepartmentDraft::new("", "", None).is_err());
        assert!(DepartmentDraft::new("  ", "", None).is_err());
        assert!(DepartmentDraft::new("x".repeat(51), "", None).is_err());
        assert!(DepartmentDraft::new("x".repeat(50), "", None).is_ok());
    }

    #[test]
    fn draft_rejects_oversized_descriptions() {
        assert!(DepartmentDraft::new("IT", "d".repeat(256), None).is_err());
        assert!(DepartmentDraft::new("IT", "d".repeat(255), None).is_ok());
    }

    #[test]
    fn create_stamps_a_fresh_identity() {
        let dept = DepartmentDraft::new("IT", "infrastructure", None)
            .unwrap()
            .create();
        assert_eq!(dept.name, "IT");
        assert!(dept.deleted_at.is_none());
        assert_eq!(dept.created_at, dept.updated_at);
    }
}
