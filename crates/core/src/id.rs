//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AccessError;

/// Identity of a principal (the subject of authorization decisions).
///
/// Principal ids are opaque strings: the source system derives them from
/// numeric user ids, but any stable unique string is valid. Empty strings
/// are rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Result<Self, AccessError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AccessError::validation("principal id must not be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a department entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(Uuid);

impl DepartmentId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing ids explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DepartmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for DepartmentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<DepartmentId> for Uuid {
    fn from(value: DepartmentId) -> Self {
        value.0
    }
}

impl FromStr for DepartmentId {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| AccessError::validation(format!("DepartmentId: {e}")))?;
        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_id_rejects_empty() {
        assert!(PrincipalId::new("").is_err());
        assert!(PrincipalId::new("   ").is_err());
        assert!(PrincipalId::new("42").is_ok());
    }

    #[test]
    fn department_id_round_trips_through_str() {
        let id = DepartmentId::new();
        let parsed: DepartmentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
