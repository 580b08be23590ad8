//! Access-control error model.

use thiserror::Error;

/// Result type used across the access-control layers.
pub type AccessResult<T> = Result<T, AccessError>;

/// Error taxonomy shared by the policy store, the engine and the
/// administration surface.
///
/// `Storage` is the only infrastructure-flavored variant; it exists here
/// because an enforcement decision is only valid when the engine can assert
/// it — callers must treat a `Storage` failure as "no decision", never as
/// allow or deny.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// A caller-supplied identifier or field failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness or lifecycle invariant was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store was unreachable or returned an unexpected fault.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl AccessError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
