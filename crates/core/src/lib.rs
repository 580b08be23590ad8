//! `warden-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{AccessError, AccessResult};
pub use id::{DepartmentId, PrincipalId};
