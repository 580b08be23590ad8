//! `warden-authz` — the authorization engine.
//!
//! This crate is intentionally decoupled from HTTP and storage: it consumes
//! a [`PolicyAdapter`] for durability and a resolved principal identity, and
//! exposes a boolean decision plus policy-mutation operations.

pub mod admin;
pub mod engine;
pub mod policy;
pub mod store;

pub use admin::{GrantOutcome, PolicyAdmin, RevokeOutcome};
pub use engine::{AuthorizationEngine, Decision, Grant};
pub use policy::{PolicyRule, Subject, SUPER_ADMIN, WILDCARD};
pub use store::{GroupingKind, PolicyAdapter, PolicySnapshot, PolicyStore};
