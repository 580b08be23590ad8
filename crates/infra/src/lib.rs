//! `warden-infra` — storage adapters behind the domain seams.
//!
//! In-memory implementations serve tests and dev mode; the Postgres
//! implementations back production deployments.

pub mod policy;
pub mod repository;
pub mod schema;

pub use policy::{InMemoryPolicyAdapter, PostgresPolicyAdapter};
pub use repository::{InMemoryDepartmentRepository, PostgresDepartmentRepository};
pub use schema::ensure_schema;
