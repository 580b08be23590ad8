//! Policy adapter implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryPolicyAdapter;
pub use postgres::PostgresPolicyAdapter;
