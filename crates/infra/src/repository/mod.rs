//! Department repository implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDepartmentRepository;
pub use postgres::PostgresDepartmentRepository;
