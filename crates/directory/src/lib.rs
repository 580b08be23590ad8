//! `warden-directory` — organizational structure (departments).
//!
//! Departments group principals organizationally and form a tree via an
//! optional parent reference. The engine treats department membership as
//! flat; the tree produced here is for display and organization.

pub mod department;
pub mod service;
pub mod tree;

pub use department::{Department, DepartmentDraft};
pub use service::{DepartmentRepository, DepartmentService};
pub use tree::{build_tree, DepartmentNode};
