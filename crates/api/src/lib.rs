//! `warden-api` — HTTP administration surface over the authorization
//! engine and the department directory.

pub mod app;
pub mod context;
pub mod middleware;
