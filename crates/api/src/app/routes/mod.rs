use axum::Router;

pub mod departments;
pub mod rbac;
pub mod system;

/// All protected routes.
pub fn router() -> Router {
    Router::new()
        .nest("/rbac", rbac::router())
        .nest("/departments", departments::router())
}
