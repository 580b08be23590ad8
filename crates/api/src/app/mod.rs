//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring (policy store, engine, directory)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app() -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services().await?);
    let guard = middleware::GuardState {
        services: services.clone(),
    };

    // Protected routes: require a resolved principal, then an engine
    // decision for (principal, path, method).
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            guard,
            middleware::enforce_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::principal_middleware));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected))
}
