//! Request guards: principal resolution and route-level enforcement.
//!
//! The upstream authentication collaborator resolves credentials and
//! forwards the principal identity in the `x-principal-id` header; the
//! enforcement guard then asks the engine whether that principal may hit
//! the requested path with the requested method.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use warden_core::PrincipalId;

use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub const PRINCIPAL_HEADER: &str = "x-principal-id";

#[derive(Clone)]
pub struct GuardState {
    pub services: Arc<AppServices>,
}

pub async fn principal_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let principal_id = extract_principal(req.headers())?;
    req.extensions_mut()
        .insert(PrincipalContext::new(principal_id));
    Ok(next.run(req).await)
}

pub async fn enforce_middleware(
    State(state): State<GuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let principal = req
        .extensions()
        .get::<PrincipalContext>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let allowed = state
        .services
        .engine
        .enforce(
            principal.principal_id().as_str(),
            req.uri().path(),
            req.method().as_str(),
        )
        .map_err(|e| {
            // Non-authoritative decision: report failure, never default to
            // allow or deny.
            tracing::error!(error = %e, "enforcement failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if !allowed {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

fn extract_principal(headers: &HeaderMap) -> Result<PrincipalId, StatusCode> {
    let header = headers
        .get(PRINCIPAL_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let value = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    PrincipalId::new(value.trim()).map_err(|_| StatusCode::UNAUTHORIZED)
}
