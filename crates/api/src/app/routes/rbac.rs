//! Policy administration endpoints: thin envelopes over the engine's
//! mutation and query operations.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use warden_authz::{GrantOutcome, RevokeOutcome};
use warden_core::PrincipalId;

use crate::app::errors::access_error_to_response;
use crate::app::services::AppServices;

#[derive(Debug, Deserialize)]
pub struct PolicyRequest {
    pub sub: String,
    pub obj: String,
    pub act: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleGrantRequest {
    pub principal_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentGrantRequest {
    pub principal_id: String,
    pub department: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/policies", post(add_policy))
        .route("/enforce", post(enforce))
        .route("/roles", post(assign_role).delete(revoke_role))
        .route("/roles/:principal_id", get(list_roles))
        .route(
            "/departments",
            post(assign_department).delete(revoke_department),
        )
        .route("/departments/:principal_id", get(list_departments))
}

/// POST /rbac/policies - add a policy rule.
pub async fn add_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<PolicyRequest>,
) -> axum::response::Response {
    match services.admin.add_rule(&req.sub, &req.obj, &req.act).await {
        Ok(outcome) => grant_response(outcome),
        Err(e) => access_error_to_response(e),
    }
}

/// POST /rbac/enforce - ask for an authorization decision.
pub async fn enforce(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<PolicyRequest>,
) -> axum::response::Response {
    match services.engine.explain(&req.sub, &req.obj, &req.act) {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(e) => access_error_to_response(e),
    }
}

/// POST /rbac/roles - grant a role to a principal.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<RoleGrantRequest>,
) -> axum::response::Response {
    let principal = match parse_principal(&req.principal_id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match services.admin.assign_role(&principal, &req.role).await {
        Ok(outcome) => grant_response(outcome),
        Err(e) => access_error_to_response(e),
    }
}

/// DELETE /rbac/roles - revoke a role from a principal.
pub async fn revoke_role(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<RoleGrantRequest>,
) -> axum::response::Response {
    let principal = match parse_principal(&req.principal_id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match services.admin.revoke_role(&principal, &req.role).await {
        Ok(outcome) => revoke_response(outcome),
        Err(e) => access_error_to_response(e),
    }
}

/// GET /rbac/roles/:principal_id - roles granted to a principal.
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Path(principal_id): Path<String>,
) -> axum::response::Response {
    let principal = match parse_principal(&principal_id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match services.admin.roles_for(&principal) {
        Ok(roles) => (StatusCode::OK, Json(serde_json::json!({ "roles": roles }))).into_response(),
        Err(e) => access_error_to_response(e),
    }
}

/// POST /rbac/departments - grant a department to a principal.
pub async fn assign_department(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<DepartmentGrantRequest>,
) -> axum::response::Response {
    let principal = match parse_principal(&req.principal_id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match services
        .admin
        .assign_department(&principal, &req.department)
        .await
    {
        Ok(outcome) => grant_response(outcome),
        Err(e) => access_error_to_response(e),
    }
}

/// DELETE /rbac/departments - revoke a department from a principal.
pub async fn revoke_department(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<DepartmentGrantRequest>,
) -> axum::response::Response {
    let principal = match parse_principal(&req.principal_id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match services
        .admin
        .revoke_department(&principal, &req.department)
        .await
    {
        Ok(outcome) => revoke_response(outcome),
        Err(e) => access_error_to_response(e),
    }
}

/// GET /rbac/departments/:principal_id - departments granted to a principal.
pub async fn list_departments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(principal_id): Path<String>,
) -> axum::response::Response {
    let principal = match parse_principal(&principal_id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match services.admin.departments_for(&principal) {
        Ok(departments) => (
            StatusCode::OK,
            Json(serde_json::json!({ "departments": departments })),
        )
            .into_response(),
        Err(e) => access_error_to_response(e),
    }
}

fn parse_principal(raw: &str) -> Result<PrincipalId, axum::response::Response> {
    PrincipalId::new(raw).map_err(access_error_to_response)
}

fn grant_response(outcome: GrantOutcome) -> axum::response::Response {
    let status = match outcome {
        GrantOutcome::Created => StatusCode::CREATED,
        GrantOutcome::AlreadyExists => StatusCode::OK,
    };
    (status, Json(serde_json::json!({ "outcome": outcome }))).into_response()
}

fn revoke_response(outcome: RevokeOutcome) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "outcome": outcome })),
    )
        .into_response()
}
