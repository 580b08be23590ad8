//! Department CRUD and tree endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use warden_core::DepartmentId;
use warden_directory::DepartmentDraft;

use crate::app::errors::access_error_to_response;
use crate::app::services::AppServices;

#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parent_id: Option<Uuid>,
}

impl DepartmentRequest {
    fn draft(self) -> Result<DepartmentDraft, axum::response::Response> {
        DepartmentDraft::new(
            self.name,
            self.description,
            self.parent_id.map(DepartmentId::from_uuid),
        )
        .map_err(access_error_to_response)
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/tree", get(tree))
        .route("/:id", get(get_one).put(update).delete(delete))
}

/// GET /departments - flat listing.
pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.departments.list().await {
        Ok(departments) => (
            StatusCode::OK,
            Json(serde_json::json!({ "departments": departments })),
        )
            .into_response(),
        Err(e) => access_error_to_response(e),
    }
}

/// GET /departments/tree - the derived forest.
pub async fn tree(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.departments.tree().await {
        Ok(forest) => {
            (StatusCode::OK, Json(serde_json::json!({ "tree": forest }))).into_response()
        }
        Err(e) => access_error_to_response(e),
    }
}

/// GET /departments/:id
pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services.departments.get(DepartmentId::from_uuid(id)).await {
        Ok(department) => (StatusCode::OK, Json(department)).into_response(),
        Err(e) => access_error_to_response(e),
    }
}

/// POST /departments - create a department.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<DepartmentRequest>,
) -> axum::response::Response {
    let draft = match req.draft() {
        Ok(draft) => draft,
        Err(resp) => return resp,
    };
    match services.departments.create(draft).await {
        Ok(department) => (StatusCode::CREATED, Json(department)).into_response(),
        Err(e) => access_error_to_response(e),
    }
}

/// PUT /departments/:id - update name/description/parent.
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
    Json(req): Json<DepartmentRequest>,
) -> axum::response::Response {
    let draft = match req.draft() {
        Ok(draft) => draft,
        Err(resp) => return resp,
    };
    match services
        .departments
        .update(DepartmentId::from_uuid(id), draft)
        .await
    {
        Ok(department) => (StatusCode::OK, Json(department)).into_response(),
        Err(e) => access_error_to_response(e),
    }
}

/// DELETE /departments/:id - soft-delete (blocked while children exist).
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match services
        .departments
        .delete(DepartmentId::from_uuid(id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => access_error_to_response(e),
    }
}
