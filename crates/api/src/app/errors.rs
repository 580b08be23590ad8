use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warden_core::AccessError;

/// Map an access error onto a stable error code and status.
///
/// Every error condition reaches the caller as a structured failure; no
/// error is swallowed into a generic success response.
pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match err {
        AccessError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AccessError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        AccessError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        AccessError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
