use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

pub const CODE_INTERNAL: &str = "PHOTO-500";
pub const CODE_BAD_REQUEST: &str = "PHOTO-400";
pub const CODE_UNAUTHORIZED: &str = "PHOTO-401";
pub const CODE_FORBIDDEN: &str = "PHOTO-403";
pub const CODE_NOT_FOUND: &str = "PHOTO-404";

pub const MSG_UNAUTHORIZED: &str = "Please log in to your account";
pub const MSG_BAD_REQUEST: &str = "Invalid request";
pub const MSG_SAVE_FAILED: &str = "Changes could not be saved";
pub const MSG_LABEL_NOT_FOUND: &str = "Label not found";
pub const MSG_FILE_NOT_FOUND: &str = "File not found";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials";

pub fn error_json(code: &str, safe_message: &str, details: Option<&str>) -> Value {
    let message = if cfg!(debug_assertions) {
        details.unwrap_or(safe_message)
    } else {
        safe_message
    };
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

pub fn abort(status: StatusCode, code: &str, safe_message: &str, details: Option<&str>) -> Response {
    (status, Json(error_json(code, safe_message, details))).into_response()
}

pub fn abort_unauthorized() -> Response {
    abort(StatusCode::UNAUTHORIZED, CODE_UNAUTHORIZED, MSG_UNAUTHORIZED, None)
}

pub fn abort_bad_request(details: &str) -> Response {
    abort(
        StatusCode::BAD_REQUEST,
        CODE_BAD_REQUEST,
        MSG_BAD_REQUEST,
        Some(details),
    )
}

/// 404 的消息面向用户，不附带内部细节
pub fn abort_not_found(message: &str) -> Response {
    abort(StatusCode::NOT_FOUND, CODE_NOT_FOUND, message, None)
}

pub fn abort_save_failed(details: &str) -> Response {
    abort(
        StatusCode::INTERNAL_SERVER_ERROR,
        CODE_INTERNAL,
        MSG_SAVE_FAILED,
        Some(details),
    )
}

pub fn abort_internal(details: &str) -> Response {
    abort(
        StatusCode::INTERNAL_SERVER_ERROR,
        CODE_INTERNAL,
        "Internal error",
        Some(details),
    )
}
