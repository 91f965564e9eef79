use crate::web::state::AppState;
use crate::web::utils::errors::{
    abort, abort_bad_request, abort_internal, CODE_UNAUTHORIZED, MSG_INVALID_CREDENTIALS,
};
use crate::web::utils::sanitize::sanitize_id;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录并创建会话
///
/// POST /api/v1/session
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let payload: LoginRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("[Auth] Invalid login body: {}", e);
            return abort_bad_request(&e.to_string());
        }
    };

    let user = match state
        .registry
        .verify_password(&payload.username, &payload.password)
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("[Auth] Login failed for {}", payload.username);
            return abort(
                StatusCode::UNAUTHORIZED,
                CODE_UNAUTHORIZED,
                MSG_INVALID_CREDENTIALS,
                None,
            );
        }
        Err(e) => {
            tracing::error!("[Auth] Login lookup failed: {}", e);
            return abort_internal(&e.to_string());
        }
    };

    match state.registry.create_session(&user.uid) {
        Ok(id) => {
            tracing::info!("[Auth] {} logged in", user.username);
            Json(serde_json::json!({
                "status": "success",
                "id": id,
                "user": user
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!("[Auth] Failed to create session: {}", e);
            abort_internal(&e.to_string())
        }
    }
}

/// 注销会话
///
/// DELETE /api/v1/session/:id
pub async fn delete_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.registry.delete_session(&sanitize_id(&id)) {
        Ok(_) => Json(serde_json::json!({ "status": "success" })).into_response(),
        Err(e) => {
            tracing::error!("[Auth] Failed to delete session: {}", e);
            abort_internal(&e.to_string())
        }
    }
}
