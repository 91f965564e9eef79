use crate::acl::{Action, Resource, Role};
use crate::storage::Session;
use crate::web::state::AppState;
use crate::web::utils::errors::{abort, abort_internal, abort_unauthorized, CODE_FORBIDDEN};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

pub const SESSION_HEADER: &str = "x-session-id";
pub const PUBLIC_SESSION_ID: &str = "public";

/// 从 `X-Session-ID` 或 `Authorization: Bearer <id>` 中读取会话 ID
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    if let Some(id) = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(id.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 校验会话并检查角色对资源的操作权限
///
/// 公开模式下直接返回管理员会话。无会话或会话无效返回 401，
/// 角色权限不足返回 403。
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    resource: Resource,
    action: Action,
) -> Result<Session, Response> {
    authorize_id(state, session_id(headers).as_deref(), resource, action)
}

pub fn authorize_id(
    state: &AppState,
    id: Option<&str>,
    resource: Resource,
    action: Action,
) -> Result<Session, Response> {
    if state.config.auth.public {
        return Ok(Session {
            id: PUBLIC_SESSION_ID.to_string(),
            user_uid: String::new(),
            username: state.config.auth.admin_user.clone(),
            role: Role::Admin,
        });
    }

    let Some(id) = id else {
        tracing::debug!("[Auth] Missing session id");
        return Err(abort_unauthorized());
    };

    let session = match state.registry.find_session(id) {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::warn!("[Auth] Invalid session");
            return Err(abort_unauthorized());
        }
        Err(e) => {
            tracing::error!("[Auth] Session lookup failed: {}", e);
            return Err(abort_internal(&e.to_string()));
        }
    };

    if !session.role.allows(resource, action) {
        tracing::warn!(
            "[Auth] Denied {:?} {:?} for {} ({})",
            action,
            resource,
            session.username,
            session.role
        );
        return Err(abort(
            StatusCode::FORBIDDEN,
            CODE_FORBIDDEN,
            "Permission denied",
            None,
        ));
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_session_header_first() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer def"));
        assert_eq!(session_id(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn falls_back_to_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer def"));
        assert_eq!(session_id(&headers).as_deref(), Some("def"));
    }

    #[test]
    fn empty_headers_have_no_session() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("  "));
        assert_eq!(session_id(&headers), None);
    }
}
