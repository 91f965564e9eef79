use crate::acl::{Action, Resource};
use crate::common::events::{entity_updated_topic, EventContext, PhotoEvent, TOPIC_COUNT_LABELS};
use crate::storage::{LabelForm, LabelFormPatch, Session};
use crate::web::middleware::auth::authorize;
use crate::web::state::AppState;
use crate::web::utils::errors::{
    abort_bad_request, abort_internal, abort_not_found, abort_save_failed, MSG_LABEL_NOT_FOUND,
};
use crate::web::utils::sanitize::sanitize_id;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

pub const LABEL_CHANNEL: &str = "labels";
pub const MSG_LABEL_SAVED: &str = "Label saved";

const DEFAULT_COUNT: i64 = 100;
const MAX_COUNT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

fn event_context(session: &Session) -> EventContext {
    EventContext {
        user_id: Some(session.user_uid.clone()).filter(|id| !id.is_empty()),
        username: Some(session.username.clone()),
    }
}

/// 重新读取标签并广播 `labels.updated`
async fn publish_label_updated(state: &AppState, uid: &str, session: &Session) {
    let label = match state.registry.label_by_uid(uid) {
        Ok(Some(label)) => label,
        Ok(None) => {
            tracing::warn!("[Labels] {} not found while publishing event", uid);
            return;
        }
        Err(e) => {
            tracing::error!("[Labels] Failed to load {} for event: {}", uid, e);
            return;
        }
    };

    state
        .event_bus
        .publish(PhotoEvent::new(
            entity_updated_topic(LABEL_CHANNEL),
            serde_json::json!({ "entities": [label] }),
            event_context(session),
        ))
        .await;
}

/// 查询标签列表
///
/// GET /api/v1/labels?count=&offset=
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, Resource::Labels, Action::Read) {
        return resp;
    }

    let count = params.count.unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT);
    let offset = params.offset.unwrap_or(0);

    match state.registry.list_labels(count, offset) {
        Ok(labels) => Json(labels).into_response(),
        Err(e) => {
            tracing::error!("[Labels] List failed: {}", e);
            abort_internal(&e.to_string())
        }
    }
}

/// 更新标签属性
///
/// PUT /api/v1/labels/:uid
pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(uid): Path<String>,
    body: Bytes,
) -> Response {
    let session = match authorize(&state, &headers, Resource::Labels, Action::Update) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let id = sanitize_id(&uid);
    let label = match state.registry.label_by_uid(&id) {
        Ok(Some(label)) => label,
        Ok(None) => return abort_not_found(MSG_LABEL_NOT_FOUND),
        Err(e) => {
            tracing::error!("[Labels] Lookup {} failed: {}", id, e);
            return abort_not_found(MSG_LABEL_NOT_FOUND);
        }
    };

    let mut form = LabelForm::from(&label);

    let patch: LabelFormPatch = match serde_json::from_slice(&body) {
        Ok(patch) => patch,
        Err(e) => {
            tracing::error!("[Labels] Invalid update body for {}: {}", id, e);
            return abort_bad_request(&e.to_string());
        }
    };
    form.apply(patch);

    let saved = match state.registry.save_label_form(&id, &form) {
        Ok(saved) => saved,
        Err(e) => {
            tracing::error!("[Labels] Save {} failed: {}", id, e);
            return abort_save_failed(&e.to_string());
        }
    };

    let context = event_context(&session);
    state
        .event_bus
        .publish(PhotoEvent::success(MSG_LABEL_SAVED, context))
        .await;
    publish_label_updated(&state, &id, &session).await;

    tracing::info!("[Labels] {} saved by {}", id, session.username);
    Json(saved).into_response()
}

/// 标记为收藏
///
/// POST /api/v1/labels/:uid/like
pub async fn like_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Response {
    set_favorite(&state, &headers, &uid, true).await
}

/// 取消收藏
///
/// DELETE /api/v1/labels/:uid/like
pub async fn dislike_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Response {
    set_favorite(&state, &headers, &uid, false).await
}

async fn set_favorite(state: &AppState, headers: &HeaderMap, uid: &str, favorite: bool) -> Response {
    let session = match authorize(state, headers, Resource::Labels, Action::Update) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let id = sanitize_id(uid);
    let label = match state.registry.label_by_uid(&id) {
        Ok(Some(label)) => label,
        Ok(None) => return abort_not_found(MSG_LABEL_NOT_FOUND),
        Err(e) => {
            tracing::error!("[Labels] Lookup {} failed: {}", id, e);
            return abort_not_found(MSG_LABEL_NOT_FOUND);
        }
    };

    if let Err(e) = state.registry.set_label_favorite(&id, favorite) {
        tracing::error!("[Labels] Favorite update for {} failed: {}", id, e);
        return abort_internal(&e.to_string());
    }

    // 低优先级标签默认不计入标签总数，收藏状态变化时需要修正计数
    if label.priority < 0 {
        let delta = if favorite { 1 } else { -1 };
        state
            .event_bus
            .publish(PhotoEvent::new(
                TOPIC_COUNT_LABELS,
                serde_json::json!({ "count": delta }),
                event_context(&session),
            ))
            .await;
    }

    publish_label_updated(state, &id, &session).await;

    Json(serde_json::json!({})).into_response()
}
