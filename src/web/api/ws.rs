use crate::acl::{Action, Resource};
use crate::common::bus::{EventBus, WILDCARD_TOPIC};
use crate::storage::Session;
use crate::web::middleware::auth::{authorize_id, session_id};
use crate::web::state::AppState;
use axum::extract::{
    ws::{Message, WebSocket, WebSocketUpgrade},
    Query, State,
};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct WsQuery {
    pub topics: Option<String>,
    /// 浏览器无法为 WebSocket 设置请求头，允许通过查询参数传入会话
    pub session_id: Option<String>,
}

/// 事件推送
///
/// GET /api/v1/events?topics=labels.updated,count.labels
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Response {
    let id = session_id(&headers).or(query.session_id);
    let session = match authorize_id(&state, id.as_deref(), Resource::Events, Action::Read) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let topics = parse_topics(query.topics);
    let event_bus = state.event_bus.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, event_bus, session, topics))
        .into_response()
}

pub fn parse_topics(raw: Option<String>) -> Vec<String> {
    let Some(raw) = raw else {
        return vec![WILDCARD_TOPIC.to_string()];
    };

    let mut topics: Vec<String> = raw
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();

    if topics.is_empty() {
        topics.push(WILDCARD_TOPIC.to_string());
    }

    topics
}

/// 为已通过 `events`/`read` 校验的会话转发事件
///
/// 只推送 `topics` 中的主题（`*` 表示全部），客户端断开或发送 Close 时退订。
async fn handle_socket(
    mut socket: WebSocket,
    event_bus: Arc<EventBus>,
    session: Session,
    topics: Vec<String>,
) {
    let client_id = format!("ws-{}", Uuid::new_v4());
    let Some(mut rx) = event_bus.subscribe(&client_id, &topics).await else {
        return;
    };
    tracing::debug!(
        "[WebSocket] {} ({}) subscribed to {:?}",
        client_id,
        session.username,
        topics
    );

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!("[WebSocket] Failed to serialize event: {}", err);
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    event_bus.unsubscribe(&client_id).await;
    tracing::debug!("[WebSocket] {} ({}) closed", client_id, session.username);
}
