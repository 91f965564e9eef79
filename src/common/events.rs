use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const TOPIC_NOTIFY_SUCCESS: &str = "notify.success";
pub const TOPIC_COUNT_LABELS: &str = "count.labels";

/// 实体更新事件的主题，例如 `labels.updated`
pub fn entity_updated_topic(channel: &str) -> String {
    format!("{}.updated", channel)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoEvent {
    pub id: String,
    pub topic: String,
    pub payload: serde_json::Value,
    pub context: EventContext,
    pub occurred_at: u64,
}

impl PhotoEvent {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value, context: EventContext) -> Self {
        let occurred_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            id: Uuid::new_v4().to_string(),
            topic: topic.into(),
            payload,
            context,
            occurred_at,
        }
    }

    /// 用户可见的成功提示
    pub fn success(message: &str, context: EventContext) -> Self {
        Self::new(
            TOPIC_NOTIFY_SUCCESS,
            serde_json::json!({ "message": message }),
            context,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_topic_is_channel_scoped() {
        assert_eq!(entity_updated_topic("labels"), "labels.updated");
    }

    #[test]
    fn success_event_carries_message() {
        let event = PhotoEvent::success("Label saved", EventContext::default());
        assert_eq!(event.topic, TOPIC_NOTIFY_SUCCESS);
        assert_eq!(event.payload["message"], "Label saved");
    }
}
