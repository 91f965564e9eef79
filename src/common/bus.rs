use crate::common::events::PhotoEvent;
use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};

pub const WILDCARD_TOPIC: &str = "*";

struct Subscriber {
    topics: HashSet<String>,
    queue: mpsc::Sender<PhotoEvent>,
}

impl Subscriber {
    fn wants(&self, topic: &str) -> bool {
        self.topics.contains(WILDCARD_TOPIC) || self.topics.contains(topic)
    }
}

/// 进程内事件总线
///
/// 每个订阅者拥有一个有界队列；队列已满或订阅者已断开时事件被丢弃，
/// 发布方不会因此阻塞失败。
pub struct EventBus {
    subscribers: RwLock<HashMap<String, Subscriber>>,
    queue_capacity: usize,
}

impl EventBus {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// 注册订阅者；同一 ID 重复订阅只追加主题，返回 `None`
    pub async fn subscribe(
        &self,
        client_id: &str,
        topics: &[String],
    ) -> Option<mpsc::Receiver<PhotoEvent>> {
        let mut subscribers = self.subscribers.write().await;

        if let Some(existing) = subscribers.get_mut(client_id) {
            existing.topics.extend(topics.iter().cloned());
            return None;
        }

        let (queue, rx) = mpsc::channel(self.queue_capacity);
        subscribers.insert(
            client_id.to_string(),
            Subscriber {
                topics: topics.iter().cloned().collect(),
                queue,
            },
        );
        Some(rx)
    }

    pub async fn unsubscribe(&self, client_id: &str) {
        if self.subscribers.write().await.remove(client_id).is_some() {
            tracing::trace!("[EventBus] {} unsubscribed", client_id);
        }
    }

    /// 投递事件，返回成功入队的订阅者数量
    pub async fn publish(&self, event: PhotoEvent) -> usize {
        let subscribers = self.subscribers.read().await;
        let mut delivered = 0usize;

        for (client_id, subscriber) in subscribers.iter() {
            if !subscriber.wants(&event.topic) {
                continue;
            }
            match subscriber.queue.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!("[EventBus] Queue full, dropped {} for {}", event.topic, client_id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }

        if delivered == 0 {
            tracing::trace!("[EventBus] No deliveries for {}", event.topic);
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::events::EventContext;

    fn event(topic: &str) -> PhotoEvent {
        PhotoEvent::new(topic, serde_json::json!({}), EventContext::default())
    }

    #[tokio::test]
    async fn delivers_to_matching_and_wildcard_subscribers() {
        let bus = EventBus::new(4);
        let mut labels = bus
            .subscribe("a", &["labels.updated".to_string()])
            .await
            .expect("receiver");
        let mut all = bus.subscribe("b", &["*".to_string()]).await.expect("receiver");

        assert_eq!(bus.publish(event("labels.updated")).await, 2);
        assert_eq!(bus.publish(event("count.labels")).await, 1);

        assert_eq!(labels.recv().await.unwrap().topic, "labels.updated");
        assert_eq!(all.recv().await.unwrap().topic, "labels.updated");
        assert_eq!(all.recv().await.unwrap().topic, "count.labels");
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let bus = EventBus::new(4);
        let _rx = bus.subscribe("a", &["*".to_string()]).await;
        bus.unsubscribe("a").await;
        assert_eq!(bus.publish(event("labels.updated")).await, 0);
    }

    #[tokio::test]
    async fn full_queue_drops_events() {
        let bus = EventBus::new(1);
        let _rx = bus.subscribe("a", &["*".to_string()]).await;
        assert_eq!(bus.publish(event("x")).await, 1);
        assert_eq!(bus.publish(event("x")).await, 0);
    }

    #[tokio::test]
    async fn resubscribe_extends_topics() {
        let bus = EventBus::new(4);
        let mut rx = bus
            .subscribe("a", &["labels.updated".to_string()])
            .await
            .expect("receiver");
        assert!(bus.subscribe("a", &["count.labels".to_string()]).await.is_none());

        assert_eq!(bus.publish(event("count.labels")).await, 1);
        assert_eq!(rx.recv().await.unwrap().topic, "count.labels");
    }
}
