use crate::common::bus::EventBus;
use crate::config::Settings;
use crate::storage::PhotoRegistry;
use std::sync::Arc;

/// Web 应用全局状态
///
/// 职责：包含所有跨请求共享的资源对象，通过 Arc 注入到 Axum 的 Handler 中。
#[derive(Clone)]
pub struct AppState {
    pub registry: PhotoRegistry,
    pub event_bus: Arc<EventBus>,
    pub config: Settings,
}
