use crate::common::bus::EventBus;
use crate::config::Settings;
use crate::storage::PhotoRegistry;
use crate::web::{self, state::AppState};
use std::sync::Arc;
use tracing::info;

/// 启动 HTTP 服务
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    info!(
        "[Config] Binding at {}:{}",
        settings.server.host, settings.server.port
    );

    let registry = PhotoRegistry::new(
        &settings.database.url,
        settings.database.max_connections,
    )?;

    if let Some(password) = settings.admin_password() {
        registry.init_admin(&settings.auth.admin_user, password)?;
    }
    if settings.auth.public {
        tracing::warn!("[Auth] Public mode enabled, every request runs as admin");
    }

    let event_bus = Arc::new(EventBus::new(settings.events.queue_capacity));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = Arc::new(AppState {
        registry,
        event_bus,
        config: settings,
    });

    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[Startup] Service ready at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
