pub mod api;
pub mod middleware;
pub mod state;
pub mod utils;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::web::api::{labels, originals, session, ws};
use crate::web::state::AppState;

/// 构建完整路由
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/session", post(session::create_handler))
        .route("/session/:id", delete(session::delete_handler))
        .route("/labels", get(labels::list_handler))
        .route("/labels/:uid", put(labels::update_handler))
        .route(
            "/labels/:uid/like",
            post(labels::like_handler).delete(labels::dislike_handler),
        )
        .route("/originals/*path", get(originals::handler))
        .route("/events", get(ws::ws_handler));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}
