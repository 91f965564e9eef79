use crate::acl::{Action, Resource};
use crate::fs::mime::mime_type;
use crate::web::middleware::auth::authorize;
use crate::web::state::AppState;
use crate::web::utils::errors::{abort_internal, abort_not_found, MSG_FILE_NOT_FOUND};
use crate::web::utils::streaming::{serve_file, FALLBACK_CONTENT_TYPE};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

/// 将请求路径解析为原件目录下的真实文件，越界或不存在时返回 `None`
pub fn resolve_original(root: &FsPath, requested: &str) -> Option<PathBuf> {
    let root = std::fs::canonicalize(root).ok()?;
    let candidate = std::fs::canonicalize(root.join(requested.trim_start_matches('/'))).ok()?;

    if !candidate.starts_with(&root) {
        tracing::warn!("[Originals] Path outside originals skipped: {:?}", candidate);
        return None;
    }
    candidate.is_file().then_some(candidate)
}

/// 下载原始文件，Content-Type 由文件内容嗅探得出
///
/// GET /api/v1/originals/*path
pub async fn handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(requested): Path<String>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, Resource::Originals, Action::Read) {
        return resp;
    }

    let root = state.config.storage.originals_path.clone();

    let opened = tokio::task::spawn_blocking(move || {
        let path = resolve_original(&root, &requested)?;
        let mime = mime_type(&path);
        let file = std::fs::File::open(&path).ok()?;
        Some((file, mime))
    })
    .await;

    match opened {
        Ok(Some((file, mime))) => {
            let content_type = if mime.is_empty() {
                FALLBACK_CONTENT_TYPE
            } else {
                mime.as_str()
            };
            serve_file(file, content_type, &headers).await
        }
        Ok(None) => abort_not_found(MSG_FILE_NOT_FOUND),
        Err(e) => {
            tracing::error!("[Originals] Thread failed: {}", e);
            abort_internal(&e.to_string())
        }
    }
}
