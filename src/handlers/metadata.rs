use crate::AppState;
use crate::utils::cache::access_marker;
use crate::utils::path::object_key;
use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

/// 处理 HEAD 请求：返回对象大小并刷新存在性缓存。
///
/// 不读缓存，每次都向对象存储确认。缓存写入失败时返回 500，
/// 不在缓存未刷新的情况下报告元数据。所有响应均无响应体。
pub async fn handle_metadata(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(key) = object_key(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let info = match state.storage.stat(key).await {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!("stat {} failed: {}", key, e);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    if let Err(e) = state.cache.set(key, &access_marker()).await {
        tracing::error!("refresh cache for {} failed: {}", key, e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_LENGTH, info.size.to_string())],
    )
        .into_response()
}
