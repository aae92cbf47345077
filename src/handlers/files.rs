use crate::AppState;
use crate::error::AppError;
use crate::handlers::constants::{SIGNED_URL_SCHEME, STATUS_OK_BODY, STATUS_PATH};
use crate::utils::cache::access_marker;
use crate::utils::deadline::current_deadline;
use crate::utils::path::object_key;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};

/// 处理 GET 请求：确认对象存在后重定向到签名地址。
///
/// 处理流程：
/// 1. 根路径返回 404，`/_status` 直接返回 200。
/// 2. 查询存在性缓存；命中时信任对象存在，不再访问对象存储。
/// 3. 未命中时查询对象存储，对象不存在返回 404。
/// 4. 刷新缓存中的确认时间，写入失败返回 500。
/// 5. 生成在下一个零点过期的签名地址，返回 307 重定向。
///
/// # 参数
///
/// * `state` - 应用状态，包含对象存储、缓存与访问域名。
/// * `uri` - 请求 URI，只使用其中的路径部分。
pub async fn handle_files(State(state): State<AppState>, uri: Uri) -> Result<Response, AppError> {
    let path = uri.path();

    if path == STATUS_PATH {
        return Ok((StatusCode::OK, STATUS_OK_BODY).into_response());
    }

    let key = object_key(path).ok_or(AppError::NotFound)?;

    // 缓存中没有记录时才回源确认
    if state.cache.get(key).await?.is_none() {
        if let Err(e) = state.storage.stat(key).await {
            tracing::debug!("stat {} failed: {}", key, e);
            return Err(AppError::NotFound);
        }
    }

    state.cache.set(key, &access_marker()).await?;

    let signed_path = state
        .storage
        .make_signed_url(key, current_deadline())
        .await?;
    let location = format!("{}{}{}", SIGNED_URL_SCHEME, state.domain, signed_path);

    Ok(Redirect::temporary(&location).into_response())
}
