//! 签名重定向网关库
//!
//! 这是一个基于Axum的对象访问网关，主要功能包括：
//! - 通过存在性缓存减少对对象存储的查询
//! - 将 GET 请求重定向到按天对齐过期的签名地址
//! - 通过 HEAD 请求返回对象大小
//! - 输出访问日志，并对健康检查请求采样

pub mod config;
pub mod error;
pub mod handlers;
pub mod utils;

use axum::middleware;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utils::cache::ExistenceCache;
use utils::s3::ObjectStorage;
use utils::sampler::StatusSampler;

/// 应用状态，在所有请求间共享
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ObjectStorage>,
    pub cache: Arc<dyn ExistenceCache>,
    /// 签名地址使用的访问域名
    pub domain: String,
    pub sampler: Arc<StatusSampler>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        cache: Arc<dyn ExistenceCache>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            cache,
            domain: domain.into(),
            sampler: Arc::new(StatusSampler::default()),
        }
    }
}

/// 创建并配置Axum应用程序
///
/// 所有路径都交给同一个按方法分发的路由：
/// - GET 到 [`handlers::handle_files`]
/// - HEAD 到 [`handlers::handle_metadata`]
/// - 其他方法到 [`handlers::handle_method_not_allowed`]
///
/// 外层依次是访问日志中间件和请求追踪中间件。
pub fn app(state: AppState) -> axum::Router {
    let routes = get(handlers::handle_files)
        .head(handlers::handle_metadata)
        .fallback(handlers::handle_method_not_allowed);

    axum::Router::new()
        .fallback(routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::access_log,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
