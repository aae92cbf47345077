use crate::AppState;
use crate::handlers::constants::{REAL_IP_HEADER, STATUS_PATH};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// 访问日志中间件
///
/// 在处理器返回后输出一行访问日志。`/_status` 的请求先经过采样器，
/// 未被放行时不输出。
pub async fn access_log(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let ip = client_ip(&req);

    let response = next.run(req).await;

    if uri.path() == STATUS_PATH && !state.sampler.sample() {
        return response;
    }

    let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    let line = format_access_line(&ip, &method, response.status(), start.elapsed(), target);
    tracing::info!(target: "access", "{}", line);

    response
}

/// 取客户端 IP：优先使用 `X-Real-IP`，否则使用连接的对端地址
fn client_ip(req: &Request) -> String {
    if let Some(ip) = req
        .headers()
        .get(REAL_IP_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return ip.to_string();
    }

    // 未通过 into_make_service_with_connect_info 启动时（如测试中直接调用路由）没有对端地址
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// 格式化访问日志：`[ip]\t[method]\t[status]\t[耗时ms]\t[uri]`
pub fn format_access_line(
    ip: &str,
    method: &Method,
    status: StatusCode,
    elapsed: Duration,
    uri: &str,
) -> String {
    format!(
        "[{}]\t[{}]\t[{}]\t[{:.6}ms]\t[{}]",
        ip,
        method,
        status.as_u16(),
        elapsed.as_secs_f64() * 1000.0,
        uri
    )
}
