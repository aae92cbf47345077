use axum::http::HeaderName;

/// 健康检查路径
pub const STATUS_PATH: &str = "/_status";

/// 健康检查响应体
pub const STATUS_OK_BODY: &str = "200 - OK\n";

/// 签名地址使用的协议前缀
pub const SIGNED_URL_SCHEME: &str = "http://";

/// 反向代理传入的真实客户端 IP
pub const REAL_IP_HEADER: HeaderName = HeaderName::from_static("x-real-ip");
