use crate::error::AppError;

/// 除 GET、HEAD 外的请求方法一律返回 405
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
