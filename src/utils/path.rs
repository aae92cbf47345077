/// 从请求路径中得到对象键
///
/// 只去掉开头的一个 `/`，其余字符原样保留，不做解码或校验。
/// 去掉后为空（即根路径）时返回 `None`。
///
/// # 示例
///
/// ```
/// use redirect_gateway::utils::path::object_key;
///
/// assert_eq!(object_key("/images/a.png"), Some("images/a.png"));
/// assert_eq!(object_key("//double"), Some("/double"));
/// assert_eq!(object_key("/"), None);
/// assert_eq!(object_key(""), None);
/// ```
pub fn object_key(path: &str) -> Option<&str> {
    let key = path.strip_prefix('/').unwrap_or(path);
    if key.is_empty() { None } else { Some(key) }
}
