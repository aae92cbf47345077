//! HTTP请求处理模块
//!
//! 此模块包含了处理不同类型HTTP请求的所有处理器：
//! - GET：存在性确认与签名重定向
//! - HEAD：对象元数据
//! - 其他方法：405
//! - 访问日志中间件

pub mod access_log;
pub mod constants;
pub mod fallback;
pub mod files;
pub mod metadata;

// 重新导出主要的公共接口
pub use access_log::access_log;
pub use fallback::handle_method_not_allowed;
pub use files::handle_files;
pub use metadata::handle_metadata;
