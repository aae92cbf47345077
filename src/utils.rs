//! 工具函数模块
//!
//! 此模块包含了项目中使用的各种工具：
//! - 对象存储与存在性缓存的接口及其实现
//! - 签名截止时间计算
//! - 请求路径到对象键的转换
//! - 健康检查日志采样

pub mod cache;
pub mod deadline;
pub mod path;
pub mod s3;
pub mod sampler;
