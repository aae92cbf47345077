//! 网关的配置模块。
//!
//! 该模块负责从环境变量加载配置。AWS 凭据、区域与端点使用标准的
//! `AWS_*` 环境变量，由 `aws-config` 自行读取。

use crate::utils::s3::signing_endpoint;
use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use std::env;
use std::sync::Arc;

/// 默认监听地址
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// 默认 Redis 地址
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// 网关配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 监听地址（`LISTEN_ADDR`）
    pub listen_addr: String,
    /// 存储桶名称（`S3_BUCKET`）
    pub bucket: String,
    /// 签名地址的访问域名（`CONTENT_DOMAIN`）
    pub domain: String,
    /// 存在性缓存地址（`REDIS_URL`）
    pub redis_url: String,
    /// 是否使用路径风格访问 S3（`S3_FORCE_PATH_STYLE`）
    pub force_path_style: bool,
    /// 签名客户端的端点，由访问域名推导
    pub signing_endpoint: String,
}

impl Config {
    /// 从进程环境变量读取配置。
    ///
    /// # Errors
    ///
    /// 缺少 `S3_BUCKET` 或 `CONTENT_DOMAIN`，或虚拟主机风格下访问域名
    /// 不以 `<bucket>.` 开头时返回错误。
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("必须设置 {}", name))
        };

        let bucket = required("S3_BUCKET")?;
        let domain = required("CONTENT_DOMAIN")?;
        let force_path_style = lookup("S3_FORCE_PATH_STYLE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        let signing_endpoint = signing_endpoint(&domain, &bucket, force_path_style)?;

        Ok(Self {
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into()),
            bucket,
            domain,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.into()),
            force_path_style,
            signing_endpoint,
        })
    }

    /// 按配置创建 S3 客户端
    pub async fn s3_client(&self) -> Arc<Client> {
        let sdk_config = aws_config::load_from_env().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(self.force_path_style)
            .build();
        Arc::new(Client::from_conf(s3_config))
    }

    /// 创建只用于签名的 S3 客户端
    ///
    /// 端点指向访问域名，签名中的 host 与重定向目标一致。
    pub async fn s3_signer(&self) -> Arc<Client> {
        let sdk_config = aws_config::load_from_env().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(&self.signing_endpoint)
            .force_path_style(self.force_path_style)
            .build();
        Arc::new(Client::from_conf(s3_config))
    }
}
