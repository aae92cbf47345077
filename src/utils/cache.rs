//! 对象存在性缓存
//!
//! 缓存中记录「某个键最近一次被确认存在的时间」。条目没有过期时间，
//! 也从不删除：一旦写入，后续 GET 请求都会信任该键存在。

use async_trait::async_trait;
use chrono::Local;
use mockall::automock;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;

/// 缓存访问错误
///
/// 「键不存在」不是错误，由 `get` 返回 `None` 表示。
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

/// 构造连接层面的缓存错误
#[cfg(test)]
pub(crate) fn io_error(message: &'static str) -> CacheError {
    let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, message);
    CacheError::Redis(redis::RedisError::from(err))
}

/// 存在性缓存的读写接口
#[automock]
#[async_trait]
pub trait ExistenceCache: Send + Sync {
    /// 读取键对应的标记，未命中时返回 `Ok(None)`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入键对应的标记，不设置过期时间
    async fn set(&self, key: &str, marker: &str) -> Result<(), CacheError>;
}

/// 生成缓存标记：当前本地时间
pub fn access_marker() -> String {
    Local::now().to_rfc3339()
}

/// 基于 Redis 的存在性缓存
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// 连接 Redis
    ///
    /// # Errors
    ///
    /// URL 无效或首次连接失败时返回错误。
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl ExistenceCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, marker: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, marker).await?;
        Ok(())
    }
}
