use crate::handlers::constants::SIGNED_URL_SCHEME;
use crate::utils::deadline::SIGNED_URL_VALIDITY_SECS;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use cached::proc_macro::cached;
use mockall::automock;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};
use thiserror::Error;

/// 对象存储访问错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to sign url: {0}")]
    Presign(String),
}

/// 对象元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    /// 对象大小（字节）
    pub size: u64,
}

/// 对象存储接口
#[automock]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 查询对象元数据，对象不存在时返回 [`StorageError::NotFound`]
    async fn stat(&self, key: &str) -> Result<ObjectInfo, StorageError>;

    /// 生成在 `deadline`（Unix 秒）前有效的签名地址
    ///
    /// 返回值只包含路径和查询串（如 `/key?X-Amz-...`），由调用方拼接访问域名。
    async fn make_signed_url(&self, key: &str, deadline: i64) -> Result<String, StorageError>;
}

/// 计算签名客户端使用的端点，使签名中的 host 与访问域名一致
///
/// 路径风格下直接使用访问域名；虚拟主机风格下 SDK 会在端点前加上 `<bucket>.`，
/// 因此访问域名必须以 `<bucket>.` 开头，端点取其余部分。
///
/// # 示例
///
/// ```
/// use redirect_gateway::utils::s3::signing_endpoint;
///
/// assert_eq!(signing_endpoint("cdn.test", "assets", true).unwrap(), "http://cdn.test");
/// assert_eq!(signing_endpoint("assets.cdn.test", "assets", false).unwrap(), "http://cdn.test");
/// assert!(signing_endpoint("cdn.test", "assets", false).is_err());
/// ```
pub fn signing_endpoint(
    domain: &str,
    bucket: &str,
    force_path_style: bool,
) -> Result<String, StorageError> {
    if force_path_style {
        return Ok(format!("{}{}", SIGNED_URL_SCHEME, domain));
    }

    domain
        .strip_prefix(bucket)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("{}{}", SIGNED_URL_SCHEME, rest))
        .ok_or_else(|| {
            StorageError::Presign(format!(
                "content domain {} must start with \"{}.\" for virtual-hosted style",
                domain, bucket
            ))
        })
}

/// 基于 S3 的对象存储
///
/// `client` 用于查询元数据；`signer` 的端点指向访问域名，只用于生成签名地址。
#[derive(Clone)]
pub struct S3Storage {
    client: Arc<Client>,
    signer: Arc<Client>,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: Arc<Client>, signer: Arc<Client>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            signer,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn stat(&self, key: &str) -> Result<ObjectInfo, StorageError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(DisplayErrorContext(&e).to_string())
                }
            })?;

        let size = output.content_length().unwrap_or_default().max(0) as u64;
        Ok(ObjectInfo { size })
    }

    async fn make_signed_url(&self, key: &str, deadline: i64) -> Result<String, StorageError> {
        let url = presign_get_object(self.signer.clone(), &self.bucket, key, deadline).await?;
        signed_path(&url)
    }
}

/// 为对象生成在 `deadline` 过期的预签名 GET 地址。
///
/// 签名时间固定为 `deadline` 前一天，因此同一天内对同一对象的签名结果完全相同，
/// 可以直接缓存。
///
/// # Errors
///
/// 截止时间不合法或签名失败时返回错误。
#[cached(
    key = "String",
    convert = r#"{ format!("{}:{}:{}", bucket_name, object, deadline) }"#,
    size = 8192, // 8 * 1024 最大容量
    result = true
)]
async fn presign_get_object(
    s3_client: Arc<Client>,
    bucket_name: &str,
    object: &str,
    deadline: i64,
) -> Result<String, StorageError> {
    let start = deadline - SIGNED_URL_VALIDITY_SECS;
    let start_time = u64::try_from(start)
        .map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
        .map_err(|e| StorageError::Presign(e.to_string()))?;

    let presigning_config = PresigningConfig::builder()
        .start_time(start_time)
        .expires_in(Duration::from_secs(SIGNED_URL_VALIDITY_SECS as u64))
        .build()
        .map_err(|e| StorageError::Presign(e.to_string()))?;

    let presigned_request = s3_client
        .get_object()
        .bucket(bucket_name)
        .key(object)
        .presigned(presigning_config)
        .await
        .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

    Ok(presigned_request.uri().to_string())
}

/// 取出完整 URL 中的路径和查询串
fn signed_path(url: &str) -> Result<String, StorageError> {
    let uri: http::Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| StorageError::Presign(e.to_string()))?;

    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .ok_or_else(|| StorageError::Presign(format!("no path in signed url: {}", url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
    use std::time::SystemTime;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn unix_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }

    fn test_client(endpoint: &str, force_path_style: bool) -> Arc<Client> {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("ak", "sk", None, None, "test"))
            .endpoint_url(endpoint)
            .force_path_style(force_path_style)
            .build();
        Arc::new(Client::from_conf(config))
    }

    fn test_storage(endpoint: &str) -> S3Storage {
        let client = test_client(endpoint, true);
        S3Storage::new(client.clone(), client, "bucket")
    }

    /// 按访问域名构造签名客户端
    fn content_storage(domain: &str, force_path_style: bool) -> S3Storage {
        let endpoint = signing_endpoint(domain, "bucket", force_path_style).unwrap();
        S3Storage::new(
            test_client("http://127.0.0.1:9000", true),
            test_client(&endpoint, force_path_style),
            "bucket",
        )
    }

    #[test]
    fn test_signed_path() {
        let result = signed_path("https://cdn.example.com/a/b.txt?X-Amz-Expires=86400");
        assert_eq!(result.unwrap(), "/a/b.txt?X-Amz-Expires=86400");

        assert_err!(signed_path("not a url with spaces"));
    }

    #[tokio::test]
    async fn test_stat_existing_object() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/bucket/docs/report.pdf"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-length", "1234"))
            .expect(1)
            .mount(&server)
            .await;

        let storage = test_storage(&server.uri());
        let info = assert_ok!(storage.stat("docs/report.pdf").await);
        assert_eq!(info.size, 1234);
    }

    #[tokio::test]
    async fn test_stat_missing_object() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/bucket/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let storage = test_storage(&server.uri());
        let result = storage.stat("missing").await;
        assert!(matches!(result, Err(StorageError::NotFound(key)) if key == "missing"));
    }

    #[tokio::test]
    async fn test_make_signed_url() {
        let storage = test_storage("http://127.0.0.1:9000");
        let deadline = unix_now() + 3600;

        let signed = assert_ok!(storage.make_signed_url("photos/cat.jpg", deadline).await);
        assert!(signed.starts_with("/bucket/photos/cat.jpg?"));
        assert!(signed.contains("X-Amz-Signature"));
        assert!(signed.contains("X-Amz-Expires=86400"));
    }

    #[tokio::test]
    async fn test_make_signed_url_is_stable_within_a_day() {
        let storage = test_storage("http://127.0.0.1:9000");
        let deadline = unix_now() + 7200;

        let first = assert_ok!(storage.make_signed_url("stable.txt", deadline).await);
        let second = assert_ok!(storage.make_signed_url("stable.txt", deadline).await);
        assert_eq!(first, second);
    }

    #[test]
    fn test_signing_endpoint() {
        assert_eq!(
            signing_endpoint("static.example.com", "bucket", true).unwrap(),
            "http://static.example.com"
        );
        assert_eq!(
            signing_endpoint("bucket.static.example.com", "bucket", false).unwrap(),
            "http://static.example.com"
        );

        // 虚拟主机风格下域名必须以存储桶名开头
        assert_err!(signing_endpoint("static.example.com", "bucket", false));
        assert_err!(signing_endpoint("bucketstatic.example.com", "bucket", false));
        assert_err!(signing_endpoint("bucket.", "bucket", false));
    }

    #[tokio::test]
    async fn test_signature_is_bound_to_content_domain_path_style() {
        let storage = content_storage("static.example.com", true);
        let deadline = unix_now() + 3600;

        let url = assert_ok!(
            presign_get_object(storage.signer.clone(), "bucket", "path-style/a.jpg", deadline)
                .await
        );
        let uri: http::Uri = url.parse().unwrap();
        assert_eq!(uri.authority().unwrap().as_str(), "static.example.com");
        assert_eq!(uri.path(), "/bucket/path-style/a.jpg");
        assert!(url.contains("X-Amz-SignedHeaders=host"));

        let signed = assert_ok!(storage.make_signed_url("path-style/a.jpg", deadline).await);
        assert_eq!(signed, uri.path_and_query().unwrap().as_str());
    }

    #[tokio::test]
    async fn test_signature_is_bound_to_content_domain_virtual_hosted() {
        let storage = content_storage("bucket.static.example.com", false);
        let deadline = unix_now() + 3600;

        let url = assert_ok!(
            presign_get_object(storage.signer.clone(), "bucket", "virtual/b.jpg", deadline).await
        );
        let uri: http::Uri = url.parse().unwrap();
        assert_eq!(uri.authority().unwrap().as_str(), "bucket.static.example.com");
        assert_eq!(uri.path(), "/virtual/b.jpg");
        assert!(url.contains("X-Amz-SignedHeaders=host"));
    }

    #[tokio::test]
    async fn test_make_signed_url_rejects_negative_deadline() {
        let storage = test_storage("http://127.0.0.1:9000");
        assert_err!(storage.make_signed_url("a", 0).await);
    }
}
