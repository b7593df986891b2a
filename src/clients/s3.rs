use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;

/// 对象存储 trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 生成限时可写 (PUT) 的预签名 URL
    async fn presign_put(&self, bucket: &str, key: &str, expires: Duration) -> AppResult<String>;

    /// 删除对象
    async fn delete_object(&self, bucket: &str, key: &str) -> AppResult<()>;
}

/// S3 实现
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &SdkConfig, endpoint_url: Option<&str>) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

        // LocalStack / MinIO 需要 path-style
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, bucket: &str, key: &str, expires: Duration) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires)
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }
}
