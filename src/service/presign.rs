use crate::clients::ObjectStore;
use crate::error::AppResult;
use crate::models::{PresignRequest, PresignResponse};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const MIN_EXPIRES_SECS: i64 = 60;
pub const MAX_EXPIRES_SECS: i64 = 3600;

/// 预签名上传服务
pub struct PresignService {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl PresignService {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// 生成 PUT 预签名 URL, key 由 uuid + 原扩展名构成, 无需查重
    pub async fn presign_put(&self, req: &PresignRequest) -> AppResult<PresignResponse> {
        let expires = clamp_expires(req.expires);
        let key = object_key(&req.prefix, &req.filename, Uuid::new_v4());
        let content_type = guess_content_type(&req.filename);

        let url = self
            .store
            .presign_put(&self.bucket, &key, Duration::from_secs(expires))
            .await?;

        tracing::info!("Presigned upload {}/{} ({}s)", self.bucket, key, expires);

        Ok(PresignResponse {
            url,
            bucket: self.bucket.clone(),
            key,
            content_type: content_type.to_string(),
            expires_in: expires,
        })
    }
}

/// 有效期限制在 60s..=3600s
pub fn clamp_expires(expires: i64) -> u64 {
    expires.clamp(MIN_EXPIRES_SECS, MAX_EXPIRES_SECS) as u64
}

/// 只保留最后一段扩展名 (小写)
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// `<prefix>/<uuid><.ext>`, prefix 去掉首尾 `/`, 为空时不带前缀
pub fn object_key(prefix: &str, filename: &str, id: Uuid) -> String {
    let ext = file_extension(filename)
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let prefix = prefix.trim_matches('/');

    if prefix.is_empty() {
        format!("{}{}", id, ext)
    } else {
        format!("{}/{}{}", prefix, id, ext)
    }
}

/// 按扩展名猜测 Content-Type
pub fn guess_content_type(filename: &str) -> &'static str {
    let ext = file_extension(filename).unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}
