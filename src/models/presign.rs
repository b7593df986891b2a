use serde::Serialize;

pub const DEFAULT_FILENAME: &str = "upload.bin";
pub const DEFAULT_PREFIX: &str = "receipts";
pub const DEFAULT_EXPIRES: i64 = 300;

/// 预签名上传请求 (来自 query string)
#[derive(Debug, Clone, PartialEq)]
pub struct PresignRequest {
    pub filename: String,
    pub prefix: String,
    pub expires: i64,
}

impl Default for PresignRequest {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            expires: DEFAULT_EXPIRES,
        }
    }
}

/// 预签名上传响应
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub url: String,
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub expires_in: u64,
}
