use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::models::presign::{DEFAULT_EXPIRES, DEFAULT_FILENAME, DEFAULT_PREFIX};
use crate::models::{PresignRequest, PresignResponse};
use crate::service::{DailyQuota, ExtractService, PresignService};
use axum::{
    body::Bytes,
    extract::{Query, State},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// 共享状态: 启动时构建一次的各服务
#[derive(Clone)]
pub struct AppState {
    pub extract: Arc<ExtractService>,
    pub presign: Arc<PresignService>,
    /// 未启用配额时为 None
    pub quota: Option<Arc<DailyQuota>>,
}

/// 请求体: 待识别对象位置
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub bucket: String,
    pub key: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// CORS 预检
pub async fn preflight() -> ApiResponse {
    ApiResponse::no_content()
}

/// 票据识别接口
pub async fn extract(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let req = match parse_extract_request(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::info!("Rejected extract request: {}", e);
            return e.into();
        }
    };

    tracing::info!("Extract request for {}/{}", req.bucket, req.key);
    match state.extract.extract(&req.bucket, &req.key).await {
        Ok(bill) => ApiResponse::ok(&bill),
        Err(e) => e.into(),
    }
}

/// 预签名上传 URL 接口 (受每日配额限制)
pub async fn upload_url(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResponse {
    match issue_upload_url(&state, &params).await {
        Ok(res) => ApiResponse::ok(&res),
        Err(e) => e.into(),
    }
}

async fn issue_upload_url(
    state: &AppState,
    params: &HashMap<String, String>,
) -> AppResult<PresignResponse> {
    let req = parse_presign_request(params)?;

    if let Some(quota) = &state.quota {
        if !quota.enforce_daily_limit().await? {
            return Err(AppError::QuotaExceeded);
        }
    }

    tracing::info!("Upload URL request for {} under '{}'", req.filename, req.prefix);
    state.presign.presign_put(&req).await
}

/// 解析 `{bucket, key}`; 空请求体按 `{}` 处理
pub fn parse_extract_request(body: &[u8]) -> AppResult<ExtractRequest> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid JSON: {}", e)))?
    };

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match (field("bucket"), field("key")) {
        (Some(bucket), Some(key)) => Ok(ExtractRequest { bucket, key }),
        _ => Err(AppError::validation("Missing required fields: bucket and key")),
    }
}

/// 解析 `filename` / `prefix` / `expires` 查询参数, 缺省时取默认值
pub fn parse_presign_request(params: &HashMap<String, String>) -> AppResult<PresignRequest> {
    let expires = match params.get("expires") {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::validation(format!("Invalid expires: {}", raw)))?,
        None => DEFAULT_EXPIRES,
    };

    Ok(PresignRequest {
        filename: params
            .get("filename")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        prefix: params
            .get("prefix")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        expires,
    })
}
