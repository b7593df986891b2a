use axum::http::StatusCode;
use thiserror::Error;

/// 服务统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数错误 (400)
    #[error("{0}")]
    Validation(String),

    /// 当日配额用尽 (429)
    #[error("Daily request limit reached")]
    QuotaExceeded,

    /// Textract 调用失败
    #[error("OCR processing error: {0}")]
    Ocr(String),

    /// S3 调用失败
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 启动配置错误
    #[error("Config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// 错误到 HTTP 状态码的映射
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Ocr(_)
            | AppError::Storage(_)
            | AppError::Database(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
