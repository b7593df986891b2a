use crate::error::{AppError, AppResult};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 应用配置
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub quota: QuotaConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    /// 上传目标 bucket
    pub bucket: String,
    /// LocalStack / MinIO 等本地端点
    pub s3_endpoint_url: Option<String>,
    pub textract_endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub enabled: bool,
    pub backend: QuotaBackend,
    pub table: String,
    pub daily_limit: i64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl AwsConfig {
    /// 仅当 key id 与 secret 同时存在时返回静态凭证
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}

// 日志中不输出凭证和连接串
impl fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsConfig")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("s3_endpoint_url", &self.s3_endpoint_url)
            .field("textract_endpoint_url", &self.textract_endpoint_url)
            .field("static_credentials", &self.static_credentials().is_some())
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = self
            .url
            .rsplit_once('@')
            .map(|(_, rest)| rest)
            .unwrap_or(self.url.as_str());
        f.debug_struct("DatabaseConfig").field("url", &host).finish()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("server", &self.server)
            .field("aws", &self.aws)
            .field("quota", &self.quota)
            .field("database", &self.database)
            .finish()
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> AppResult<Self> {
        Self::load(Environment::default().try_parsing(true))
    }

    /// 从给定的键值表加载 (键与环境变量同名)
    pub fn from_map(vars: HashMap<String, String>) -> AppResult<Self> {
        Self::load(Environment::default().source(Some(vars)).try_parsing(true))
    }

    fn load(env: Environment) -> AppResult<Self> {
        let settings = Config::builder()
            .set_default("server_host", "127.0.0.1")?
            .set_default("server_port", 8080)?
            .set_default("aws_region", "us-west-2")?
            .set_default("bucket", "")?
            .set_default("quota_enabled", true)?
            .set_default("quota_backend", "postgres")?
            .set_default("usage_table", "api_usage")?
            .set_default("daily_limit", 200)?
            .set_default("database_url", "postgres://localhost/receipt_ocr")?
            .add_source(env)
            .build()?;

        let optional = |key: &str| {
            settings
                .get_string(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
        };

        let bucket = settings.get_string("bucket")?;
        if bucket.trim().is_empty() {
            return Err(AppError::Config("Missing BUCKET env var".to_string()));
        }

        let port = settings.get_int("server_port")?;
        let port = u16::try_from(port)
            .map_err(|_| AppError::Config(format!("Invalid SERVER_PORT: {}", port)))?;

        let backend = match settings.get_string("quota_backend")?.to_lowercase().as_str() {
            "postgres" => QuotaBackend::Postgres,
            "memory" => QuotaBackend::Memory,
            other => {
                return Err(AppError::Config(format!("Unknown QUOTA_BACKEND: {}", other)));
            }
        };

        let table = settings.get_string("usage_table")?;
        if !is_plain_identifier(&table) {
            return Err(AppError::Config(format!("Invalid USAGE_TABLE: {}", table)));
        }

        let daily_limit = settings.get_int("daily_limit")?;
        if daily_limit < 0 {
            return Err(AppError::Config(format!("Invalid DAILY_LIMIT: {}", daily_limit)));
        }

        Ok(Self {
            server: ServerConfig {
                host: settings.get_string("server_host")?,
                port,
            },
            aws: AwsConfig {
                region: settings.get_string("aws_region")?,
                bucket,
                s3_endpoint_url: optional("s3_endpoint_url"),
                textract_endpoint_url: optional("textract_endpoint_url"),
                access_key_id: optional("aws_access_key_id"),
                secret_access_key: optional("aws_secret_access_key"),
            },
            quota: QuotaConfig {
                enabled: settings.get_bool("quota_enabled")?,
                backend,
                table,
                daily_limit,
            },
            database: DatabaseConfig {
                url: settings.get_string("database_url")?,
            },
        })
    }
}

/// 表名会拼进 SQL, 只允许字母/数字/下划线且不以数字开头
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
