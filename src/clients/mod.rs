//! 外部服务客户端: 启动时构建一次, 以 `Arc<dyn Trait>` 注入到各服务

pub mod s3;
pub mod textract;

use crate::config::AwsConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;

pub use s3::{ObjectStore, S3ObjectStore};
pub use textract::{ExpenseAnalyzer, TextractAnalyzer};

/// 加载共享 AWS 配置 (区域 + 可选静态凭证)
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let Some((id, secret)) = config.static_credentials() {
        loader = loader.credentials_provider(Credentials::new(id, secret, None, None, "receipt-ocr-env"));
    }

    loader.load().await
}
