use receipt_ocr::clients::{self, ExpenseAnalyzer, ObjectStore, S3ObjectStore, TextractAnalyzer};
use receipt_ocr::config::{QuotaBackend, QuotaConfig};
use receipt_ocr::service::{MemoryUsageCounter, PgUsageCounter, UsageCounter};
use receipt_ocr::{
    create_pool, router, AppConfig, AppResult, AppState, DailyQuota, ExtractService, PresignService,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置 (只在启动时读取一次)
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 创建外部服务客户端
    let sdk_config = clients::load_sdk_config(&config.aws).await;
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(
        &sdk_config,
        config.aws.s3_endpoint_url.as_deref(),
    ));
    let analyzer: Arc<dyn ExpenseAnalyzer> = Arc::new(TextractAnalyzer::new(
        &sdk_config,
        config.aws.textract_endpoint_url.as_deref(),
    ));

    let quota = if config.quota.enabled {
        Some(Arc::new(build_quota(&config).await?))
    } else {
        info!("Daily quota disabled");
        None
    };

    let state = AppState {
        extract: Arc::new(ExtractService::new(analyzer, store.clone())),
        presign: Arc::new(PresignService::new(store, config.aws.bucket.clone())),
        quota,
    };

    let app = router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /upload-url  - presigned upload URL");
    info!("  POST /extract     - itemized bill extraction");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_quota(config: &AppConfig) -> AppResult<DailyQuota> {
    let QuotaConfig {
        backend,
        table,
        daily_limit,
        ..
    } = &config.quota;

    let counter: Arc<dyn UsageCounter> = match backend {
        QuotaBackend::Postgres => {
            let pool = create_pool(&config.database.url).await?;
            let counter = PgUsageCounter::new(pool, table.clone());
            counter.ensure_schema().await?;
            info!("Usage counter table '{}' ready", table);
            Arc::new(counter)
        }
        QuotaBackend::Memory => {
            tracing::warn!("Using in-memory usage counter; limit is per process");
            Arc::new(MemoryUsageCounter::new())
        }
    };

    let quota = DailyQuota::new(counter, *daily_limit);
    info!("Daily quota enabled: {} requests per UTC day", quota.limit());
    Ok(quota)
}
