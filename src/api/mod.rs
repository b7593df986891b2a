pub mod handlers;
pub mod response;

pub use handlers::*;
pub use response::ApiResponse;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/upload-url", get(upload_url).options(preflight))
        .route("/extract", post(extract).options(preflight))
        .layer(ServiceBuilder::new())
        .with_state(state)
}
