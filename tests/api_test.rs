use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use receipt_ocr::clients::{ExpenseAnalyzer, ObjectStore};
use receipt_ocr::models::{ExpenseAnalysis, ExpenseDocument, ExpenseField, LineItem, LineItemGroup};
use receipt_ocr::service::MemoryUsageCounter;
use receipt_ocr::{
    router, AppError, AppResult, AppState, DailyQuota, ExtractService, PresignService,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// 固定返回一张票据: TOTAL=$12.34, 明细 Soda $1.50
struct FakeTextract {
    fail: bool,
}

#[async_trait]
impl ExpenseAnalyzer for FakeTextract {
    async fn analyze_expense(&self, _bucket: &str, _key: &str) -> AppResult<ExpenseAnalysis> {
        if self.fail {
            return Err(AppError::Ocr("UnsupportedDocumentException".into()));
        }
        Ok(ExpenseAnalysis {
            documents: vec![ExpenseDocument {
                summary_fields: vec![ExpenseField::new("TOTAL", "$12.34")],
                line_item_groups: vec![LineItemGroup {
                    line_items: vec![LineItem::from_pairs(&[("ITEM", "Soda"), ("PRICE", "$1.50")])],
                }],
            }],
        })
    }
}

#[derive(Default)]
struct FakeS3 {
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for FakeS3 {
    async fn presign_put(&self, bucket: &str, key: &str, expires: Duration) -> AppResult<String> {
        Ok(format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires.as_secs()
        ))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> AppResult<()> {
        self.deleted.lock().unwrap().push(format!("{}/{}", bucket, key));
        Ok(())
    }
}

struct TestApp {
    app: Router,
    s3: Arc<FakeS3>,
}

fn test_app(ocr_fails: bool, daily_limit: Option<i64>) -> TestApp {
    let s3 = Arc::new(FakeS3::default());
    let state = AppState {
        extract: Arc::new(ExtractService::new(
            Arc::new(FakeTextract { fail: ocr_fails }),
            s3.clone(),
        )),
        presign: Arc::new(PresignService::new(s3.clone(), "receipts-bucket")),
        quota: daily_limit
            .map(|limit| Arc::new(DailyQuota::new(Arc::new(MemoryUsageCounter::new()), limit))),
    };
    TestApp {
        app: router(state),
        s3,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn post_extract(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn extract_returns_itemized_bill() {
    let t = test_app(false, None);

    let (status, headers, body) = send(&t.app, post_extract(r#"{"bucket":"b","key":"k"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");

    assert_eq!(body["title"], "Receipt");
    assert_eq!(body["tax"], 0.0);
    assert_eq!(body["subtotal"], 0.0);
    assert_eq!(body["total"], 12.34);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Soda");
    assert_eq!(items[0]["unit_price"], 1.5);
    assert_eq!(items[0]["qty"], 1.0);
    assert!(uuid::Uuid::parse_str(items[0]["id"].as_str().unwrap()).is_ok());

    assert_eq!(*t.s3.deleted.lock().unwrap(), vec!["b/k".to_string()]);
}

#[tokio::test]
async fn extract_rejects_missing_fields() {
    let t = test_app(false, None);

    let (status, _, body) = send(&t.app, post_extract(r#"{"bucket":"b"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: bucket and key");
    assert!(t.s3.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn extract_rejects_malformed_json() {
    let t = test_app(false, None);

    let (status, _, body) = send(&t.app, post_extract("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn extract_upstream_failure_is_500() {
    let t = test_app(true, None);

    let (status, _, body) = send(&t.app, post_extract(r#"{"bucket":"b","key":"k"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "OCR processing error: UnsupportedDocumentException"
    );
    assert!(t.s3.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_url_clamps_and_lowercases_extension() {
    let t = test_app(false, None);

    let (status, _, body) = send(&t.app, get("/upload-url?filename=receipt.PDF&expires=10")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bucket"], "receipts-bucket");
    assert_eq!(body["expiresIn"], 60);
    assert_eq!(body["contentType"], "application/pdf");

    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with("receipts/"));
    assert!(key.ends_with(".pdf"));
    assert!(body["url"].as_str().unwrap().contains(key));
}

#[tokio::test]
async fn upload_url_uses_defaults() {
    let t = test_app(false, None);

    let (status, _, body) = send(&t.app, get("/upload-url")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expiresIn"], 300);
    assert_eq!(body["contentType"], "application/octet-stream");
    assert!(body["key"].as_str().unwrap().ends_with(".bin"));
}

#[tokio::test]
async fn upload_url_max_expiry() {
    let t = test_app(false, None);

    let (_, _, body) = send(&t.app, get("/upload-url?expires=99999&prefix=")).await;

    assert_eq!(body["expiresIn"], 3600);
    assert!(!body["key"].as_str().unwrap().contains('/'));
}

#[tokio::test]
async fn upload_url_bad_expires_is_400() {
    let t = test_app(false, None);

    let (status, _, body) = send(&t.app, get("/upload-url?expires=later")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid expires: later");
}

#[tokio::test]
async fn upload_url_enforces_daily_quota() {
    let t = test_app(false, Some(2));

    for _ in 0..2 {
        let (status, _, _) = send(&t.app, get("/upload-url?filename=a.jpg")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = send(&t.app, get("/upload-url?filename=a.jpg")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Daily request limit reached");
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
}

#[tokio::test]
async fn preflight_returns_cors_headers() {
    let t = test_app(false, None);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/extract")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        headers.get("access-control-allow-headers").unwrap(),
        "Content-Type, Authorization"
    );
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn health_check_ok() {
    let t = test_app(false, None);

    let response = t.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}
