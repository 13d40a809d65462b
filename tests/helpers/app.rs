use super::db::TestDb;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use virtualcard::settings::{self, Settings};
use virtualcard::web::{self, AppState};

pub const MULTIPART_BOUNDARY: &str = "virtualcard-test-boundary";

/// A router over a fresh database, driven without a listening socket
pub struct TestApp {
    db: TestDb,
    pub settings: Arc<Settings>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_qr_code(settings::QrCode {
            expire_hours: 720,
            width: 250,
            height: 250,
        })
        .await
    }

    pub async fn with_qr_code(qr_code: settings::QrCode) -> Self {
        let settings = Settings {
            qr_code,
            ..Settings::default()
        };
        Self {
            db: TestDb::new().await,
            settings: Arc::new(settings),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.db.connection()
    }

    fn router(&self) -> Router {
        web::router(AppState {
            settings: self.settings.clone(),
            db: self.db.connection().clone(),
        })
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(&self, method: Method, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn call_json(&self, method: Method, uri: &str, body: &Value) -> TestResponse {
        self.call_raw_json(method, uri, body.to_string()).await
    }

    pub async fn call_raw_json(&self, method: Method, uri: &str, body: String) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// POSTs a single multipart file field named `field`
    pub async fn upload(&self, uri: &str, field: &str, bytes: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"card.jpg\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }
}
