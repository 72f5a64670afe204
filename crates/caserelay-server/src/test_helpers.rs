use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use caserelay_core::UploadTarget;
use caserelay_service::mock::MockNotion;
use caserelay_service::{RelayConfig, RelayService};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::routes::{build_router, HttpSettings};

pub const TEST_DASHBOARD_ID: &str = "dashboard-db";
pub const TEST_CASE_DB_ID: &str = "case-db";
pub const MULTIPART_BOUNDARY: &str = "caserelay-test-boundary";

pub fn test_relay_config() -> RelayConfig {
    RelayConfig {
        dashboard_id: TEST_DASHBOARD_ID.into(),
        case_db_id: TEST_CASE_DB_ID.into(),
        upload_target: UploadTarget::UploadUrl,
        parallel_uploads: false,
    }
}

pub fn test_http_settings() -> HttpSettings {
    HttpSettings {
        cors_origins: vec!["http://localhost:3000".into()],
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
    }
}

/// Build a router backed by a fresh `MockNotion`, returning both.
pub fn test_router() -> (Router, Arc<MockNotion>) {
    test_router_with(MockNotion::new())
}

pub fn test_router_with(mock: MockNotion) -> (Router, Arc<MockNotion>) {
    let mock = Arc::new(mock);
    let relay = RelayService::new(mock.clone(), test_relay_config());
    (build_router(relay, &test_http_settings()), mock)
}

/// Read a response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Encode text fields and `files` parts as a multipart body delimited by
/// [`MULTIPART_BOUNDARY`]. Files are `(filename, content_type, bytes)`.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (filename, content_type, content) in files {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Serve `app` on a random local port.
pub async fn spawn_router(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
