//! An in-process stand-in for the Notion REST API.
//!
//! It checks the bearer token and `Notion-Version` header on every call,
//! records what it received, and answers with Notion-shaped bodies.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const FAKE_API_KEY: &str = "secret_fake_token";
pub const FAKE_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub enum Recorded {
    CreateUpload(Value),
    Send {
        upload_id: String,
        filename: String,
        content_type: String,
        content: Vec<u8>,
    },
    CreatePage(Value),
    Append {
        block_id: String,
        body: Value,
    },
    Query {
        database_id: String,
        body: Value,
    },
}

#[derive(Debug, Default)]
pub struct FakeOptions {
    /// Reject the send call for this filename.
    pub fail_upload_named: Option<String>,
    /// Pages returned from database queries, filtered by title.
    pub cases: Vec<(String, String)>,
}

pub struct FakeNotion {
    pub base_url: String,
    options: FakeOptions,
    recorded: Mutex<Vec<Recorded>>,
}

type FakeState = Arc<FakeNotion>;
type FakeError = (StatusCode, Json<Value>);

impl FakeNotion {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    fn record(&self, r: Recorded) {
        self.recorded.lock().unwrap().push(r);
    }
}

fn notion_error(status: StatusCode, code: &str, message: &str) -> FakeError {
    (
        status,
        Json(json!({
            "object": "error",
            "status": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
}

fn check_auth(headers: &HeaderMap) -> Result<(), FakeError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != format!("Bearer {FAKE_API_KEY}") {
        return Err(notion_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "API token is invalid.",
        ));
    }
    let version = headers
        .get("notion-version")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if version != FAKE_VERSION {
        return Err(notion_error(
            StatusCode::BAD_REQUEST,
            "missing_version",
            "Notion-Version header failed validation.",
        ));
    }
    Ok(())
}

async fn create_upload(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, FakeError> {
    check_auth(&headers)?;
    state.record(Recorded::CreateUpload(body));
    let id = uuid::Uuid::new_v4().to_string();
    Ok(Json(json!({
        "object": "file_upload",
        "id": id,
        "status": "pending",
        "upload_url": format!("{}/file_uploads/{id}/send", state.base_url),
    })))
}

async fn send_upload(
    State(state): State<FakeState>,
    Path(upload_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, FakeError> {
    check_auth(&headers)?;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        notion_error(StatusCode::BAD_REQUEST, "validation_error", &e.body_text())
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(|e| {
            notion_error(StatusCode::BAD_REQUEST, "validation_error", &e.body_text())
        })?;
        state.record(Recorded::Send {
            upload_id: upload_id.clone(),
            filename: filename.clone(),
            content_type,
            content: content.to_vec(),
        });
        if state.options.fail_upload_named.as_deref() == Some(filename.as_str()) {
            return Err(notion_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "The file upload could not be completed.",
            ));
        }
        return Ok(Json(json!({
            "object": "file_upload",
            "id": upload_id,
            "status": "uploaded",
            "filename": filename,
        })));
    }
    Err(notion_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "No file part in request.",
    ))
}

async fn create_page(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, FakeError> {
    check_auth(&headers)?;
    state.record(Recorded::CreatePage(body));
    Ok(Json(json!({
        "object": "page",
        "id": uuid::Uuid::new_v4().to_string(),
    })))
}

async fn append_children(
    State(state): State<FakeState>,
    Path(block_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, FakeError> {
    check_auth(&headers)?;
    state.record(Recorded::Append { block_id, body });
    Ok(Json(json!({ "object": "list", "results": [] })))
}

async fn query_database(
    State(state): State<FakeState>,
    Path(database_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, FakeError> {
    check_auth(&headers)?;
    let needle = body["filter"]["title"]["contains"]
        .as_str()
        .unwrap_or_default()
        .to_lowercase();
    state.record(Recorded::Query { database_id, body });

    let results: Vec<Value> = state
        .options
        .cases
        .iter()
        .filter(|(_, title)| title.to_lowercase().contains(&needle))
        .map(|(id, title)| {
            json!({
                "object": "page",
                "id": id,
                "properties": {
                    "File Name": { "type": "title", "title": [{ "plain_text": title }] }
                }
            })
        })
        .collect();
    Ok(Json(json!({ "object": "list", "results": results, "has_more": false })))
}

/// Start a fake Notion API on a random local port.
pub async fn spawn_fake_notion(options: FakeOptions) -> Arc<FakeNotion> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(FakeNotion {
        base_url: format!("http://{addr}/v1"),
        options,
        recorded: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1/file_uploads", post(create_upload))
        .route("/v1/file_uploads/{id}/send", post(send_upload))
        .route("/v1/pages", post(create_page))
        .route("/v1/blocks/{id}/children", patch(append_children))
        .route("/v1/databases/{id}/query", post(query_database))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    state
}
