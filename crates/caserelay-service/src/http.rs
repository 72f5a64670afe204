use async_trait::async_trait;
use bytes::Bytes;
use caserelay_core::blocks::Block;
use caserelay_core::case::{CaseQuery, QueryResults};
use caserelay_core::PropertyMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::json;

use crate::traits::{CreatedPage, FileUploadObject, NotionApi, NotionError, UploadDestination};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Async HTTP client for the Notion REST API.
/// Every request carries the bearer token and the pinned `Notion-Version`.
pub struct HttpNotionClient {
    base_url: String,
    client: Client,
    api_key: String,
    notion_version: String,
}

impl HttpNotionClient {
    pub fn new(base_url: &str, api_key: String, notion_version: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            api_key,
            notion_version,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header("Notion-Version", self.notion_version.as_str())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, NotionError> {
        let builder = self.client.post(self.url(path)).json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| NotionError::Transport(e.to_string()))?;
        handle_response(resp).await
    }

    async fn patch_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), NotionError> {
        let builder = self.client.patch(self.url(path)).json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| NotionError::Transport(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, NotionError> {
    if resp.status().is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| NotionError::Decode(format!("json decode: {e}")))
    } else {
        Err(parse_error(resp).await)
    }
}

/// Decode a Notion error body (`{"object": "error", "code": ..., "message": ...}`),
/// falling back to the raw body or the status line.
async fn parse_error(resp: reqwest::Response) -> NotionError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
    let code = parsed
        .as_ref()
        .and_then(|v| v["code"].as_str().map(String::from));
    let message = parsed
        .as_ref()
        .and_then(|v| v["message"].as_str().map(String::from))
        .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
        .unwrap_or_else(|| status.to_string());

    NotionError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

#[async_trait]
impl NotionApi for HttpNotionClient {
    async fn create_file_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<FileUploadObject, NotionError> {
        self.post_json(
            "/file_uploads",
            &json!({
                "mode": "single_part",
                "filename": filename,
                "content_type": content_type,
            }),
        )
        .await
    }

    async fn send_file_upload(
        &self,
        destination: UploadDestination<'_>,
        filename: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<FileUploadObject, NotionError> {
        let url = match destination {
            UploadDestination::Url(url) => url.to_string(),
            UploadDestination::SendEndpoint(id) => self.url(&format!("/file_uploads/{id}/send")),
        };
        let len = content.len() as u64;
        let part = Part::stream_with_length(content, len)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| NotionError::InvalidRequest(format!("content type {content_type}: {e}")))?;
        let form = Form::new().part("file", part);

        let builder = self.client.post(url).multipart(form);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| NotionError::Transport(e.to_string()))?;
        handle_response(resp).await
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyMap,
    ) -> Result<CreatedPage, NotionError> {
        self.post_json(
            "/pages",
            &json!({
                "parent": { "database_id": database_id },
                "properties": properties,
            }),
        )
        .await
    }

    async fn append_blocks(&self, block_id: &str, children: &[Block]) -> Result<(), NotionError> {
        self.patch_json(
            &format!("/blocks/{block_id}/children"),
            &json!({ "children": children }),
        )
        .await
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &CaseQuery,
    ) -> Result<QueryResults, NotionError> {
        self.post_json(&format!("/databases/{database_id}/query"), query)
            .await
    }
}
