use async_trait::async_trait;
use bytes::Bytes;
use caserelay_core::blocks::Block;
use caserelay_core::case::{CaseQuery, QueryResults};
use caserelay_core::PropertyMap;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotionError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status. `message` is taken
    /// from the structured error body when there is one.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request could not be built from the given arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// A file upload object as returned by both the create and send calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileUploadObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub upload_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedPage {
    pub id: String,
}

/// Where a send call delivers the file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDestination<'a> {
    /// The one-time URL returned when the upload was created.
    Url(&'a str),
    /// The generic `file_uploads/{id}/send` endpoint.
    SendEndpoint(&'a str),
}

/// The subset of the Notion REST API the relay talks to.
///
/// `HttpNotionClient` is the production implementation; `mock::MockNotion`
/// records calls for tests.
#[async_trait]
pub trait NotionApi: Send + Sync {
    // -- File uploads --
    async fn create_file_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<FileUploadObject, NotionError>;
    async fn send_file_upload(
        &self,
        destination: UploadDestination<'_>,
        filename: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<FileUploadObject, NotionError>;

    // -- Pages --
    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyMap,
    ) -> Result<CreatedPage, NotionError>;
    async fn append_blocks(&self, block_id: &str, children: &[Block]) -> Result<(), NotionError>;

    // -- Databases --
    async fn query_database(
        &self,
        database_id: &str,
        query: &CaseQuery,
    ) -> Result<QueryResults, NotionError>;
}
