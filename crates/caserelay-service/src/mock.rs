use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use caserelay_core::blocks::Block;
use caserelay_core::case::{CaseQuery, Page, QueryResults};
use caserelay_core::PropertyMap;
use serde_json::Value;

use crate::traits::{CreatedPage, FileUploadObject, NotionApi, NotionError, UploadDestination};

/// One observed call against [`MockNotion`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateFileUpload {
        filename: String,
        content_type: String,
    },
    /// `destination` is the upload URL, or `endpoint:<id>` for the send endpoint.
    SendFileUpload {
        destination: String,
        filename: String,
        content_type: String,
        size: usize,
    },
    CreatePage {
        database_id: String,
        properties: Value,
    },
    AppendBlocks {
        block_id: String,
        children: usize,
    },
    QueryDatabase {
        database_id: String,
        contains: String,
    },
}

/// An in-memory Notion stand-in that records every call and fails on demand.
pub struct MockNotion {
    calls: Mutex<Vec<Call>>,
    handles: Mutex<HashMap<String, String>>,
    upload_counter: AtomicU64,
    page_counter: AtomicU64,
    omit_upload_url: bool,
    omit_upload_id: bool,
    empty_upload_id: bool,
    slot_fail: Option<String>,
    transfer_fail: Option<String>,
    transfer_status: String,
    transfer_delays: HashMap<String, Duration>,
    page_fail: bool,
    append_fail: bool,
    query_fail: bool,
    pages: Vec<Value>,
}

impl Default for MockNotion {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotion {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handles: Mutex::new(HashMap::new()),
            upload_counter: AtomicU64::new(1),
            page_counter: AtomicU64::new(1),
            omit_upload_url: false,
            omit_upload_id: false,
            empty_upload_id: false,
            slot_fail: None,
            transfer_fail: None,
            transfer_status: "uploaded".into(),
            transfer_delays: HashMap::new(),
            page_fail: false,
            append_fail: false,
            query_fail: false,
            pages: Vec::new(),
        }
    }

    /// Issue upload slots without an `upload_url`.
    pub fn without_upload_url(mut self) -> Self {
        self.omit_upload_url = true;
        self
    }

    /// Issue upload slots with no `id` at all.
    pub fn without_upload_id(mut self) -> Self {
        self.omit_upload_id = true;
        self
    }

    /// Issue upload slots whose `id` is an empty string.
    pub fn with_empty_upload_id(mut self) -> Self {
        self.empty_upload_id = true;
        self
    }

    pub fn with_slot_failure(mut self, filename: &str) -> Self {
        self.slot_fail = Some(filename.into());
        self
    }

    pub fn with_transfer_failure(mut self, filename: &str) -> Self {
        self.transfer_fail = Some(filename.into());
        self
    }

    /// Status reported by every send call (default `uploaded`).
    pub fn with_transfer_status(mut self, status: &str) -> Self {
        self.transfer_status = status.into();
        self
    }

    pub fn with_transfer_delay(mut self, filename: &str, delay: Duration) -> Self {
        self.transfer_delays.insert(filename.into(), delay);
        self
    }

    pub fn with_page_failure(mut self) -> Self {
        self.page_fail = true;
        self
    }

    pub fn with_append_failure(mut self) -> Self {
        self.append_fail = true;
        self
    }

    pub fn with_query_failure(mut self) -> Self {
        self.query_fail = true;
        self
    }

    /// Raw page objects returned by every database query.
    pub fn with_pages(mut self, pages: Vec<Value>) -> Self {
        self.pages = pages;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The upload handle id issued for `filename`, if any.
    pub fn handle_for(&self, filename: &str) -> Option<String> {
        self.handles.lock().unwrap().get(filename).cloned()
    }

    pub fn upload_slot_count(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateFileUpload { .. }))
    }

    pub fn transfer_count(&self) -> usize {
        self.count(|c| matches!(c, Call::SendFileUpload { .. }))
    }

    pub fn create_page_count(&self) -> usize {
        self.count(|c| matches!(c, Call::CreatePage { .. }))
    }

    pub fn query_count(&self) -> usize {
        self.count(|c| matches!(c, Call::QueryDatabase { .. }))
    }

    /// Properties sent with the most recent page creation.
    pub fn last_page_properties(&self) -> Option<Value> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::CreatePage { properties, .. } => Some(properties),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn api_error(status: u16, message: String) -> NotionError {
        NotionError::Api {
            status,
            code: Some("mock_error".into()),
            message,
        }
    }
}

#[async_trait]
impl NotionApi for MockNotion {
    async fn create_file_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<FileUploadObject, NotionError> {
        self.record(Call::CreateFileUpload {
            filename: filename.into(),
            content_type: content_type.into(),
        });
        if self.slot_fail.as_deref() == Some(filename) {
            return Err(Self::api_error(
                400,
                format!("mock slot failure for {filename}"),
            ));
        }

        let id = format!("fu-{}", self.upload_counter.fetch_add(1, Ordering::SeqCst));
        self.handles
            .lock()
            .unwrap()
            .insert(filename.into(), id.clone());
        let upload_url = (!self.omit_upload_url).then(|| format!("https://uploads.mock/{id}/send"));
        let id = if self.omit_upload_id {
            None
        } else if self.empty_upload_id {
            Some(String::new())
        } else {
            Some(id)
        };
        Ok(FileUploadObject {
            id,
            upload_url,
            status: Some("pending".into()),
        })
    }

    async fn send_file_upload(
        &self,
        destination: UploadDestination<'_>,
        filename: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<FileUploadObject, NotionError> {
        if let Some(delay) = self.transfer_delays.get(filename) {
            tokio::time::sleep(*delay).await;
        }
        let (destination, id) = match destination {
            UploadDestination::Url(url) => (
                url.to_string(),
                url.trim_start_matches("https://uploads.mock/")
                    .trim_end_matches("/send")
                    .to_string(),
            ),
            UploadDestination::SendEndpoint(id) => (format!("endpoint:{id}"), id.to_string()),
        };
        self.record(Call::SendFileUpload {
            destination,
            filename: filename.into(),
            content_type: content_type.into(),
            size: content.len(),
        });
        if self.transfer_fail.as_deref() == Some(filename) {
            return Err(Self::api_error(
                400,
                format!("mock transfer failure for {filename}"),
            ));
        }
        Ok(FileUploadObject {
            id: Some(id),
            upload_url: None,
            status: Some(self.transfer_status.clone()),
        })
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyMap,
    ) -> Result<CreatedPage, NotionError> {
        self.record(Call::CreatePage {
            database_id: database_id.into(),
            properties: serde_json::to_value(properties)
                .map_err(|e| NotionError::Decode(e.to_string()))?,
        });
        if self.page_fail {
            return Err(Self::api_error(
                400,
                "mock page creation failure".into(),
            ));
        }
        let n = self.page_counter.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedPage {
            id: format!("page-{n}"),
        })
    }

    async fn append_blocks(&self, block_id: &str, children: &[Block]) -> Result<(), NotionError> {
        self.record(Call::AppendBlocks {
            block_id: block_id.into(),
            children: children.len(),
        });
        if self.append_fail {
            return Err(Self::api_error(500, "mock append failure".into()));
        }
        Ok(())
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &CaseQuery,
    ) -> Result<QueryResults, NotionError> {
        self.record(Call::QueryDatabase {
            database_id: database_id.into(),
            contains: query.filter.title.contains.clone(),
        });
        if self.query_fail {
            return Err(Self::api_error(401, "API token is invalid.".into()));
        }
        let results = self
            .pages
            .iter()
            .cloned()
            .map(serde_json::from_value::<Page>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NotionError::Decode(e.to_string()))?;
        Ok(QueryResults { results })
    }
}
