use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the bytes of an upload are sent once a handle has been acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadTarget {
    /// Send to the one-time `upload_url` returned with the handle. A handle
    /// without one is rejected.
    #[default]
    UploadUrl,
    /// Send to the generic `file_uploads/{id}/send` endpoint.
    SendEndpoint,
}

impl UploadTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadTarget::UploadUrl => "upload-url",
            UploadTarget::SendEndpoint => "send-endpoint",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "upload-url" => Some(UploadTarget::UploadUrl),
            "send-endpoint" => Some(UploadTarget::SendEndpoint),
            _ => None,
        }
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-use upload slot issued by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle {
    pub id: String,
    pub upload_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadId {
    pub id: String,
}

/// A completed upload, in the shape the `files` property expects:
/// `{"type": "file_upload", "name": ..., "file_upload": {"id": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReference {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub file_upload: FileUploadId,
}

impl UploadReference {
    pub fn new(name: impl Into<String>, handle_id: impl Into<String>) -> Self {
        Self {
            kind: "file_upload".into(),
            name: name.into(),
            file_upload: FileUploadId { id: handle_id.into() },
        }
    }

    pub fn handle_id(&self) -> &str {
        &self.file_upload.id
    }
}
