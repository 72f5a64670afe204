use bytes::Bytes;
use serde::Deserialize;

use crate::error::ValidationError;

/// Content type used when a client does not declare one for an attachment.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file attached to a submission, held in memory for the duration of the request.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            content,
        }
    }

    /// The declared content type, or `application/octet-stream` when absent or blank.
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// One incoming task/email submission.
///
/// JSON bodies use the camelCase keys below. Multipart bodies use the same
/// names for text fields and `files` for attachments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub linked_case: Option<String>,
    #[serde(default)]
    pub email_body: Option<String>,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl TaskSubmission {
    /// Reject submissions without a subject, or with an attachment whose
    /// declared content type does not parse as a media type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::MissingField("fileName (email subject)"));
        }
        for attachment in &self.attachments {
            let content_type = attachment.content_type();
            if content_type.parse::<mime::Mime>().is_err() {
                return Err(ValidationError::InvalidContentType {
                    filename: attachment.filename.clone(),
                    content_type: content_type.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn date(&self) -> Option<&str> {
        supplied(&self.date)
    }

    pub fn link(&self) -> Option<&str> {
        supplied(&self.link)
    }

    pub fn message_id(&self) -> Option<&str> {
        supplied(&self.message_id)
    }

    pub fn linked_case(&self) -> Option<&str> {
        supplied(&self.linked_case)
    }

    pub fn email_body(&self) -> Option<&str> {
        supplied(&self.email_body)
    }

    /// Assign a text field by its wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "fileName" => self.file_name = value,
            "date" => self.date = Some(value),
            "link" => self.link = Some(value),
            "messageId" => self.message_id = Some(value),
            "linkedCase" => self.linked_case = Some(value),
            "emailBody" => self.email_body = Some(value),
            _ => return false,
        }
        true
    }
}

/// An optional field counts as supplied only when it holds non-blank text.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
