mod composer;
mod error;
mod http;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
mod relay;
mod traits;
mod uploader;

pub use composer::{append_body, create_record};
pub use error::RelayError;
pub use http::{HttpNotionClient, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
pub use relay::{RelayConfig, RelayService, SubmissionOutcome};
pub use traits::{CreatedPage, FileUploadObject, NotionApi, NotionError, UploadDestination};
pub use uploader::{acquire_upload_handle, transfer_bytes, upload_attachments};
