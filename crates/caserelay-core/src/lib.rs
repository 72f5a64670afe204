pub mod blocks;
pub mod case;
pub mod error;
pub mod properties;
pub mod submission;
pub mod upload;

pub use error::ValidationError;
pub use properties::{PropertyMap, PropertyValue};
pub use submission::{Attachment, TaskSubmission};
pub use upload::{UploadHandle, UploadReference, UploadTarget};
