use caserelay_core::ValidationError;
use thiserror::Error;

/// Everything that can go wrong while relaying a submission or a search.
///
/// Display strings are what the caller sees in the `message` field, so the
/// downstream variants carry the remote service's own message when it gave one.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    UploadSlot(String),

    #[error("{0}")]
    UploadTransfer(String),

    #[error("{0}")]
    RecordCreation(String),

    #[error("{0}")]
    ContentAppend(String),

    #[error("{0}")]
    Search(String),
}

impl RelayError {
    /// Whether the caller, rather than a downstream service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::Validation(_))
    }
}
