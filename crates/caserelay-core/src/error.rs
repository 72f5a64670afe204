use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid content type {content_type:?} for {filename}")]
    InvalidContentType {
        filename: String,
        content_type: String,
    },
}
