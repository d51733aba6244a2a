use thiserror::Error;

use greenclub_backend::BackendError;
use greenclub_types::models::Section;

use crate::upload::UploadRejection;

/// A form rule that did not hold. Only the first violated rule is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum AdminError {
    /// Rejected before any backend contact.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Any failure reported by the remote store.
    #[error("{0}")]
    Backend(BackendError),
    /// Zero or several rows where exactly one was expected.
    #[error("{0}")]
    NotFound(String),
    #[error("A save of {0} is already in progress")]
    SaveInFlight(Section),
    #[error("An upload is already in progress")]
    UploadInFlight,
    #[error(transparent)]
    UploadRejected(#[from] UploadRejection),
    /// A destructive action was not confirmed by the user.
    #[error("Deletion was not confirmed")]
    Unconfirmed,
}

impl From<BackendError> for AdminError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound { .. } => AdminError::NotFound(err.to_string()),
            other => AdminError::Backend(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
