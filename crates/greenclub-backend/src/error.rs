use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response, or its body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-success status. `message` is the
    /// backend's own explanation when it supplied one.
    #[error("{message}")]
    Remote { status: u16, message: String },
    /// A response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    /// A single-row operation matched zero or several rows.
    #[error("Expected exactly one {table} row for '{key}', found {found}")]
    NotFound {
        table: &'static str,
        key: String,
        found: usize,
    },
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        BackendError::Remote { status, message: message.into() }
    }

    /// HTTP status reported by the backend, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Remote { status, .. } => Some(*status),
            BackendError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
