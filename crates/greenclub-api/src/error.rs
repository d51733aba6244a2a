use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::task::JoinError;
use tracing::error;

use greenclub_admin::upload::UploadRejection;
use greenclub_admin::{AdminError, Notices};
use greenclub_backend::BackendError;
use greenclub_types::api::ErrorBody;
use greenclub_types::models::Notice;

/// JSON error response: `{ "error": ..., "notices": [...] }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub notices: Vec<Notice>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), notices: Vec::new() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Attach whatever the operation told the user.
    pub fn with_notices(mut self, notices: &Notices) -> Self {
        self.notices.extend(notices.take());
        self
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        let status = match &err {
            AdminError::Validation(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::SaveInFlight(_) | AdminError::UploadInFlight => StatusCode::CONFLICT,
            AdminError::UploadRejected(UploadRejection::TooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AdminError::UploadRejected(UploadRejection::NotAnImage) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdminError::Unconfirmed => StatusCode::PRECONDITION_REQUIRED,
            AdminError::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        AdminError::from(err).into()
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        error!("Admin task failed: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody { error: self.message, notices: self.notices }),
        )
            .into_response()
    }
}
