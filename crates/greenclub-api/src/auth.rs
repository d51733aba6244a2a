use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use greenclub_admin::{AdminError, Notices, auth};
use greenclub_backend::{AuthService, SignUp};
use greenclub_types::api::{
    LoginRequest, LoginResponse, Reply, SessionResponse, SignupRequest, SignupResponse,
};
use greenclub_types::models::NoticeKind;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Backend refusals become `status`, carrying the message shown to the user.
fn auth_failure(err: AdminError, notices: &Notices, status: StatusCode) -> ApiError {
    match err {
        AdminError::Backend(_) | AdminError::NotFound(_) => {
            let raised = notices.take();
            let message = raised
                .iter()
                .rev()
                .find(|n| n.kind == NoticeKind::Error)
                .map(|n| n.message.clone())
                .unwrap_or_else(|| err.to_string());
            ApiError { status, message, notices: raised }
        }
        other => ApiError::from(other).with_notices(notices),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let notices = Notices::new();
    let session = auth::sign_in(state.backend.as_ref(), &req.email, &req.password, &notices)
        .await
        .map_err(|e| auth_failure(e, &notices, StatusCode::UNAUTHORIZED))?;

    Ok(Json(Reply {
        data: LoginResponse {
            user_id: session.user.id,
            email: session.user.email,
            token: session.access_token,
        },
        notices: notices.take(),
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let notices = Notices::new();
    let outcome = auth::sign_up(
        state.backend.as_ref(),
        &req.email,
        &req.password,
        &req.full_name,
        &notices,
    )
    .await
    .map_err(|e| auth_failure(e, &notices, StatusCode::CONFLICT))?;

    let data = match outcome {
        SignUp::Session(session) => SignupResponse {
            user_id: session.user.id,
            token: Some(session.access_token),
        },
        SignUp::ConfirmationPending(user) => SignupResponse { user_id: user.id, token: None },
    };

    Ok((StatusCode::CREATED, Json(Reply { data, notices: notices.take() })))
}

/// GET /api/auth/session: who the bearer token belongs to.
pub async fn session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<SessionResponse>, ApiError> {
    let is_admin = state
        .backend
        .for_session(&user.access_token)
        .is_admin(user.id)
        .await
        .map_err(|e| {
            error!("Admin role lookup for {} failed: {}", user.id, e);
            ApiError::from(e)
        })?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        email: user.email,
        is_admin,
    }))
}
