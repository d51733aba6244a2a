use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{error, warn};
use uuid::Uuid;

use greenclub_backend::AuthService;
use greenclub_types::api::{AUTHENTICATED_AUDIENCE, Claims};

use crate::error::ApiError;
use crate::state::AppState;

/// Signed-in caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    /// The bearer token itself, for acting on the user's behalf.
    pub access_token: String,
}

/// Extract and verify the access token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    let mut validation = Validation::default();
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    let claims = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        warn!("Rejected access token: {}", e);
        StatusCode::UNAUTHORIZED
    })?
    .claims;

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        access_token: token,
    });
    Ok(next.run(req).await)
}

/// Admin role gate. Must run after [`require_auth`].
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Not signed in"))?;

    let is_admin = state
        .backend
        .for_session(&user.access_token)
        .is_admin(user.id)
        .await
        .map_err(|e| {
            error!("Admin role lookup for {} failed: {}", user.id, e);
            ApiError::new(StatusCode::BAD_GATEWAY, "Could not verify admin role")
        })?;

    if !is_admin {
        warn!("Non-admin {} tried to reach the admin panel", user.email);
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Access denied. Admin only."));
    }
    Ok(next.run(req).await)
}
