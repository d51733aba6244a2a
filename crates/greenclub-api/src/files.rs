use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, error};

use greenclub_admin::{AdminError, Notices};
use greenclub_admin::upload::ImageFile;
use greenclub_backend::BlobStore;
use greenclub_types::api::{ImageUrlRequest, NewsScreenView, Reply};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::workspace;

/// Header carrying the picked file's name on image uploads.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Request body cap on the upload route. Larger than the image limit so
/// oversized images reach the widget and get its message.
pub const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

/// POST /api/admin/image: raw image bytes, `Content-Type` and
/// `X-File-Name` headers. On success the URL lands in the news form.
///
/// No workspace lock is held while storage works, so the form stays
/// editable and shows `uploading`. The transfer runs in its own task and
/// always clears that flag, even if the client goes away.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Json<Reply<NewsScreenView>>, ApiError> {
    let ws = workspace::current(&state, &user).await?;

    let name = match header_str(&headers, FILE_NAME_HEADER) {
        "" => "upload".to_string(),
        name => name.to_string(),
    };
    let file = ImageFile {
        name,
        content_type: header_str(&headers, header::CONTENT_TYPE).to_string(),
        bytes,
    };

    let notices = Arc::new(Notices::new());
    let pending = ws
        .image
        .lock()
        .await
        .begin_upload(file, &*notices)
        .map_err(|e| ApiError::from(e).with_notices(&notices))?;

    let view = tokio::spawn({
        let notices = notices.clone();
        async move {
            let uploaded = pending.send(ws.backend.as_ref(), &*notices).await;
            let mut news = ws.news.lock().await;
            let mut image = ws.image.lock().await;
            image.finish_upload(uploaded.as_ref().ok());
            news.form_mut().image_url = uploaded?.url;
            Ok::<_, AdminError>(workspace::news_view(&news, &image))
        }
    })
    .await?
    .map_err(|e| ApiError::from(e).with_notices(&notices))?;

    Ok(Json(Reply { data: view, notices: notices.take() }))
}

/// PUT /api/admin/image/url: manual URL entry, no storage involved.
pub async fn set_image_url(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ImageUrlRequest>,
) -> Result<Json<NewsScreenView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut news = ws.news.lock().await;
    let mut image = ws.image.lock().await;
    image.set_url(req.url.clone());
    news.form_mut().image_url = req.url;
    Ok(Json(workspace::news_view(&news, &image)))
}

/// DELETE /api/admin/image
pub async fn remove_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NewsScreenView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut news = ws.news.lock().await;
    let mut image = ws.image.lock().await;
    image.remove();
    news.form_mut().image_url.clear();
    Ok(Json(workspace::news_view(&news, &image)))
}

/// GET /media/{bucket}/{key}: serve a stored object.
pub async fn serve_media(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    let (content_type, bytes) = state
        .backend
        .download_object(&bucket, &key)
        .await
        .map_err(|e| match e.status() {
            Some(404) => {
                debug!("No object {}/{}", bucket, key);
                StatusCode::NOT_FOUND
            }
            _ => {
                error!("Failed to fetch {}/{}: {}", bucket, key, e);
                StatusCode::BAD_GATEWAY
            }
        })?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
