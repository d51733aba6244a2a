use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use greenclub_admin::Notices;
use greenclub_types::api::{ContentDraftsView, Reply, SetValueRequest};
use greenclub_types::models::{Section, SectionContent, SiteContentEntry};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::workspace::{self, drafts_view};

fn parse_section(key: &str) -> Result<Section, ApiError> {
    key.parse::<Section>()
        .map_err(|e| ApiError::not_found(e.to_string()))
}

// -- Public --

/// GET /api/content
pub async fn list_content(
    State(state): State<AppState>,
) -> Result<Json<Vec<SiteContentEntry>>, ApiError> {
    Ok(Json(state.content.fetch_all().await?))
}

/// GET /api/content/{section_key}
pub async fn get_content(
    State(state): State<AppState>,
    Path(section_key): Path<String>,
) -> Result<Json<SiteContentEntry>, ApiError> {
    Ok(Json(state.content.fetch_one(&section_key).await?))
}

// -- Editor --

/// GET /api/admin/content
pub async fn get_drafts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ContentDraftsView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let editor = ws.editor.lock().await;
    Ok(Json(drafts_view(&editor)))
}

/// PUT /api/admin/content/{section}: replace one section's draft. Missing
/// fields default to empty.
pub async fn put_draft(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(section): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ContentDraftsView>, ApiError> {
    let section = parse_section(&section)?;
    let content = SectionContent::from_value(section, body).map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid {} content: {}", section, e),
        )
    })?;

    let ws = workspace::current(&state, &user).await?;
    let mut editor = ws.editor.lock().await;
    editor.set_draft(content);
    Ok(Json(drafts_view(&editor)))
}

/// POST /api/admin/content/about_page/values
pub async fn add_value(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ContentDraftsView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut editor = ws.editor.lock().await;
    editor.add_value();
    Ok(Json(drafts_view(&editor)))
}

/// PUT /api/admin/content/about_page/values/{index}
pub async fn set_value(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(index): Path<usize>,
    Json(req): Json<SetValueRequest>,
) -> Result<Json<ContentDraftsView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut editor = ws.editor.lock().await;
    if !editor.set_value(index, req.value) {
        return Err(ApiError::not_found(format!("No value at index {}", index)));
    }
    Ok(Json(drafts_view(&editor)))
}

/// DELETE /api/admin/content/about_page/values/{index}: out of range is a
/// no-op.
pub async fn remove_value(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(index): Path<usize>,
) -> Result<Json<ContentDraftsView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut editor = ws.editor.lock().await;
    if !editor.remove_value(index) {
        debug!("remove_value({}) out of range", index);
    }
    Ok(Json(drafts_view(&editor)))
}

/// POST /api/admin/content/{section}/save: persist one section's draft.
/// The editor is unlocked while the write is in flight, so other sections
/// can be edited and saved meanwhile. The write runs in its own task and
/// always clears the section's saving flag, even if the client goes away.
pub async fn save_section(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(section): Path<String>,
) -> Result<Json<Reply<SiteContentEntry>>, ApiError> {
    let section = parse_section(&section)?;
    let ws = workspace::current(&state, &user).await?;

    let pending = ws.editor.lock().await.begin_save(section)?;
    let notices = Arc::new(Notices::new());
    let outcome = tokio::spawn({
        let notices = notices.clone();
        async move {
            let outcome = pending.send(&ws.content, &*notices).await;
            ws.editor.lock().await.finish_save(section);
            outcome
        }
    })
    .await?;

    match outcome {
        Ok(entry) => Ok(Json(Reply { data: entry, notices: notices.take() })),
        Err(e) => Err(ApiError::from(e).with_notices(&notices)),
    }
}
