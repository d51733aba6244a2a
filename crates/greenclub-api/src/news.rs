use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use greenclub_admin::Notices;
use greenclub_backend::NewsTable;
use greenclub_types::api::{ActivityView, DeleteQuery, NewsScreenView, Reply};
use greenclub_types::models::{NewsDraft, NewsPost};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::workspace::{self, activity_view};

/// GET /api/news
pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<NewsPost>>, ApiError> {
    Ok(Json(state.backend.select_news_posts().await?))
}

/// GET /api/admin/news
pub async fn get_screen(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NewsScreenView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    Ok(Json(ws.news_view().await))
}

/// PUT /api/admin/news/form
///
/// Replaces the whole draft. A changed `image_url` is mirrored into the
/// image widget as if typed there.
pub async fn put_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(draft): Json<NewsDraft>,
) -> Result<Json<NewsScreenView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut news = ws.news.lock().await;
    let mut image = ws.image.lock().await;
    if draft.image_url != image.value() {
        image.set_url(draft.image_url.clone());
    }
    news.set_form(draft);
    Ok(Json(workspace::news_view(&news, &image)))
}

/// POST /api/admin/news/form/submit
pub async fn submit_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Reply<NewsScreenView>>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let notices = Notices::new();
    let mut news = ws.news.lock().await;

    if let Err(e) = news.submit(ws.backend.as_ref(), ws.user_id, &notices).await {
        return Err(ApiError::from(e).with_notices(&notices));
    }

    let mut image = ws.image.lock().await;
    image.remove();
    Ok(Json(Reply {
        data: workspace::news_view(&news, &image),
        notices: notices.take(),
    }))
}

/// POST /api/admin/news/form/cancel
pub async fn cancel_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NewsScreenView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut news = ws.news.lock().await;
    news.cancel();
    let mut image = ws.image.lock().await;
    image.remove();
    Ok(Json(workspace::news_view(&news, &image)))
}

/// POST /api/admin/news/{id}/edit
pub async fn edit_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<NewsScreenView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut news = ws.news.lock().await;
    let image_url = news
        .edit_by_id(id)
        .map(|draft| draft.image_url.clone())
        .ok_or_else(|| ApiError::not_found(format!("No post {} on screen", id)))?;

    ws.reset_image(&image_url).await;
    let image = ws.image.lock().await;
    Ok(Json(workspace::news_view(&news, &image)))
}

/// DELETE /api/admin/news/{id}?confirm=true
///
/// Without `confirm=true` nothing is sent and 428 is returned.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Reply<NewsScreenView>>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let notices = Notices::new();
    let mut news = ws.news.lock().await;

    if let Err(e) = news
        .delete(ws.backend.as_ref(), id, &query.confirm, &notices)
        .await
    {
        return Err(ApiError::from(e).with_notices(&notices));
    }

    let image = ws.image.lock().await;
    Ok(Json(Reply {
        data: workspace::news_view(&news, &image),
        notices: notices.take(),
    }))
}

/// POST /api/admin/news/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Reply<NewsScreenView>>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let notices = Notices::new();
    let mut news = ws.news.lock().await;

    if let Err(e) = news.fetch_posts(ws.backend.as_ref(), &notices).await {
        return Err(ApiError::from(e).with_notices(&notices));
    }

    let image = ws.image.lock().await;
    Ok(Json(Reply {
        data: workspace::news_view(&news, &image),
        notices: notices.take(),
    }))
}

// -- Activity log --

/// GET /api/admin/activity
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ActivityView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let news = ws.news.lock().await;
    Ok(Json(activity_view(&news)))
}

/// DELETE /api/admin/activity
pub async fn clear_activity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ActivityView>, ApiError> {
    let ws = workspace::current(&state, &user).await?;
    let mut news = ws.news.lock().await;
    news.clear_log();
    Ok(Json(activity_view(&news)))
}
