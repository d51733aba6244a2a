//! Per-admin screen state. A workspace is created when an admin opens the
//! panel (mount) and dropped when they leave it (unmount); reopening starts
//! from freshly fetched data with an empty activity log.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use greenclub_admin::content::ContentRepository;
use greenclub_admin::editor::ContentEditor;
use greenclub_admin::news::NewsAdmin;
use greenclub_admin::upload::ImageUpload;
use greenclub_admin::{AdminError, Notices};
use greenclub_backend::SharedBackend;
use greenclub_types::api::{
    ActivityView, ContentDraftsView, ImageView, NewsFormView, NewsScreenView, Reply, WorkspaceView,
};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, AppStateInner};

/// Lock order when holding more than one: `editor`, `news`, `image`.
pub struct AdminWorkspace {
    pub user_id: Uuid,
    /// Backend acting as this admin.
    pub backend: SharedBackend,
    pub content: ContentRepository,
    pub editor: Mutex<ContentEditor>,
    pub news: Mutex<NewsAdmin>,
    pub image: Mutex<ImageUpload>,
    pub image_bucket: String,
}

impl AdminWorkspace {
    /// Reset the image widget to show `url`.
    pub async fn reset_image(&self, url: &str) {
        *self.image.lock().await = ImageUpload::new(self.image_bucket.clone()).with_value(url);
    }

    pub async fn news_view(&self) -> NewsScreenView {
        let news = self.news.lock().await;
        let image = self.image.lock().await;
        news_view(&news, &image)
    }
}

#[derive(Default)]
pub struct Workspaces {
    open: RwLock<HashMap<Uuid, Arc<AdminWorkspace>>>,
}

impl Workspaces {
    /// Build a fresh workspace for `user`, replacing any open one. Content
    /// must load; a failed news fetch is only recorded in the activity log.
    pub async fn mount(
        &self,
        state: &AppStateInner,
        user: &CurrentUser,
        notices: &Notices,
    ) -> Result<Arc<AdminWorkspace>, AdminError> {
        let backend = state.backend.for_session(&user.access_token);
        let content = state.content.for_session(&user.access_token);
        let editor = ContentEditor::load(&content).await?;

        let mut news = NewsAdmin::new();
        if let Err(e) = news.fetch_posts(backend.as_ref(), notices).await {
            warn!("Mounting workspace for {} without posts: {}", user.email, e);
        }

        let workspace = Arc::new(AdminWorkspace {
            user_id: user.id,
            backend,
            content,
            editor: Mutex::new(editor),
            news: Mutex::new(news),
            image: Mutex::new(ImageUpload::new(state.image_bucket.clone())),
            image_bucket: state.image_bucket.clone(),
        });
        self.open.write().await.insert(user.id, workspace.clone());
        info!("Admin workspace mounted for {}", user.email);
        Ok(workspace)
    }

    pub async fn get(&self, user_id: Uuid) -> Option<Arc<AdminWorkspace>> {
        self.open.read().await.get(&user_id).cloned()
    }

    pub async fn unmount(&self, user_id: Uuid) -> bool {
        self.open.write().await.remove(&user_id).is_some()
    }
}

/// The caller's open workspace.
pub async fn current(state: &AppStateInner, user: &CurrentUser) -> Result<Arc<AdminWorkspace>, ApiError> {
    state.workspaces.get(user.id).await.ok_or_else(|| {
        ApiError::new(
            StatusCode::PRECONDITION_FAILED,
            "Admin workspace is not open; POST /api/admin/workspace first",
        )
    })
}

// -- Views --

pub fn drafts_view(editor: &ContentEditor) -> ContentDraftsView {
    ContentDraftsView {
        landing_hero: editor.landing_hero().clone(),
        about_page: editor.about_page().clone(),
        footer: editor.footer().clone(),
        saving: editor.saving().map(|s| s.key().to_string()).collect(),
    }
}

pub fn image_view(image: &ImageUpload) -> ImageView {
    ImageView {
        preview: image.preview().to_string(),
        value: image.value().to_string(),
        selected_file: image.selected_file().map(str::to_string),
        uploading: image.is_uploading(),
    }
}

pub fn news_view(news: &NewsAdmin, image: &ImageUpload) -> NewsScreenView {
    NewsScreenView {
        posts: news.posts().to_vec(),
        form: NewsFormView {
            mode: news.mode(),
            editing_id: news.editing(),
            draft: news.form().clone(),
        },
        image: image_view(image),
    }
}

pub fn activity_view(news: &NewsAdmin) -> ActivityView {
    ActivityView {
        entries: news.log().entries().cloned().collect(),
        error_count: news.log().error_count(),
    }
}

// -- Handlers --

/// POST /api/admin/workspace: open the admin panel.
pub async fn mount(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let notices = Notices::new();
    let ws = state
        .workspaces
        .mount(&state, &user, &notices)
        .await
        .map_err(|e| ApiError::from(e).with_notices(&notices))?;

    let content = drafts_view(&*ws.editor.lock().await);
    let (news, activity) = {
        let news = ws.news.lock().await;
        let image = ws.image.lock().await;
        (news_view(&news, &image), activity_view(&news))
    };

    Ok((
        StatusCode::CREATED,
        Json(Reply {
            data: WorkspaceView { content, news, activity },
            notices: notices.take(),
        }),
    ))
}

/// DELETE /api/admin/workspace: leave the admin panel.
pub async fn unmount(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> StatusCode {
    if state.workspaces.unmount(user.id).await {
        info!("Admin workspace closed for {}", user.email);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
