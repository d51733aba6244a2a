use std::sync::Arc;

use greenclub_admin::content::ContentRepository;
use greenclub_backend::SharedBackend;

use crate::workspace::Workspaces;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    /// Anonymous backend handle; per-user handles come from `for_session`.
    pub backend: SharedBackend,
    /// Site content with the read cache shared by public and admin routes.
    pub content: ContentRepository,
    /// Verifies access tokens in the auth middleware.
    pub jwt_secret: String,
    pub image_bucket: String,
    pub workspaces: Workspaces,
}

impl AppStateInner {
    pub fn new(backend: SharedBackend, jwt_secret: String, image_bucket: String) -> AppState {
        Arc::new(Self {
            content: ContentRepository::new(backend.clone()),
            backend,
            jwt_secret,
            image_bucket,
            workspaces: Workspaces::default(),
        })
    }
}
