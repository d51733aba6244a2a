use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AboutPageContent, ActivityEntry, FooterContent, LandingHeroContent, NewsDraft, NewsPost, Notice,
};

// -- Access token claims --

/// Claims carried by backend-issued access tokens. Verified by the auth
/// middleware; issued by the in-memory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub aud: String,
    pub exp: usize,
}

/// Audience of signed-in user tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

// -- Auth --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: Uuid,
    /// Absent when the backend requires email confirmation first.
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

// -- Admin replies --

/// Body of every admin response: the payload plus the notices raised
/// while producing it.
#[derive(Debug, Serialize)]
pub struct Reply<T> {
    pub data: T,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

// -- Content editor --

#[derive(Debug, Clone, Serialize)]
pub struct ContentDraftsView {
    pub landing_hero: LandingHeroContent,
    pub about_page: AboutPageContent,
    pub footer: FooterContent,
    /// Section keys with a save in flight.
    pub saving: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetValueRequest {
    pub value: String,
}

// -- News admin --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Update,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsFormView {
    pub mode: FormMode,
    pub editing_id: Option<Uuid>,
    pub draft: NewsDraft,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsScreenView {
    pub posts: Vec<NewsPost>,
    pub form: NewsFormView,
    pub image: ImageView,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

// -- Image widget --

#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub preview: String,
    pub value: String,
    pub selected_file: Option<String>,
    pub uploading: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageUrlRequest {
    pub url: String,
}

// -- Activity log --

#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    pub entries: Vec<ActivityEntry>,
    pub error_count: usize,
}

// -- Workspace --

/// Everything an admin screen shows right after mounting.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceView {
    pub content: ContentDraftsView,
    pub news: NewsScreenView,
    pub activity: ActivityView,
}
