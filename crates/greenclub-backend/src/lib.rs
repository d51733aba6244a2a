//! Client seam for the hosted backend that owns all persisted state: the
//! `site_content` and `news_posts` tables, blob storage and authentication.
//!
//! [`RestBackend`] talks to the hosted service over HTTP. [`MemoryBackend`]
//! keeps everything in process and is used for local development and tests.

pub mod error;
pub mod memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use greenclub_types::models::{
    AuthUser, NewNewsPost, NewsFields, NewsPost, Session, SiteContentEntry,
};

pub use error::{BackendError, Result};
pub use memory::MemoryBackend;
pub use rest::RestBackend;

/// The `site_content` table, keyed by section key.
#[async_trait]
pub trait ContentTable: Send + Sync {
    /// Every row, in backend default order.
    async fn select_site_content(&self) -> Result<Vec<SiteContentEntry>>;

    /// Exactly one row for `section_key`. Zero or several matches fail with
    /// [`BackendError::NotFound`].
    async fn select_site_content_single(&self, section_key: &str) -> Result<SiteContentEntry>;

    /// Replace the `content` column of the row matching `section_key` and
    /// return the updated row. Same singular contract as the select.
    async fn update_site_content(
        &self,
        section_key: &str,
        content: serde_json::Value,
    ) -> Result<SiteContentEntry>;
}

/// The `news_posts` table.
#[async_trait]
pub trait NewsTable: Send + Sync {
    /// All posts, newest `published_date` first.
    async fn select_news_posts(&self) -> Result<Vec<NewsPost>>;

    async fn insert_news_post(&self, post: &NewNewsPost) -> Result<()>;

    async fn update_news_post(&self, id: Uuid, fields: &NewsFields) -> Result<()>;

    async fn delete_news_post(&self, id: Uuid) -> Result<()>;
}

/// Public blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<()>;

    /// Publicly reachable URL of an object. Does not check existence.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Fetch an object's bytes and content type.
    async fn download_object(&self, bucket: &str, key: &str) -> Result<(String, Bytes)>;
}

/// Outcome of a sign-up request.
#[derive(Debug, Clone)]
pub enum SignUp {
    /// Account created and signed in.
    Session(Session),
    /// Account created; the address must be confirmed before signing in.
    ConfirmationPending(AuthUser),
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUp>;

    /// The user an access token belongs to.
    async fn current_user(&self, access_token: &str) -> Result<AuthUser>;

    /// Whether the user holds the admin role.
    async fn is_admin(&self, user_id: Uuid) -> Result<bool>;
}

/// Everything the site needs from the hosted backend.
pub trait Backend: ContentTable + NewsTable + BlobStore + AuthService {
    /// The same backend acting on behalf of a signed-in user. Writes go
    /// through this so row-level permissions apply to that user.
    fn for_session(&self, access_token: &str) -> SharedBackend;
}

pub type SharedBackend = Arc<dyn Backend>;
