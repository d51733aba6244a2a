use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use greenclub_types::models::{
    AuthUser, NewNewsPost, NewsFields, NewsPost, Session, SiteContentEntry,
};

use crate::error::{BackendError, Result};
use crate::{AuthService, Backend, BlobStore, ContentTable, NewsTable, SharedBackend, SignUp};

const SITE_CONTENT: &str = "site_content";
const NEWS_POSTS: &str = "news_posts";
const USER_ROLES: &str = "user_roles";

/// Client for a Supabase-style hosted backend: PostgREST tables under
/// `/rest/v1`, object storage under `/storage/v1`, auth under `/auth/v1`.
#[derive(Clone)]
pub struct RestBackend {
    http: Client,
    base_url: Url,
    anon_key: String,
    /// Signed-in user's token; requests fall back to the anon key.
    access_token: Option<String>,
}

/// Error payloads differ between the backend's services; take whichever
/// field is present.
#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<RemoteUser> for AuthUser {
    fn from(user: RemoteUser) -> Self {
        AuthUser { id: user.id, email: user.email.unwrap_or_default() }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: RemoteUser,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(RemoteUser),
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn table(&self, table: &str) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{}", table))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn execute(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: RemoteErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.msg)
            .or(body.error_description)
            .or(body.error)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        warn!("Backend request failed ({}): {}", status, message);
        Err(BackendError::remote(status.as_u16(), message))
    }

    async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::execute(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn expect_one<T>(rows: Vec<T>, table: &'static str, key: &str) -> Result<T> {
    let found = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (Some(row), None) => Ok(row),
        _ => Err(BackendError::NotFound { table, key: key.to_string(), found }),
    }
}

#[async_trait]
impl ContentTable for RestBackend {
    async fn select_site_content(&self) -> Result<Vec<SiteContentEntry>> {
        let request = self
            .request(Method::GET, self.table(SITE_CONTENT)?)
            .query(&[("select", "*")]);
        Self::fetch_json(request).await
    }

    async fn select_site_content_single(&self, section_key: &str) -> Result<SiteContentEntry> {
        let filter = format!("eq.{}", section_key);
        let request = self
            .request(Method::GET, self.table(SITE_CONTENT)?)
            .query(&[("select", "*"), ("section_key", filter.as_str())]);
        let rows: Vec<SiteContentEntry> = Self::fetch_json(request).await?;
        expect_one(rows, SITE_CONTENT, section_key)
    }

    async fn update_site_content(
        &self,
        section_key: &str,
        content: serde_json::Value,
    ) -> Result<SiteContentEntry> {
        let filter = format!("eq.{}", section_key);
        let request = self
            .request(Method::PATCH, self.table(SITE_CONTENT)?)
            .query(&[("section_key", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&json!({ "content": content }));
        let rows: Vec<SiteContentEntry> = Self::fetch_json(request).await?;
        debug!("Updated {} site_content row(s) for {}", rows.len(), section_key);
        expect_one(rows, SITE_CONTENT, section_key)
    }
}

#[async_trait]
impl NewsTable for RestBackend {
    async fn select_news_posts(&self) -> Result<Vec<NewsPost>> {
        let request = self
            .request(Method::GET, self.table(NEWS_POSTS)?)
            .query(&[("select", "*"), ("order", "published_date.desc")]);
        Self::fetch_json(request).await
    }

    async fn insert_news_post(&self, post: &NewNewsPost) -> Result<()> {
        let request = self
            .request(Method::POST, self.table(NEWS_POSTS)?)
            .header("Prefer", "return=minimal")
            .json(&[post]);
        Self::execute(request).await?;
        Ok(())
    }

    async fn update_news_post(&self, id: Uuid, fields: &NewsFields) -> Result<()> {
        let filter = format!("eq.{}", id);
        let request = self
            .request(Method::PATCH, self.table(NEWS_POSTS)?)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(fields);
        Self::execute(request).await?;
        Ok(())
    }

    async fn delete_news_post(&self, id: Uuid) -> Result<()> {
        let filter = format!("eq.{}", id);
        let request = self
            .request(Method::DELETE, self.table(NEWS_POSTS)?)
            .query(&[("id", filter.as_str())]);
        Self::execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for RestBackend {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<()> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", bucket, key))?;
        let request = self
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        Self::execute(request).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}storage/v1/object/public/{}/{}", self.base_url, bucket, key)
    }

    async fn download_object(&self, bucket: &str, key: &str) -> Result<(String, Bytes)> {
        let url = self.endpoint(&format!("storage/v1/object/public/{}/{}", bucket, key))?;
        let response = Self::execute(self.request(Method::GET, url)).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok((content_type, response.bytes().await?))
    }
}

#[async_trait]
impl AuthService for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .request(Method::POST, self.endpoint("auth/v1/token")?)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let token: TokenResponse = Self::fetch_json(request).await?;
        Ok(Session { access_token: token.access_token, user: token.user.into() })
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUp> {
        let request = self
            .request(Method::POST, self.endpoint("auth/v1/signup")?)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }));
        Ok(match Self::fetch_json::<SignUpResponse>(request).await? {
            SignUpResponse::Session(token) => SignUp::Session(Session {
                access_token: token.access_token,
                user: token.user.into(),
            }),
            SignUpResponse::User(user) => SignUp::ConfirmationPending(user.into()),
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        let request = self
            .http
            .get(self.endpoint("auth/v1/user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);
        let user: RemoteUser = Self::fetch_json(request).await?;
        Ok(user.into())
    }

    async fn is_admin(&self, user_id: Uuid) -> Result<bool> {
        let filter = format!("eq.{}", user_id);
        let request = self
            .request(Method::GET, self.table(USER_ROLES)?)
            .query(&[("select", "role"), ("user_id", filter.as_str()), ("role", "eq.admin")]);
        // Only the presence of a matching row matters.
        let rows: Vec<IgnoredAny> = Self::fetch_json(request).await?;
        Ok(!rows.is_empty())
    }
}

impl Backend for RestBackend {
    fn for_session(&self, access_token: &str) -> SharedBackend {
        let mut scoped = self.clone();
        scoped.access_token = Some(access_token.to_string());
        std::sync::Arc::new(scoped)
    }
}
