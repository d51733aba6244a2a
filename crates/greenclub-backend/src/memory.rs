use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use greenclub_types::api::{AUTHENTICATED_AUDIENCE, Claims};
use greenclub_types::models::{
    AboutPageContent, AuthUser, FooterContent, LandingHeroContent, NewNewsPost, NewsFields,
    NewsPost, Section, SectionContent, Session, SiteContentEntry,
};

use crate::error::{BackendError, Result};
use crate::{AuthService, Backend, BlobStore, ContentTable, NewsTable, SharedBackend, SignUp};

struct MemoryUser {
    id: Uuid,
    email: String,
    password_hash: String,
}

struct StoredObject {
    content_type: String,
    bytes: Bytes,
}

/// In-process stand-in for the hosted backend. Cloning shares the same
/// state.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    jwt_secret: String,
    /// Prefix of public object URLs, e.g. `http://localhost:3000/media`.
    public_base: String,
    content: RwLock<Vec<SiteContentEntry>>,
    posts: RwLock<Vec<NewsPost>>,
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    users: RwLock<Vec<MemoryUser>>,
    admins: RwLock<HashSet<Uuid>>,
    /// When set, every call fails as if the service were down.
    unavailable: AtomicBool,
    requests: AtomicUsize,
    /// Delay in milliseconds added to table and storage calls.
    latency_ms: AtomicU64,
}

impl MemoryBackend {
    pub fn new(jwt_secret: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                jwt_secret: jwt_secret.into(),
                public_base: public_base.into().trim_end_matches('/').to_string(),
                content: RwLock::new(Vec::new()),
                posts: RwLock::new(Vec::new()),
                objects: RwLock::new(HashMap::new()),
                users: RwLock::new(Vec::new()),
                admins: RwLock::new(HashSet::new()),
                unavailable: AtomicBool::new(false),
                requests: AtomicUsize::new(0),
                latency_ms: AtomicU64::new(0),
            }),
        }
    }

    /// Insert one row per known section with starter text.
    pub async fn seed_site_content(&self) {
        let starter = [
            SectionContent::LandingHero(LandingHeroContent {
                title: "Growing a Greener School".into(),
                description: "Students working together on recycling, gardening and energy saving projects.".into(),
                cta_primary: "Join the Club".into(),
                cta_secondary: "Read the News".into(),
            }),
            SectionContent::AboutPage(AboutPageContent {
                title: "About Us".into(),
                subtitle: "Who we are".into(),
                description: "A student-run environmental club.".into(),
                mission_title: "Our Mission".into(),
                mission_description: "Make sustainable habits part of everyday school life.".into(),
                values: vec!["Sustainability".into(), "Community".into(), "Education".into()],
            }),
            SectionContent::Footer(FooterContent {
                description: "Environmental club news and events.".into(),
                contact_name: "Club Coordinator".into(),
                contact_email: "ecoclub@example.org".into(),
                copyright: "All rights reserved.".into(),
            }),
        ];
        for content in starter {
            let section = content.section();
            self.insert_site_content(section.key(), section.display_name(), content.to_value())
                .await;
        }
        info!("Seeded {} site content sections", Section::ALL.len());
    }

    /// Insert a raw `site_content` row. No uniqueness check is made on the
    /// key.
    pub async fn insert_site_content(
        &self,
        section_key: &str,
        section_name: &str,
        content: serde_json::Value,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.content.write().await.push(SiteContentEntry {
            id,
            section_key: section_key.to_string(),
            section_name: section_name.to_string(),
            content,
            updated_at: Utc::now(),
        });
        id
    }

    /// Create an account and grant it the admin role.
    pub async fn create_admin(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser> {
        let user = self.register(email, password, full_name).await?;
        self.grant_admin(user.id).await;
        Ok(user)
    }

    pub async fn grant_admin(&self, user_id: Uuid) {
        self.inner.admins.write().await.insert(user_id);
    }

    /// Simulate an outage: while set, every trait call fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of trait calls served so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.inner.requests.load(Ordering::SeqCst)
    }

    /// Slow down table and storage calls. A call keeps the latency that was
    /// set when it started, and finishes its work before the delay.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    fn begin_request(&self) -> Result<()> {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::remote(503, "Service unavailable"));
        }
        Ok(())
    }

    /// Like `begin_request`, returning the delay to apply before answering.
    fn begin_data_request(&self) -> Result<Duration> {
        self.begin_request()?;
        Ok(Duration::from_millis(self.inner.latency_ms.load(Ordering::SeqCst)))
    }

    async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser> {
        let mut users = self.inner.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(BackendError::remote(422, "User already registered"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| BackendError::remote(500, format!("Password hashing failed: {}", e)))?
            .to_string();

        let user = MemoryUser { id: Uuid::new_v4(), email: email.to_string(), password_hash };
        let auth_user = AuthUser { id: user.id, email: user.email.clone() };
        users.push(user);
        info!("Registered user {} ({})", email, full_name);
        Ok(auth_user)
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            exp: (Utc::now() + chrono::Duration::hours(12)).timestamp() as usize,
        };
        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.inner.jwt_secret.as_bytes()),
        )?)
    }
}

#[async_trait]
impl ContentTable for MemoryBackend {
    async fn select_site_content(&self) -> Result<Vec<SiteContentEntry>> {
        let latency = self.begin_data_request()?;
        let rows = self.inner.content.read().await.clone();
        settle(latency).await;
        Ok(rows)
    }

    async fn select_site_content_single(&self, section_key: &str) -> Result<SiteContentEntry> {
        let latency = self.begin_data_request()?;
        let result = {
            let rows = self.inner.content.read().await;
            let matches: Vec<&SiteContentEntry> =
                rows.iter().filter(|r| r.section_key == section_key).collect();
            match matches.as_slice() {
                [row] => Ok((*row).clone()),
                _ => Err(BackendError::NotFound {
                    table: "site_content",
                    key: section_key.to_string(),
                    found: matches.len(),
                }),
            }
        };
        settle(latency).await;
        result
    }

    async fn update_site_content(
        &self,
        section_key: &str,
        content: serde_json::Value,
    ) -> Result<SiteContentEntry> {
        let latency = self.begin_data_request()?;
        let updated = self.write_site_content(section_key, content).await;
        settle(latency).await;
        updated
    }
}

impl MemoryBackend {
    async fn write_site_content(
        &self,
        section_key: &str,
        content: serde_json::Value,
    ) -> Result<SiteContentEntry> {
        let mut rows = self.inner.content.write().await;
        let found = rows.iter().filter(|r| r.section_key == section_key).count();
        if found != 1 {
            return Err(BackendError::NotFound {
                table: "site_content",
                key: section_key.to_string(),
                found,
            });
        }
        let row = rows
            .iter_mut()
            .find(|r| r.section_key == section_key)
            .ok_or_else(|| BackendError::NotFound {
                table: "site_content",
                key: section_key.to_string(),
                found: 0,
            })?;
        row.content = content;
        row.updated_at = Utc::now();
        debug!("Updated site_content {}", section_key);
        Ok(row.clone())
    }
}

#[async_trait]
impl NewsTable for MemoryBackend {
    async fn select_news_posts(&self) -> Result<Vec<NewsPost>> {
        let latency = self.begin_data_request()?;
        let mut posts = self.inner.posts.read().await.clone();
        posts.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        settle(latency).await;
        Ok(posts)
    }

    async fn insert_news_post(&self, post: &NewNewsPost) -> Result<()> {
        self.begin_request()?;
        let fields = post.fields.clone();
        self.inner.posts.write().await.push(NewsPost {
            id: Uuid::new_v4(),
            title: fields.title,
            excerpt: fields.excerpt,
            content: fields.content,
            category: fields.category,
            image_url: fields.image_url,
            read_time: fields.read_time,
            published_date: fields.published_date,
            author_id: Some(post.author_id),
        });
        Ok(())
    }

    async fn update_news_post(&self, id: Uuid, fields: &NewsFields) -> Result<()> {
        self.begin_request()?;
        // Matching no row is not an error, as with a filtered PATCH.
        if let Some(post) = self.inner.posts.write().await.iter_mut().find(|p| p.id == id) {
            let fields = fields.clone();
            post.title = fields.title;
            post.excerpt = fields.excerpt;
            post.content = fields.content;
            post.category = fields.category;
            post.image_url = fields.image_url;
            post.read_time = fields.read_time;
            post.published_date = fields.published_date;
        }
        Ok(())
    }

    async fn delete_news_post(&self, id: Uuid) -> Result<()> {
        self.begin_request()?;
        self.inner.posts.write().await.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<()> {
        let latency = self.begin_data_request()?;
        let stored = {
            let mut objects = self.inner.objects.write().await;
            let id = (bucket.to_string(), key.to_string());
            if objects.contains_key(&id) {
                Err(BackendError::remote(409, "The resource already exists"))
            } else {
                debug!("Stored object {}/{} ({} bytes)", bucket, key, bytes.len());
                objects.insert(id, StoredObject { content_type: content_type.to_string(), bytes });
                Ok(())
            }
        };
        settle(latency).await;
        stored
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.inner.public_base, bucket, key)
    }

    async fn download_object(&self, bucket: &str, key: &str) -> Result<(String, Bytes)> {
        self.begin_request()?;
        let objects = self.inner.objects.read().await;
        let object = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| BackendError::remote(404, "Object not found"))?;
        Ok((object.content_type.clone(), object.bytes.clone()))
    }
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.begin_request()?;
        let user = {
            let users = self.inner.users.read().await;
            let user = users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .ok_or_else(|| BackendError::remote(400, "Invalid login credentials"))?;

            let parsed_hash = PasswordHash::new(&user.password_hash)
                .map_err(|e| BackendError::remote(500, format!("Corrupt password hash: {}", e)))?;
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .map_err(|_| BackendError::remote(400, "Invalid login credentials"))?;

            AuthUser { id: user.id, email: user.email.clone() }
        };

        let access_token = self.issue_token(&user)?;
        Ok(Session { access_token, user })
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUp> {
        self.begin_request()?;
        let user = self.register(email, password, full_name).await?;
        let access_token = self.issue_token(&user)?;
        Ok(SignUp::Session(Session { access_token, user }))
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        self.begin_request()?;
        let mut validation = Validation::default();
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
        let claims = decode::<Claims>(
            access_token,
            &DecodingKey::from_secret(self.inner.jwt_secret.as_bytes()),
            &validation,
        )?
        .claims;

        let users = self.inner.users.read().await;
        users
            .iter()
            .find(|u| u.id == claims.sub)
            .map(|u| AuthUser { id: u.id, email: u.email.clone() })
            .ok_or_else(|| BackendError::remote(401, "User not found"))
    }

    async fn is_admin(&self, user_id: Uuid) -> Result<bool> {
        self.begin_request()?;
        Ok(self.inner.admins.read().await.contains(&user_id))
    }
}

impl Backend for MemoryBackend {
    fn for_session(&self, _access_token: &str) -> SharedBackend {
        Arc::new(self.clone())
    }
}

async fn settle(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
