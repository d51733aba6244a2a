use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Site content --

/// The editable blocks of static site text. Each has exactly one
/// `site_content` row, keyed by [`Section::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    LandingHero,
    AboutPage,
    Footer,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::LandingHero, Section::AboutPage, Section::Footer];

    /// Stable storage key of the section's row.
    pub fn key(self) -> &'static str {
        match self {
            Section::LandingHero => "landing_hero",
            Section::AboutPage => "about_page",
            Section::Footer => "footer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Section::LandingHero => "Landing Page Hero",
            Section::AboutPage => "About Page",
            Section::Footer => "Footer",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown content section '{}'", self.0)
    }
}

impl std::error::Error for UnknownSection {}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| UnknownSection(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingHeroContent {
    pub title: String,
    pub description: String,
    pub cta_primary: String,
    pub cta_secondary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutPageContent {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub mission_title: String,
    pub mission_description: String,
    /// Displayed as tags, in order. Duplicates are allowed.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterContent {
    pub description: String,
    pub contact_name: String,
    pub contact_email: String,
    pub copyright: String,
}

/// Typed content of one section. Stored rows carry no tag: the variant is
/// implied by the row's section key, so this only serializes untagged and
/// is decoded through [`SectionContent::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionContent {
    LandingHero(LandingHeroContent),
    AboutPage(AboutPageContent),
    Footer(FooterContent),
}

impl SectionContent {
    pub fn section(&self) -> Section {
        match self {
            SectionContent::LandingHero(_) => Section::LandingHero,
            SectionContent::AboutPage(_) => Section::AboutPage,
            SectionContent::Footer(_) => Section::Footer,
        }
    }

    pub fn from_value(section: Section, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match section {
            Section::LandingHero => SectionContent::LandingHero(serde_json::from_value(value)?),
            Section::AboutPage => SectionContent::AboutPage(serde_json::from_value(value)?),
            Section::Footer => SectionContent::Footer(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Plain structs of strings never fail to serialize.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// One row of the `site_content` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContentEntry {
    pub id: Uuid,
    pub section_key: String,
    pub section_name: String,
    pub content: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl SiteContentEntry {
    pub fn section(&self) -> Option<Section> {
        Section::from_key(&self.section_key)
    }

    /// Decode `content` for a known section. `None` when the key is not one
    /// of [`Section::ALL`].
    pub fn typed_content(&self) -> Option<serde_json::Result<SectionContent>> {
        self.section()
            .map(|section| SectionContent::from_value(section, self.content.clone()))
    }
}

// -- News --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Project,
    Achievement,
    Event,
    Initiative,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Project,
        Category::Achievement,
        Category::Event,
        Category::Initiative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Project => "Project",
            Category::Achievement => "Achievement",
            Category::Event => "Event",
            Category::Initiative => "Initiative",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s).ok_or(())
    }
}

/// One row of the `news_posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPost {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub image_url: Option<String>,
    pub read_time: String,
    pub published_date: NaiveDate,
    #[serde(default)]
    pub author_id: Option<Uuid>,
}

/// Editable fields of a post after validation. This is the full update
/// payload; `author_id` is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsFields {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub read_time: String,
    pub published_date: NaiveDate,
}

/// Insert payload: validated fields plus the creating user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNewsPost {
    #[serde(flatten)]
    pub fields: NewsFields,
    pub author_id: Uuid,
}

/// Unvalidated news form state, exactly as typed by the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: String,
    pub read_time: String,
    pub published_date: String,
}

pub const DEFAULT_READ_TIME: &str = "3 min read";

impl NewsDraft {
    /// Blank form dated `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            excerpt: String::new(),
            content: String::new(),
            category: Category::Project.as_str().to_string(),
            image_url: String::new(),
            read_time: DEFAULT_READ_TIME.to_string(),
            published_date: today.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for NewsDraft {
    fn default() -> Self {
        Self::blank(Utc::now().date_naive())
    }
}

impl From<&NewsPost> for NewsDraft {
    fn from(post: &NewsPost) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.as_str().to_string(),
            image_url: post.image_url.clone().unwrap_or_default(),
            read_time: post.read_time.clone(),
            published_date: post.published_date.format("%Y-%m-%d").to_string(),
        }
    }
}

// -- Activity log --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// -- Notifications --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient user-facing message (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

// -- Auth --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}
