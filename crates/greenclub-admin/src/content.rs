use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use greenclub_backend::SharedBackend;
use greenclub_types::models::{SectionContent, SiteContentEntry};

use crate::error::Result;
use crate::notify::Notifier;

#[derive(Debug, Default)]
struct ContentCache {
    all: Option<Vec<SiteContentEntry>>,
    by_key: HashMap<String, SiteContentEntry>,
    /// Bumped by every invalidation. A fetch only fills the cache if no
    /// invalidation happened while it was in flight.
    generation: u64,
}

/// Read/write access to the `site_content` rows with a read cache that
/// every successful write invalidates.
///
/// Writes are last-write-wins: there is no version check, so two editors
/// saving the same section overwrite each other.
#[derive(Clone)]
pub struct ContentRepository {
    backend: SharedBackend,
    cache: Arc<RwLock<ContentCache>>,
}

impl ContentRepository {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            cache: Arc::new(RwLock::new(ContentCache::default())),
        }
    }

    /// A repository writing as the given user that shares this one's cache.
    pub fn for_session(&self, access_token: &str) -> Self {
        Self {
            backend: self.backend.for_session(access_token),
            cache: self.cache.clone(),
        }
    }

    /// Every row, in backend order.
    pub async fn fetch_all(&self) -> Result<Vec<SiteContentEntry>> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(all) = &cache.all {
                return Ok(all.clone());
            }
            cache.generation
        };

        let rows = self.backend.select_site_content().await?;
        debug!("Fetched {} site content rows", rows.len());
        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.all = Some(rows.clone());
        }
        Ok(rows)
    }

    /// The single row for `section_key`; several matching rows are an
    /// error, never an arbitrary pick.
    pub async fn fetch_one(&self, section_key: &str) -> Result<SiteContentEntry> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.by_key.get(section_key) {
                return Ok(entry.clone());
            }
            cache.generation
        };

        let entry = self.backend.select_site_content_single(section_key).await?;
        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.by_key.insert(section_key.to_string(), entry.clone());
        }
        Ok(entry)
    }

    /// Replace the `content` column of one row. Reports the outcome through
    /// `notifier` either way.
    pub async fn update(
        &self,
        section_key: &str,
        content: serde_json::Value,
        notifier: &dyn Notifier,
    ) -> Result<SiteContentEntry> {
        match self.backend.update_site_content(section_key, content).await {
            Ok(entry) => {
                self.invalidate().await;
                info!("Site content {} updated", section_key);
                notifier.success("Content updated successfully!");
                Ok(entry)
            }
            Err(e) => {
                notifier.error(&format!("Failed to update content: {}", e));
                Err(e.into())
            }
        }
    }

    /// Typed form of [`ContentRepository::update`].
    pub async fn save_section(
        &self,
        content: &SectionContent,
        notifier: &dyn Notifier,
    ) -> Result<SiteContentEntry> {
        self.update(content.section().key(), content.to_value(), notifier).await
    }

    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        cache.all = None;
        cache.by_key.clear();
        cache.generation += 1;
    }
}
