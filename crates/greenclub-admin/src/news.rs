use tracing::debug;
use uuid::Uuid;

use greenclub_backend::NewsTable;
use greenclub_types::api::FormMode;
use greenclub_types::models::{NewNewsPost, NewsDraft, NewsPost};

use crate::activity::ActivityLog;
use crate::error::{AdminError, Result};
use crate::notify::Notifier;
use crate::validate;

/// Asks the user to confirm a destructive action.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

impl<F: Fn(&str) -> bool + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this post?";

/// State of the news admin screen: the fetched posts, the create/update
/// form and the activity log. Dropped when the screen is left.
#[derive(Debug, Clone, Default)]
pub struct NewsAdmin {
    posts: Vec<NewsPost>,
    form: NewsDraft,
    editing: Option<Uuid>,
    log: ActivityLog,
}

impl NewsAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[NewsPost] {
        &self.posts
    }

    pub fn form(&self) -> &NewsDraft {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut NewsDraft {
        &mut self.form
    }

    pub fn set_form(&mut self, draft: NewsDraft) {
        self.form = draft;
    }

    pub fn mode(&self) -> FormMode {
        if self.editing.is_some() { FormMode::Update } else { FormMode::Create }
    }

    /// Id of the post being edited, in update mode.
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Re-read the whole collection, newest first. On failure the previous
    /// list stays on screen.
    pub async fn fetch_posts<T: NewsTable + ?Sized>(
        &mut self,
        table: &T,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        self.log.info("Fetching news posts...");
        match table.select_news_posts().await {
            Ok(posts) => {
                self.log.success(format!("Loaded {} posts", posts.len()));
                self.posts = posts;
                Ok(())
            }
            Err(e) => {
                self.log.error("Failed to load posts", e.to_string());
                notifier.error("Failed to load posts");
                Err(e.into())
            }
        }
    }

    /// Load a post into the form and switch to update mode.
    pub fn edit(&mut self, post: &NewsPost) {
        self.editing = Some(post.id);
        self.form = NewsDraft::from(post);
    }

    /// [`NewsAdmin::edit`] by id, from the fetched list.
    pub fn edit_by_id(&mut self, id: Uuid) -> Option<&NewsDraft> {
        let post = self.posts.iter().find(|p| p.id == id)?.clone();
        self.edit(&post);
        Some(&self.form)
    }

    /// Back to a blank create form. No backend call.
    pub fn cancel(&mut self) {
        self.editing = None;
        self.form = NewsDraft::default();
    }

    /// Validate the form, then create or update depending on the mode. On
    /// success the form resets and the list is re-fetched; on failure the
    /// form keeps the user's input.
    pub async fn submit<T: NewsTable + ?Sized>(
        &mut self,
        table: &T,
        author_id: Uuid,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        let fields = match validate::news_draft(&self.form) {
            Ok(fields) => fields,
            Err(e) => {
                self.log.error("Validation failed", e.message.clone());
                notifier.error(&e.message);
                return Err(e.into());
            }
        };

        let title = fields.title.clone();
        let written = match self.editing {
            Some(id) => {
                self.log.info(format!("Updating post: {}", title));
                table.update_news_post(id, &fields).await.map(|()| "updated")
            }
            None => {
                self.log.info(format!("Creating new post: {}", title));
                table
                    .insert_news_post(&NewNewsPost { fields, author_id })
                    .await
                    .map(|()| "created")
            }
        };

        match written {
            Ok(verb) => {
                self.log.success(format!("Post {}: {}", verb, title));
                notifier.success(&format!("Post {} successfully!", verb));
                self.cancel();
                // The write already succeeded and was reported; a failed
                // re-fetch is logged on its own.
                if let Err(e) = self.fetch_posts(table, notifier).await {
                    debug!("Re-fetch after save failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.log.error("Failed to save post", e.to_string());
                notifier.error("Failed to save post");
                Err(e.into())
            }
        }
    }

    /// Delete after confirmation. Without it nothing is sent and
    /// [`AdminError::Unconfirmed`] is returned.
    pub async fn delete<T: NewsTable + ?Sized>(
        &mut self,
        table: &T,
        id: Uuid,
        confirm: &dyn Confirm,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Err(AdminError::Unconfirmed);
        }

        self.log.info(format!("Deleting post: {}", id));
        match table.delete_news_post(id).await {
            Ok(()) => {
                self.log.success("Post deleted successfully");
                notifier.success("Post deleted successfully!");
                if let Err(e) = self.fetch_posts(table, notifier).await {
                    debug!("Re-fetch after delete failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.log.error("Failed to delete post", e.to_string());
                notifier.error("Failed to delete post");
                Err(e.into())
            }
        }
    }
}
