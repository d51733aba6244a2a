use std::collections::VecDeque;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use greenclub_types::models::{ActivityEntry, ActivityKind};

/// Entries kept; older ones are dropped on append.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Recent admin operations, newest first. Lives as long as the admin
/// screen that owns it and is never persisted.
#[derive(Debug, Default, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ActivityKind, message: impl Into<String>, details: Option<String>) {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            message: message.into(),
            details,
        };
        match kind {
            ActivityKind::Error => error!(
                "activity: {} ({})",
                entry.message,
                entry.details.as_deref().unwrap_or("-")
            ),
            _ => info!("activity: {}", entry.message),
        }
        self.entries.push_front(entry);
        self.entries.truncate(ACTIVITY_LOG_CAPACITY);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ActivityKind::Info, message, None);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ActivityKind::Success, message, None);
    }

    pub fn error(&mut self, message: impl Into<String>, details: impl Into<String>) {
        self.push(ActivityKind::Error, message, Some(details.into()));
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.kind == ActivityKind::Error).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
