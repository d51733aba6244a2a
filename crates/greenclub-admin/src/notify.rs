use std::sync::Mutex;

use tracing::{info, warn};

use greenclub_types::models::{Notice, NoticeKind};

/// Receives the transient success/failure message of a user action.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::error(message));
    }
}

/// Collects notices raised while handling one request.
#[derive(Debug, Default)]
pub struct Notices {
    raised: Mutex<Vec<Notice>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<Notice> {
        match self.raised.lock() {
            Ok(mut raised) => std::mem::take(&mut *raised),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for Notices {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => info!("notice: {}", notice.message),
            NoticeKind::Error => warn!("notice: {}", notice.message),
        }
        match self.raised.lock() {
            Ok(mut raised) => raised.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
