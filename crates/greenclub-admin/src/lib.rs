//! Admin-side state and operations of the club site: the cached content
//! repository, the section content editor, the news post screen with its
//! activity log, the image upload widget and the sign-in form contract.
//!
//! Screen state lives in plain structs owned by whoever mounted the screen.
//! Nothing here is process-global.

pub mod activity;
pub mod auth;
pub mod content;
pub mod editor;
pub mod error;
pub mod news;
pub mod notify;
pub mod upload;
pub mod validate;

pub use error::{AdminError, ValidationError};
pub use notify::{Notices, Notifier};
