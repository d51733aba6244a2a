//! Form rules checked before anything is sent to the backend. Rules run in
//! field order and the first failure wins.

use chrono::NaiveDate;
use url::Url;

use greenclub_types::models::{Category, NewsDraft, NewsFields};

use crate::error::ValidationError;

pub const TITLE_MAX: usize = 200;
pub const EXCERPT_MAX: usize = 500;
pub const CONTENT_MAX: usize = 10_000;
pub const IMAGE_URL_MAX: usize = 500;
pub const READ_TIME_MAX: usize = 20;

pub const EMAIL_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 100;
pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 100;

type Rule<T> = Result<T, ValidationError>;

/// Trim, require non-empty and cap the length (in characters).
fn required(field: &'static str, label: &str, value: &str, max: usize) -> Rule<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, format!("{} is required", label)));
    }
    at_most(field, label, value, max)?;
    Ok(value.to_string())
}

fn at_most(field: &'static str, label: &str, value: &str, max: usize) -> Rule<()> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be at most {} characters", label, max),
        ));
    }
    Ok(())
}

/// Empty, or an absolute http(s) URL.
fn optional_url(value: &str) -> Rule<Option<String>> {
    let value = value.trim();
    at_most("image_url", "Image URL", value, IMAGE_URL_MAX)?;
    if value.is_empty() {
        return Ok(None);
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(Some(value.to_string()))
        }
        _ => Err(ValidationError::new("image_url", "Must be a valid URL")),
    }
}

/// Check a news form and produce the trimmed write payload.
pub fn news_draft(draft: &NewsDraft) -> Rule<NewsFields> {
    let title = required("title", "Title", &draft.title, TITLE_MAX)?;
    let excerpt = required("excerpt", "Excerpt", &draft.excerpt, EXCERPT_MAX)?;
    let content = required("content", "Content", &draft.content, CONTENT_MAX)?;

    if draft.category.is_empty() {
        return Err(ValidationError::new("category", "Category is required"));
    }
    let category: Category = draft.category.parse().map_err(|_| {
        ValidationError::new(
            "category",
            "Category must be one of Project, Achievement, Event, Initiative",
        )
    })?;

    let image_url = optional_url(&draft.image_url)?;
    let read_time = required("read_time", "Read time", &draft.read_time, READ_TIME_MAX)?;

    if draft.published_date.is_empty() {
        return Err(ValidationError::new("published_date", "Date is required"));
    }
    let published_date = NaiveDate::parse_from_str(draft.published_date.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("published_date", "Date must be in YYYY-MM-DD format"))?;

    Ok(NewsFields {
        title,
        excerpt,
        content,
        category,
        image_url,
        read_time,
        published_date,
    })
}

/// Credentials after the sign-in rules passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn sign_in_form(email: &str, password: &str) -> Rule<Credentials> {
    let email = email.trim();
    if !is_email(email) {
        return Err(ValidationError::new("email", "Invalid email address"));
    }
    at_most("email", "Email", email, EMAIL_MAX)?;

    let length = password.chars().count();
    if length < PASSWORD_MIN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN),
        ));
    }
    at_most("password", "Password", password, PASSWORD_MAX)?;

    Ok(Credentials { email: email.to_string(), password: password.to_string() })
}

/// Sign-up adds a display name to the sign-in rules. Returns the trimmed
/// name alongside the credentials.
pub fn sign_up_form(email: &str, password: &str, full_name: &str) -> Rule<(Credentials, String)> {
    let credentials = sign_in_form(email, password)?;

    let full_name = full_name.trim();
    if full_name.chars().count() < FULL_NAME_MIN {
        return Err(ValidationError::new(
            "full_name",
            format!("Name must be at least {} characters", FULL_NAME_MIN),
        ));
    }
    at_most("full_name", "Name", full_name, FULL_NAME_MAX)?;

    Ok((credentials, full_name.to_string()))
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| !l.is_empty() && !l.starts_with('-') && !l.ends_with('-'))
        && labels.last().is_some_and(|tld| tld.len() >= 2)
}
