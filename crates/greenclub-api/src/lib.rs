//! HTTP surface of the club site: public content and news reads, sign-in,
//! and the admin panel operating on per-admin workspaces.

pub mod auth;
pub mod content;
pub mod error;
pub mod files;
pub mod middleware;
pub mod news;
pub mod state;
pub mod workspace;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};

use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

async fn health() -> &'static str {
    "ok"
}

/// All routes. CORS and request tracing are layered on by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/news", get(news::list_news))
        .route("/api/content", get(content::list_content))
        .route("/api/content/{section_key}", get(content::get_content))
        .route("/media/{bucket}/{key}", get(files::serve_media))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup));

    let signed_in_routes = Router::new()
        .route("/api/auth/session", get(auth::session))
        .layer(from_fn_with_state(state.clone(), require_auth));

    // Layers run bottom-up: auth first, then the admin check.
    let admin_routes = Router::new()
        .route(
            "/api/admin/workspace",
            post(workspace::mount).delete(workspace::unmount),
        )
        .route("/api/admin/content", get(content::get_drafts))
        .route("/api/admin/content/{section}", put(content::put_draft))
        .route("/api/admin/content/{section}/save", post(content::save_section))
        .route("/api/admin/content/about_page/values", post(content::add_value))
        .route(
            "/api/admin/content/about_page/values/{index}",
            put(content::set_value).delete(content::remove_value),
        )
        .route("/api/admin/news", get(news::get_screen))
        .route("/api/admin/news/form", put(news::put_form))
        .route("/api/admin/news/form/submit", post(news::submit_form))
        .route("/api/admin/news/form/cancel", post(news::cancel_form))
        .route("/api/admin/news/refresh", post(news::refresh))
        .route("/api/admin/news/{id}/edit", post(news::edit_post))
        .route("/api/admin/news/{id}", delete(news::delete_post))
        .route(
            "/api/admin/image",
            post(files::upload_image)
                .delete(files::remove_image)
                .layer(DefaultBodyLimit::max(files::UPLOAD_BODY_LIMIT)),
        )
        .route("/api/admin/image/url", put(files::set_image_url))
        .route(
            "/api/admin/activity",
            get(news::get_activity).delete(news::clear_activity),
        )
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(signed_in_routes)
        .merge(admin_routes)
        .with_state(state)
}
