mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{
    HeaderName, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use greenclub_api::files::FILE_NAME_HEADER;
use greenclub_api::state::AppStateInner;
use greenclub_backend::{MemoryBackend, RestBackend, SharedBackend};

use crate::config::{BackendConfig, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greenclub=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let backend = build_backend(&config).await?;
    let state = AppStateInner::new(backend, config.jwt_secret.clone(), config.image_bucket.clone());

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, HeaderName::from_static(FILE_NAME_HEADER)])
        .allow_credentials(false);

    let app = greenclub_api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Green club server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_backend(config: &Config) -> anyhow::Result<SharedBackend> {
    match &config.backend {
        BackendConfig::Rest { url, anon_key } => {
            info!("Using hosted backend at {}", url);
            Ok(Arc::new(RestBackend::new(url, anon_key.clone())?))
        }
        BackendConfig::Memory { admin } => {
            warn!("Using the in-memory backend; nothing survives a restart");
            let backend = MemoryBackend::new(
                config.jwt_secret.clone(),
                format!("{}/media", config.public_url),
            );
            backend.seed_site_content().await;
            if let Some((email, password)) = admin {
                let user = backend.create_admin(email, password, "Club Admin").await?;
                info!("Seeded admin account {}", user.email);
            }
            Ok(Arc::new(backend))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
