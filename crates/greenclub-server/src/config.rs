use std::env;

use anyhow::{Context, bail};

use greenclub_admin::upload::DEFAULT_BUCKET;

/// Placeholder JWT secrets that must not reach a real backend.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEV_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub enum BackendConfig {
    Rest { url: String, anon_key: String },
    Memory {
        /// Seeded admin account, when both halves are set.
        admin: Option<(String, String)>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendConfig,
    pub jwt_secret: String,
    pub image_bucket: String,
    pub public_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("GREENCLUB_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("GREENCLUB_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("GREENCLUB_PORT must be a port number")?;

        let jwt_secret = var("GREENCLUB_JWT_SECRET");
        let backend = match var("GREENCLUB_BACKEND").as_deref().unwrap_or("memory") {
            "rest" => BackendConfig::Rest {
                url: var("GREENCLUB_BACKEND_URL")
                    .context("GREENCLUB_BACKEND_URL is required for the rest backend")?,
                anon_key: var("GREENCLUB_BACKEND_ANON_KEY")
                    .context("GREENCLUB_BACKEND_ANON_KEY is required for the rest backend")?,
            },
            "memory" => BackendConfig::Memory {
                admin: var("GREENCLUB_ADMIN_EMAIL").zip(var("GREENCLUB_ADMIN_PASSWORD")),
            },
            other => bail!("Unknown GREENCLUB_BACKEND '{}', expected rest or memory", other),
        };

        let jwt_secret = match (&backend, jwt_secret) {
            (BackendConfig::Rest { .. }, Some(secret))
                if !PLACEHOLDER_SECRETS.contains(&secret.as_str()) =>
            {
                secret
            }
            (BackendConfig::Rest { .. }, _) => {
                bail!("GREENCLUB_JWT_SECRET is unset or still a placeholder; it must match the backend's JWT secret")
            }
            (BackendConfig::Memory { .. }, secret) => secret.unwrap_or_else(|| DEV_SECRET.into()),
        };

        let image_bucket = var("GREENCLUB_IMAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.into());
        let public_url = var("GREENCLUB_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self { host, port, backend, jwt_secret, image_bucket, public_url })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_memory_backend() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.image_bucket, "news-images");
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.jwt_secret, DEV_SECRET);
        assert!(matches!(config.backend, BackendConfig::Memory { admin: None }));
    }

    #[test]
    fn memory_admin_needs_both_halves() {
        let config = load(&[("GREENCLUB_ADMIN_EMAIL", "admin@example.org")]).unwrap();
        assert!(matches!(config.backend, BackendConfig::Memory { admin: None }));

        let config = load(&[
            ("GREENCLUB_ADMIN_EMAIL", "admin@example.org"),
            ("GREENCLUB_ADMIN_PASSWORD", "hunter22"),
        ])
        .unwrap();
        match config.backend {
            BackendConfig::Memory { admin: Some((email, _)) } => assert_eq!(email, "admin@example.org"),
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn rest_refuses_placeholder_secret() {
        let rest = [
            ("GREENCLUB_BACKEND", "rest"),
            ("GREENCLUB_BACKEND_URL", "https://project.example.co"),
            ("GREENCLUB_BACKEND_ANON_KEY", "anon"),
        ];
        assert!(load(&rest).is_err());

        let mut with_placeholder = rest.to_vec();
        with_placeholder.push(("GREENCLUB_JWT_SECRET", "dev-secret-change-me"));
        assert!(load(&with_placeholder).is_err());

        let mut with_secret = rest.to_vec();
        with_secret.push(("GREENCLUB_JWT_SECRET", "a-real-secret"));
        let config = load(&with_secret).unwrap();
        assert_eq!(config.jwt_secret, "a-real-secret");
        assert!(matches!(config.backend, BackendConfig::Rest { .. }));
    }

    #[test]
    fn rest_requires_url() {
        let err = load(&[("GREENCLUB_BACKEND", "rest"), ("GREENCLUB_JWT_SECRET", "s")]).unwrap_err();
        assert!(err.to_string().contains("GREENCLUB_BACKEND_URL"));
    }

    #[test]
    fn rejects_unknown_backend_and_bad_port() {
        assert!(load(&[("GREENCLUB_BACKEND", "sqlite")]).is_err());
        assert!(load(&[("GREENCLUB_PORT", "http")]).is_err());
    }

    #[test]
    fn public_url_loses_trailing_slash() {
        let config = load(&[("GREENCLUB_PUBLIC_URL", "https://club.example.org/")]).unwrap();
        assert_eq!(config.public_url, "https://club.example.org");
    }
}
