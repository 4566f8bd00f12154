use anyhow::Context;
use serde::Deserialize;

/// Token lifetime used when `JWT_TTL_SECONDS` is not set (100 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 360_000;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// `None` when no secret is configured; signing then fails per request.
    pub secret: Option<String>,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "devconnect".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub github: GithubConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE").as_deref() {
            Ok("memory") => StoreKind::Memory,
            Ok("postgres") | Err(_) => StoreKind::Postgres,
            Ok(other) => anyhow::bail!("unknown STORE backend: {other}"),
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreKind::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE=postgres");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            ttl_seconds: std::env::var("JWT_TTL_SECONDS")
                .ok()
                .map(|v| v.parse::<i64>())
                .transpose()
                .context("JWT_TTL_SECONDS must be an integer")?
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
        };

        let defaults = GithubConfig::default();
        let github = GithubConfig {
            api_url: std::env::var("GITHUB_API_URL").unwrap_or(defaults.api_url),
            client_id: std::env::var("GITHUB_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("GITHUB_CLIENT_SECRET").unwrap_or_default(),
            user_agent: std::env::var("GITHUB_USER_AGENT").unwrap_or(defaults.user_agent),
        };

        Ok(Self {
            store,
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            jwt,
            github,
        })
    }

    /// Configuration for an in-process run with a fixed signing secret.
    pub fn for_memory(secret: &str) -> Self {
        Self {
            store: StoreKind::Memory,
            database_url: None,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: Some(secret.to_string()),
                ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            },
            github: GithubConfig::default(),
        }
    }
}
