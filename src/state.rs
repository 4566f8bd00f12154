use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{JwtKeys, PgUserStore, UserStore};
use crate::config::{AppConfig, StoreKind};
use crate::github::GithubClient;
use crate::memory::MemoryStore;
use crate::profiles::{PgProfileStore, ProfileStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub jwt: JwtKeys,
    pub github: GithubClient,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let (users, profiles): (Arc<dyn UserStore>, Arc<dyn ProfileStore>) = match config.store {
            StoreKind::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres store")?;
                let db = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                // Run migrations if present
                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }

                (
                    Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgProfileStore::new(db)) as Arc<dyn ProfileStore>,
                )
            }
            StoreKind::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                let store = MemoryStore::new();
                (
                    Arc::new(store.clone()) as Arc<dyn UserStore>,
                    Arc::new(store) as Arc<dyn ProfileStore>,
                )
            }
        };

        Ok(Self::from_parts(&config, users, profiles))
    }

    pub fn from_parts(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        if !jwt.has_secret() {
            tracing::warn!("JWT_SECRET is not set; registration and login will fail");
        }
        let github = GithubClient::new(config.github.clone());
        Self {
            users,
            profiles,
            jwt,
            github,
        }
    }

    /// State over a fresh in-memory store, for tests.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        Self::from_parts(&config, Arc::new(store.clone()), Arc::new(store))
    }

    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_memory("test-secret"))
    }
}
