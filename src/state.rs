use std::sync::Arc;

use crate::{
    auth::{guard::AccessGuard, jwt::JwtKeys, services::CredentialService},
    config::AppConfig,
    db,
    users::{
        memory::MemoryUserStore,
        repo::{PgUserStore, UserStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: CredentialService,
    pub guard: AccessGuard,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => {
                let pool = db::connect(url).await?;
                db::migrate(&pool).await;
                Arc::new(PgUserStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory");
                Arc::new(MemoryUserStore::new())
            }
        };

        Ok(Self::from_parts(config, store))
    }

    /// Wires the credential service and guard around one set of keys.
    pub fn from_parts(config: AppConfig, store: Arc<dyn UserStore>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            config: Arc::new(config),
            credentials: CredentialService::new(store, keys.clone()),
            guard: AccessGuard::new(keys),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(config, Arc::new(MemoryUserStore::new()))
    }
}
