use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore, Store};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = if config.is_memory() {
            warn!("using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new()) as Arc<dyn Store>
        } else {
            let pg = PgStore::connect(&config.database_url, config.max_connections).await?;
            pg.ensure_schema().await?;
            info!(max_connections = config.max_connections, "connected to postgres");
            Arc::new(pg) as Arc<dyn Store>
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database_url: crate::config::MEMORY_DATABASE_URL.into(),
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 1,
        });
        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
