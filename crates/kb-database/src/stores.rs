//! Backend selection.

use std::sync::Arc;

use tracing::info;

use kb_core::config::{DatabaseBackend, DatabaseConfig};
use kb_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{
    ArticleRepository, EngagementRepository, ShareLinkRepository, ShareSettingsRepository,
};
use crate::traits::{ArticleStore, EngagementStore, ShareLinkStore, ShareSettingsStore};

/// The set of stores the services are built from.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Categories, articles, paragraphs.
    pub articles: Arc<dyn ArticleStore>,
    /// Share links and view records.
    pub share_links: Arc<dyn ShareLinkStore>,
    /// Share settings singleton.
    pub share_settings: Arc<dyn ShareSettingsStore>,
    /// Ratings, comments, paragraph likes.
    pub engagement: Arc<dyn EngagementStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Build the configured backend. PostgreSQL pools are migrated before use.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                run_migrations(pool.pool()).await?;
                Ok(Self::postgres(pool))
            }
            DatabaseBackend::Memory => {
                info!("Using in-memory stores; data is lost on exit");
                Ok(Self::memory())
            }
        }
    }

    /// Repositories over an open PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            articles: Arc::new(ArticleRepository::new(pg.clone())),
            share_links: Arc::new(ShareLinkRepository::new(pg.clone())),
            share_settings: Arc::new(ShareSettingsRepository::new(pg.clone())),
            engagement: Arc::new(EngagementRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-memory stores sharing one state.
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Stores backed by an existing in-memory state.
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            articles: Arc::new(store.clone()),
            share_links: Arc::new(store.clone()),
            share_settings: Arc::new(store.clone()),
            engagement: Arc::new(store),
            pool: None,
        }
    }

    /// The PostgreSQL pool, when that backend is in use.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Which backend serves these stores.
    pub fn backend(&self) -> DatabaseBackend {
        if self.pool.is_some() {
            DatabaseBackend::Postgres
        } else {
            DatabaseBackend::Memory
        }
    }

    /// Whether the backing database answers.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release database connections.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_is_healthy() {
        let stores = Stores::connect(&DatabaseConfig {
            backend: DatabaseBackend::Memory,
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(stores.backend(), DatabaseBackend::Memory);
        assert!(stores.health_check().await.unwrap());
        assert!(stores.pool().is_none());
    }
}
