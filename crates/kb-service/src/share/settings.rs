//! Cached access to the share settings singleton.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use kb_cache::CacheManager;
use kb_cache::keys;
use kb_core::result::AppResult;
use kb_core::traits::CacheProvider;
use kb_database::ShareSettingsStore;
use kb_entity::share::{ShareSettings, UpdateShareSettings};

/// Loads and updates the share policy.
///
/// The cache holds a copy of the row that is only trusted while its
/// `updated_at` matches the store, so an update made by another process
/// (the CLI, another server) is seen on the next read. Cache failures
/// degrade to a store read and never fail the call.
#[derive(Debug, Clone)]
pub struct ShareSettingsService {
    store: Arc<dyn ShareSettingsStore>,
    cache: Arc<CacheManager>,
}

impl ShareSettingsService {
    /// Create a new settings service.
    pub fn new(store: Arc<dyn ShareSettingsStore>, cache: Arc<CacheManager>) -> Self {
        Self { store, cache }
    }

    /// Current settings, created with defaults on first access.
    pub async fn get(&self) -> AppResult<ShareSettings> {
        let key = keys::share_settings();
        match self.cache.get_json::<ShareSettings>(&key).await {
            Ok(Some(cached)) => {
                if self.store.last_updated().await? == Some(cached.updated_at) {
                    return Ok(cached);
                }
                debug!("Cached share settings are stale");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Share settings cache read failed"),
        }

        let settings = self.store.get_or_create(Utc::now()).await?;
        if let Err(e) = self.cache.set_json(&key, &settings).await {
            warn!(error = %e, "Share settings cache write failed");
        }
        Ok(settings)
    }

    /// Apply an administrative update.
    pub async fn update(&self, update: UpdateShareSettings) -> AppResult<ShareSettings> {
        update.validate()?;
        if update.is_empty() {
            return self.get().await;
        }

        let settings = self.store.update(&update, Utc::now()).await?;
        if let Err(e) = self.cache.delete(&keys::share_settings()).await {
            warn!(error = %e, "Share settings cache invalidation failed");
        }

        info!(
            expiry_hours = settings.expiry_hours,
            max_shares_per_item = settings.max_shares_per_item,
            require_auth = settings.require_auth,
            track_views = settings.track_views,
            "Share settings updated"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use kb_core::config::CacheConfig;
    use kb_core::error::ErrorKind;
    use kb_database::MemoryStore;

    use super::*;

    fn service() -> ShareSettingsService {
        let cache = CacheManager::new(&CacheConfig::default()).unwrap();
        ShareSettingsService::new(Arc::new(MemoryStore::new()), Arc::new(cache))
    }

    #[tokio::test]
    async fn test_first_read_yields_defaults() {
        let settings = service().get().await.unwrap();
        assert_eq!(settings.expiry_hours, 24);
        assert_eq!(settings.max_shares_per_item, 100);
        assert!(!settings.require_auth);
        assert!(settings.track_views);
    }

    #[tokio::test]
    async fn test_update_is_visible_through_cache() {
        let service = service();
        service.get().await.unwrap();

        service
            .update(UpdateShareSettings {
                require_auth: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(service.get().await.unwrap().require_auth);
    }

    #[tokio::test]
    async fn test_update_from_another_process_is_seen() {
        let store = MemoryStore::new();
        let cache = || Arc::new(CacheManager::new(&CacheConfig::default()).unwrap());
        let server = ShareSettingsService::new(Arc::new(store.clone()), cache());
        let operator = ShareSettingsService::new(Arc::new(store), cache());

        assert!(!server.get().await.unwrap().require_auth);

        operator
            .update(UpdateShareSettings {
                require_auth: Some(true),
                max_shares_per_item: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        let seen = server.get().await.unwrap();
        assert!(seen.require_auth);
        assert_eq!(seen.max_shares_per_item, 3);
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected() {
        let err = service()
            .update(UpdateShareSettings {
                expiry_hours: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
