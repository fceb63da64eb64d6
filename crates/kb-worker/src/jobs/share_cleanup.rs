//! Purges expired share links and their view records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use kb_service::ShareLinkService;

use crate::executor::{JobExecutionError, JobHandler, JobRun};

/// Job type name of the share cleanup.
pub const SHARE_CLEANUP: &str = "share_cleanup";

/// Deletes links whose expiry is before the run's trigger time.
#[derive(Debug)]
pub struct ShareCleanupHandler {
    links: Arc<ShareLinkService>,
}

impl ShareCleanupHandler {
    /// Create a new share cleanup handler
    pub fn new(links: Arc<ShareLinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl JobHandler for ShareCleanupHandler {
    fn job_type(&self) -> &str {
        SHARE_CLEANUP
    }

    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let removed = self
            .links
            .cleanup_expired_at(run.triggered_at)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Share cleanup failed: {e}")))?;

        Ok(Some(serde_json::json!({
            "task": SHARE_CLEANUP,
            "removed": removed,
        })))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use kb_cache::CacheManager;
    use kb_core::config::CacheConfig;
    use kb_core::types::ShareLinkId;
    use kb_database::{ArticleStore, MemoryStore, ShareLinkStore};
    use kb_entity::article::{CreateArticle, CreateCategory};
    use kb_entity::share::{NewShareLink, ShareTarget};
    use kb_service::{SecureTokenGenerator, ShareSettingsService};

    use super::*;

    #[tokio::test]
    async fn test_removes_expired_links_once() {
        let store = MemoryStore::new();
        let category = store
            .create_category(&CreateCategory {
                name: "Ops".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let article = store
            .create_article(&CreateArticle {
                category_id: category.id,
                title: "Backups".to_string(),
                summary: String::new(),
                content: String::new(),
                tags: Vec::new(),
            })
            .await
            .unwrap();

        let created_at = Utc::now() - Duration::hours(2);
        for (token, lifetime) in [("gone", 1), ("kept", 48)] {
            store
                .insert_with_cap(
                    NewShareLink {
                        id: ShareLinkId::new(),
                        token: token.to_string(),
                        target: ShareTarget::article(article.id),
                        created_by: None,
                        created_at,
                        expires_at: created_at + Duration::hours(lifetime),
                    },
                    100,
                    created_at,
                )
                .await
                .unwrap();
        }

        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).unwrap());
        let settings = Arc::new(ShareSettingsService::new(Arc::new(store.clone()), cache));
        let links = Arc::new(ShareLinkService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            settings,
            Arc::new(SecureTokenGenerator),
            "http://localhost:8080",
        ));
        let handler = ShareCleanupHandler::new(links);

        let summary = handler.execute(&JobRun::now(SHARE_CLEANUP)).await.unwrap();
        assert_eq!(summary.unwrap()["removed"], 1);

        let summary = handler.execute(&JobRun::now(SHARE_CLEANUP)).await.unwrap();
        assert_eq!(summary.unwrap()["removed"], 0);
        assert!(store.find_by_token("kept").await.unwrap().is_some());
    }
}
