//! Scenario tests for the share subsystem over the in-memory store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use kb_cache::CacheManager;
use kb_core::config::CacheConfig;
use kb_core::error::ErrorKind;
use kb_core::result::AppResult;
use kb_core::types::{ArticleId, PageRequest, PageResponse, ShareLinkId, UserId};
use kb_database::{ArticleStore, MemoryStore, ShareLinkStore};
use kb_entity::article::{Article, CreateArticle, CreateCategory, CreateParagraph, Paragraph};
use kb_entity::share::{
    NewShareLink, ShareLink, ShareLinkFilter, ShareLinkInsert, ShareLinkView, ShareTarget,
    UpdateShareSettings, ViewerInfo,
};
use kb_entity::user::{AuthenticatedUser, UserRole};

use super::*;
use crate::context::RequestContext;

/// Hands out scripted tokens first, then random ones.
#[derive(Debug, Default)]
struct ScriptedTokens {
    queue: Mutex<VecDeque<String>>,
}

impl ScriptedTokens {
    fn new(tokens: &[&str]) -> Self {
        Self {
            queue: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
        }
    }
}

impl TokenGenerator for ScriptedTokens {
    fn generate(&self) -> String {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| SecureTokenGenerator.generate())
    }
}

struct Fixture {
    store: MemoryStore,
    settings: Arc<ShareSettingsService>,
    links: ShareLinkService,
    resolver: AccessResolver,
    article: Article,
    paragraphs: Vec<Paragraph>,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_tokens(SecureTokenGenerator).await
    }

    async fn with_tokens(tokens: impl TokenGenerator) -> Self {
        let store = MemoryStore::new();
        let category = store
            .create_category(&CreateCategory {
                name: "Runbooks".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let article = store
            .create_article(&CreateArticle {
                category_id: category.id,
                title: "Rotating credentials".to_string(),
                summary: "How to rotate".to_string(),
                content: String::new(),
                tags: vec!["security".to_string()],
            })
            .await
            .unwrap();
        let mut paragraphs = Vec::new();
        for content in ["Revoke the old key.", "Issue a new key."] {
            paragraphs.push(
                store
                    .create_paragraph(&CreateParagraph {
                        article_id: article.id,
                        title: None,
                        content: content.to_string(),
                        position: None,
                    })
                    .await
                    .unwrap(),
            );
        }

        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).unwrap());
        let settings = Arc::new(ShareSettingsService::new(Arc::new(store.clone()), cache));
        let links = ShareLinkService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::clone(&settings),
            Arc::new(tokens),
            "https://kb.example.com/",
        );
        let resolver = AccessResolver::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::clone(&settings),
        );

        Self {
            store,
            settings,
            links,
            resolver,
            article,
            paragraphs,
        }
    }

    fn article_target(&self) -> ShareTarget {
        ShareTarget::article(self.article.id)
    }

    async fn set(&self, update: UpdateShareSettings) {
        self.settings.update(update).await.unwrap();
    }
}

fn anonymous() -> RequestContext {
    RequestContext::new(None, "198.51.100.4".to_string(), "Mozilla/5.0".to_string(), None)
}

fn signed_in() -> RequestContext {
    RequestContext::new(
        Some(AuthenticatedUser {
            user_id: UserId::new(),
            username: "reader".to_string(),
            role: UserRole::Reader,
        }),
        "198.51.100.5".to_string(),
        "Mozilla/5.0".to_string(),
        Some("https://intranet.example.com/".to_string()),
    )
}

#[tokio::test]
async fn test_created_link_expires_after_creation() {
    let fx = Fixture::new().await;
    let created = fx
        .links
        .create_link(&signed_in(), fx.article_target(), None)
        .await
        .unwrap();

    let link = &created.link;
    assert!(link.expires_at > link.created_at);
    assert_eq!(link.expires_at - link.created_at, Duration::hours(24));
    assert!(link.is_active);
    assert_eq!(link.view_count, 0);
    assert!(link.created_by.is_some());
    assert_eq!(created.url, format!("https://kb.example.com/s/{}", link.token));
}

#[tokio::test]
async fn test_custom_expiry_within_range_is_used() {
    let fx = Fixture::new().await;
    let created = fx
        .links
        .create_link(&anonymous(), fx.article_target(), Some(2))
        .await
        .unwrap();
    assert_eq!(created.link.expires_at - created.link.created_at, Duration::hours(2));
    assert!(created.link.created_by.is_none());
}

#[tokio::test]
async fn test_out_of_range_custom_expiry_uses_default() {
    let fx = Fixture::new().await;
    let created = fx
        .links
        .create_link(&anonymous(), fx.article_target(), Some(9000))
        .await
        .unwrap();
    assert_eq!(created.link.expires_at - created.link.created_at, Duration::hours(24));
}

#[tokio::test]
async fn test_third_link_evicts_first_at_cap_two() {
    let fx = Fixture::new().await;
    fx.set(UpdateShareSettings {
        max_shares_per_item: Some(2),
        ..Default::default()
    })
    .await;

    let ctx = anonymous();
    let first = fx.links.create_link(&ctx, fx.article_target(), None).await.unwrap();
    let second = fx.links.create_link(&ctx, fx.article_target(), None).await.unwrap();
    let third = fx.links.create_link(&ctx, fx.article_target(), None).await.unwrap();

    assert_eq!(third.evicted, vec![first.link.id]);

    let now = Utc::now();
    let first = fx.links.get_link(first.link.id).await.unwrap();
    let second = fx.links.get_link(second.link.id).await.unwrap();
    assert!(!first.is_valid_at(now));
    assert!(second.is_valid_at(now));
    assert!(third.link.is_valid_at(now));
    assert_eq!(fx.store.count_valid(&fx.article_target(), now).await.unwrap(), 2);
}

#[tokio::test]
async fn test_valid_links_never_exceed_cap() {
    let fx = Fixture::new().await;
    fx.set(UpdateShareSettings {
        max_shares_per_item: Some(3),
        ..Default::default()
    })
    .await;

    for _ in 0..7 {
        fx.links
            .create_link(&anonymous(), fx.article_target(), None)
            .await
            .unwrap();
        let valid = fx
            .store
            .count_valid(&fx.article_target(), Utc::now())
            .await
            .unwrap();
        assert!(valid <= 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_respects_cap() {
    let fx = Fixture::new().await;
    fx.set(UpdateShareSettings {
        max_shares_per_item: Some(3),
        ..Default::default()
    })
    .await;

    let tasks: Vec<_> = (0..24)
        .map(|_| {
            let links = fx.links.clone();
            let target = fx.article_target();
            tokio::spawn(async move { links.create_link(&anonymous(), target, None).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let valid = fx
        .store
        .count_valid(&fx.article_target(), Utc::now())
        .await
        .unwrap();
    assert_eq!(valid, 3);

    let all = fx
        .store
        .list(&ShareLinkFilter::default(), &PageRequest::new(1, 100), Utc::now())
        .await
        .unwrap();
    assert_eq!(all.total_items, 24);
}

#[tokio::test]
async fn test_article_and_paragraph_links_have_separate_caps() {
    let fx = Fixture::new().await;
    fx.set(UpdateShareSettings {
        max_shares_per_item: Some(1),
        ..Default::default()
    })
    .await;

    let paragraph = ShareTarget::paragraph(fx.article.id, fx.paragraphs[0].id);
    let whole = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();
    let part = fx.links.create_link(&anonymous(), paragraph, None).await.unwrap();

    assert!(part.evicted.is_empty());
    assert!(fx.links.get_link(whole.link.id).await.unwrap().is_active);
}

#[tokio::test]
async fn test_unknown_targets_are_rejected() {
    let fx = Fixture::new().await;

    let err = fx
        .links
        .create_link(&anonymous(), ShareTarget::article(ArticleId::new()), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let other = ArticleId::new();
    let err = fx
        .links
        .create_link(
            &anonymous(),
            ShareTarget::paragraph(other, fx.paragraphs[0].id),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_token_collision_is_retried() {
    let fx = Fixture::with_tokens(ScriptedTokens::new(&["taken", "taken", "fresh"])).await;

    let first = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();
    let second = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();

    assert_eq!(first.link.token, "taken");
    assert_eq!(second.link.token, "fresh");
}

#[tokio::test]
async fn test_persistent_collision_surfaces_after_three_attempts() {
    let fx = Fixture::with_tokens(ScriptedTokens::new(&["same", "same", "same", "same"])).await;

    fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();
    let err = fx
        .links
        .create_link(&anonymous(), fx.article_target(), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::TokenCollision);
    let listed = fx
        .links
        .list_links(&ShareLinkFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total_items, 1);
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let fx = Fixture::new().await;
    let resolution = fx.resolver.resolve(&anonymous(), "abc").await.unwrap();
    assert!(matches!(resolution, ShareResolution::NotFound));
}

#[tokio::test]
async fn test_two_resolutions_record_two_views() {
    let fx = Fixture::new().await;
    let created = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();

    let ctx = signed_in();
    fx.resolver.resolve(&ctx, &created.link.token).await.unwrap();
    let resolution = fx.resolver.resolve(&ctx, &created.link.token).await.unwrap();

    let ShareResolution::Granted(content) = resolution else {
        panic!("expected granted, got {}", resolution.label());
    };
    assert_eq!(content.link.view_count, 2);
    assert!(content.link.last_accessed_at.is_some());
    assert_eq!(content.article.id, fx.article.id);
    assert_eq!(content.paragraphs.len(), 2);
    assert!(content.paragraph.is_none());

    let views = fx
        .links
        .list_views(created.link.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(views.total_items, 2);
    assert_eq!(views.items[0].ip_address, "198.51.100.5");
    assert_eq!(
        views.items[0].referrer.as_deref(),
        Some("https://intranet.example.com/")
    );
}

#[tokio::test]
async fn test_view_tracking_can_be_disabled() {
    let fx = Fixture::new().await;
    fx.set(UpdateShareSettings {
        track_views: Some(false),
        ..Default::default()
    })
    .await;
    let created = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();

    let resolution = fx.resolver.resolve(&anonymous(), &created.link.token).await.unwrap();

    assert!(matches!(resolution, ShareResolution::Granted(_)));
    assert_eq!(fx.links.get_link(created.link.id).await.unwrap().view_count, 0);
}

#[tokio::test]
async fn test_paragraph_link_carries_paragraph() {
    let fx = Fixture::new().await;
    let target = ShareTarget::paragraph(fx.article.id, fx.paragraphs[1].id);
    let created = fx.links.create_link(&anonymous(), target, None).await.unwrap();

    let resolution = fx.resolver.resolve(&anonymous(), &created.link.token).await.unwrap();
    let ShareResolution::Granted(content) = resolution else {
        panic!("expected granted, got {}", resolution.label());
    };
    assert_eq!(content.paragraph.map(|p| p.id), Some(fx.paragraphs[1].id));
}

#[tokio::test]
async fn test_expired_link_records_nothing() {
    let fx = Fixture::new().await;
    let created_at = Utc::now() - Duration::hours(3);
    let stale = fx
        .store
        .insert_with_cap(
            NewShareLink {
                id: ShareLinkId::new(),
                token: "stale-token".to_string(),
                target: fx.article_target(),
                created_by: None,
                created_at,
                expires_at: created_at + Duration::hours(1),
            },
            100,
            created_at,
        )
        .await
        .unwrap();

    let resolution = fx.resolver.resolve(&signed_in(), "stale-token").await.unwrap();

    assert!(matches!(resolution, ShareResolution::Expired));
    assert_eq!(fx.links.get_link(stale.link.id).await.unwrap().view_count, 0);
    let views = fx
        .links
        .list_views(stale.link.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(views.total_items, 0);
}

#[tokio::test]
async fn test_deactivated_link_is_inactive() {
    let fx = Fixture::new().await;
    let created = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();

    assert_eq!(fx.links.deactivate_all(&[created.link.id]).await.unwrap(), 1);
    let resolution = fx.resolver.resolve(&anonymous(), &created.link.token).await.unwrap();

    assert!(matches!(resolution, ShareResolution::Inactive));
}

/// Deactivates a link right before its view is recorded, standing in for
/// an administrator acting while a resolution is in flight.
#[derive(Debug, Clone)]
struct RevokeBeforeView(MemoryStore);

#[async_trait]
impl ShareLinkStore for RevokeBeforeView {
    async fn insert_with_cap(
        &self,
        link: NewShareLink,
        max_valid: u32,
        now: DateTime<Utc>,
    ) -> AppResult<ShareLinkInsert> {
        self.0.insert_with_cap(link, max_valid, now).await
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        self.0.find_by_token(token).await
    }

    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        self.0.find_by_id(id).await
    }

    async fn list(
        &self,
        filter: &ShareLinkFilter,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<ShareLink>> {
        self.0.list(filter, page, now).await
    }

    async fn count_valid(&self, target: &ShareTarget, now: DateTime<Utc>) -> AppResult<u64> {
        self.0.count_valid(target, now).await
    }

    async fn record_view(
        &self,
        link_id: ShareLinkId,
        viewer: ViewerInfo,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>> {
        self.0.deactivate_many(&[link_id]).await?;
        self.0.record_view(link_id, viewer, now).await
    }

    async fn list_views(
        &self,
        link_id: ShareLinkId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLinkView>> {
        self.0.list_views(link_id, page).await
    }

    async fn deactivate_many(&self, ids: &[ShareLinkId]) -> AppResult<u64> {
        self.0.deactivate_many(ids).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.0.delete_expired(now).await
    }
}

#[tokio::test]
async fn test_link_revoked_during_resolution_is_inactive() {
    let fx = Fixture::new().await;
    let created = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();
    let resolver = AccessResolver::new(
        Arc::new(RevokeBeforeView(fx.store.clone())),
        Arc::new(fx.store.clone()),
        Arc::clone(&fx.settings),
    );

    let resolution = resolver.resolve(&anonymous(), &created.link.token).await.unwrap();
    assert!(matches!(resolution, ShareResolution::Inactive));

    let link = fx.links.get_link(created.link.id).await.unwrap();
    assert_eq!(link.view_count, 0);
    let views = fx
        .links
        .list_views(created.link.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(views.total_items, 0);
}

#[tokio::test]
async fn test_anonymous_visitor_must_log_in_when_required() {
    let fx = Fixture::new().await;
    let created = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();
    fx.set(UpdateShareSettings {
        require_auth: Some(true),
        ..Default::default()
    })
    .await;

    let anonymous_result = fx.resolver.resolve(&anonymous(), &created.link.token).await.unwrap();
    assert!(matches!(anonymous_result, ShareResolution::AuthRequired));
    assert_eq!(fx.links.get_link(created.link.id).await.unwrap().view_count, 0);

    let signed_in_result = fx.resolver.resolve(&signed_in(), &created.link.token).await.unwrap();
    assert!(matches!(signed_in_result, ShareResolution::Granted(_)));
}

#[tokio::test]
async fn test_cleanup_removes_only_expired_and_is_idempotent() {
    let fx = Fixture::new().await;
    let live = fx.links.create_link(&anonymous(), fx.article_target(), None).await.unwrap();
    let created_at = Utc::now() - Duration::hours(5);
    fx.store
        .insert_with_cap(
            NewShareLink {
                id: ShareLinkId::new(),
                token: "old".to_string(),
                target: fx.article_target(),
                created_by: None,
                created_at,
                expires_at: created_at + Duration::hours(1),
            },
            100,
            created_at,
        )
        .await
        .unwrap();

    assert_eq!(fx.links.cleanup_expired().await.unwrap(), 1);
    assert_eq!(fx.links.cleanup_expired().await.unwrap(), 0);
    assert!(fx.links.get_link(live.link.id).await.is_ok());
}

#[tokio::test]
async fn test_list_views_of_unknown_link_is_not_found() {
    let fx = Fixture::new().await;
    let err = fx
        .links
        .list_views(ShareLinkId::new(), &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
