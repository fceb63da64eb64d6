//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use kb_auth::JwtDecoder;
use kb_cache::CacheManager;
use kb_core::config::AppConfig;
use kb_core::result::AppResult;
use kb_database::Stores;
use kb_service::{
    AccessResolver, ArticleService, EngagementService, SecureTokenGenerator, ShareLinkService,
    ShareSettingsService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// When this process started serving
    pub started_at: DateTime<Utc>,

    // ── Infrastructure ───────────────────────────────────────
    /// Store backend (PostgreSQL or in-memory)
    pub stores: Stores,
    /// Cache manager
    pub cache: Arc<CacheManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Browsing, search, and content seeding
    pub article_service: Arc<ArticleService>,
    /// Ratings, comments, paragraph votes
    pub engagement_service: Arc<EngagementService>,
    /// Share link issuance and administration
    pub share_link_service: Arc<ShareLinkService>,
    /// Cached share settings
    pub share_settings_service: Arc<ShareSettingsService>,
    /// Share token resolution
    pub access_resolver: Arc<AccessResolver>,
}

impl AppState {
    /// Wire every service over the given stores.
    pub fn build(config: AppConfig, stores: Stores) -> AppResult<Self> {
        let cache = Arc::new(CacheManager::new(&config.cache)?);
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let share_settings_service = Arc::new(ShareSettingsService::new(
            Arc::clone(&stores.share_settings),
            Arc::clone(&cache),
        ));
        let share_link_service = Arc::new(ShareLinkService::new(
            Arc::clone(&stores.share_links),
            Arc::clone(&stores.articles),
            Arc::clone(&share_settings_service),
            Arc::new(SecureTokenGenerator),
            config.share.public_base_url.clone(),
        ));
        let access_resolver = Arc::new(AccessResolver::new(
            Arc::clone(&stores.share_links),
            Arc::clone(&stores.articles),
            Arc::clone(&share_settings_service),
        ));
        let article_service = Arc::new(ArticleService::new(Arc::clone(&stores.articles)));
        let engagement_service = Arc::new(EngagementService::new(
            Arc::clone(&stores.engagement),
            Arc::clone(&stores.articles),
        ));

        Ok(Self {
            config: Arc::new(config),
            started_at: Utc::now(),
            stores,
            cache,
            jwt_decoder,
            article_service,
            engagement_service,
            share_link_service,
            share_settings_service,
            access_resolver,
        })
    }
}
