//! Share link issuance and administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kb_core::error::AppError;
use kb_core::result::AppResult;
use kb_core::types::{PageRequest, PageResponse, ShareLinkId};
use kb_database::{ArticleStore, ShareLinkStore};
use kb_entity::share::{NewShareLink, ShareLink, ShareLinkFilter, ShareLinkView, ShareTarget};

use super::settings::ShareSettingsService;
use super::token::TokenGenerator;
use crate::context::RequestContext;

/// Attempts at inserting a link before a token collision is surfaced.
const MAX_TOKEN_ATTEMPTS: u32 = 3;

/// Result of a successful link creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedShareLink {
    /// The stored link.
    pub link: ShareLink,
    /// Absolute URL that resolves the link.
    pub url: String,
    /// Links deactivated to stay within the per-target cap.
    pub evicted: Vec<ShareLinkId>,
}

/// Creates, lists, revokes, and purges share links.
#[derive(Debug, Clone)]
pub struct ShareLinkService {
    links: Arc<dyn ShareLinkStore>,
    articles: Arc<dyn ArticleStore>,
    settings: Arc<ShareSettingsService>,
    tokens: Arc<dyn TokenGenerator>,
    public_base_url: String,
}

impl ShareLinkService {
    /// Create a new share link service.
    pub fn new(
        links: Arc<dyn ShareLinkStore>,
        articles: Arc<dyn ArticleStore>,
        settings: Arc<ShareSettingsService>,
        tokens: Arc<dyn TokenGenerator>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            links,
            articles,
            settings,
            tokens,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a token.
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/s/{token}", self.public_base_url)
    }

    /// Issue a new link for `target`.
    ///
    /// `custom_expiry_hours` outside `(0, 8760]` silently falls back to the
    /// configured default. When the target already has the maximum number
    /// of valid links, the oldest are deactivated first.
    pub async fn create_link(
        &self,
        ctx: &RequestContext,
        target: ShareTarget,
        custom_expiry_hours: Option<i64>,
    ) -> AppResult<CreatedShareLink> {
        let settings = self.settings.get().await?;
        self.ensure_target_exists(&target).await?;

        let now = Utc::now();
        let expires_at = settings.expires_at(now, custom_expiry_hours);

        let mut attempt = 0;
        let inserted = loop {
            attempt += 1;
            let new_link = NewShareLink {
                id: ShareLinkId::new(),
                token: self.tokens.generate(),
                target,
                created_by: ctx.user_id(),
                created_at: now,
                expires_at,
            };

            match self
                .links
                .insert_with_cap(new_link, settings.max_shares_per_item, now)
                .await
            {
                Ok(inserted) => break inserted,
                Err(e) if e.is_token_collision() && attempt < MAX_TOKEN_ATTEMPTS => {
                    warn!(attempt, %target, "Share token collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        };

        if !inserted.evicted.is_empty() {
            info!(
                %target,
                evicted = inserted.evicted.len(),
                max_shares_per_item = settings.max_shares_per_item,
                "Evicted oldest share links"
            );
        }
        info!(
            link_id = %inserted.link.id,
            %target,
            token = %inserted.link.token_preview(),
            expires_at = %inserted.link.expires_at,
            created_by = ?inserted.link.created_by,
            "Share link created"
        );

        Ok(CreatedShareLink {
            url: self.share_url(&inserted.link.token),
            link: inserted.link,
            evicted: inserted.evicted,
        })
    }

    /// Deactivate the given links. Returns how many were active.
    pub async fn deactivate_all(&self, ids: &[ShareLinkId]) -> AppResult<u64> {
        let changed = self.links.deactivate_many(ids).await?;
        info!(requested = ids.len(), deactivated = changed, "Share links deactivated");
        Ok(changed)
    }

    /// Hard-delete links expired before now, with their view records.
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        self.cleanup_expired_at(Utc::now()).await
    }

    /// Hard-delete links with `expires_at < now`.
    pub async fn cleanup_expired_at(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let removed = self.links.delete_expired(now).await?;
        info!(removed, "Expired share links cleaned up");
        Ok(removed)
    }

    /// Links for the administrative listing, newest first.
    pub async fn list_links(
        &self,
        filter: &ShareLinkFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLink>> {
        self.links.list(filter, page, Utc::now()).await
    }

    /// Look up a link by ID.
    pub async fn get_link(&self, id: ShareLinkId) -> AppResult<ShareLink> {
        self.links
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share link {id} not found")))
    }

    /// View records of one link, newest first.
    pub async fn list_views(
        &self,
        id: ShareLinkId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLinkView>> {
        self.get_link(id).await?;
        self.links.list_views(id, page).await
    }

    async fn ensure_target_exists(&self, target: &ShareTarget) -> AppResult<()> {
        let article_id = target.article_id();
        if self.articles.find_article(article_id).await?.is_none() {
            return Err(AppError::not_found(format!("Article {article_id} not found")));
        }
        if let Some(paragraph_id) = target.paragraph_id() {
            let belongs = self
                .articles
                .find_paragraph(paragraph_id)
                .await?
                .is_some_and(|p| p.article_id == article_id);
            if !belongs {
                return Err(AppError::not_found(format!(
                    "Paragraph {paragraph_id} not found in article {article_id}"
                )));
            }
        }
        Ok(())
    }
}
