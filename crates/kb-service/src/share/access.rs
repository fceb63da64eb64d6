//! Share token resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kb_core::result::AppResult;
use kb_core::types::ShareLinkId;
use kb_database::{ArticleStore, ShareLinkStore};
use kb_entity::article::{Article, Paragraph};
use kb_entity::share::{LinkState, ShareLink, ShareTarget};

use super::settings::ShareSettingsService;
use super::views::ViewRecorder;
use crate::context::RequestContext;

/// Content returned for a granted share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedContent {
    /// The link after any view was recorded.
    pub link: ShareLink,
    /// The shared article.
    pub article: Article,
    /// All paragraphs of the article, in order.
    pub paragraphs: Vec<Paragraph>,
    /// The shared paragraph, for paragraph-scoped links.
    pub paragraph: Option<Paragraph>,
}

/// Outcome of resolving a share token.
#[derive(Debug, Clone)]
pub enum ShareResolution {
    /// No such token, or the shared content no longer exists.
    NotFound,
    /// The link is past its expiry.
    Expired,
    /// The link was deactivated.
    Inactive,
    /// Anonymous visitor while settings require login.
    AuthRequired,
    /// Access granted.
    Granted(Box<SharedContent>),
}

impl ShareResolution {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
            Self::AuthRequired => "auth_required",
            Self::Granted(_) => "granted",
        }
    }
}

/// Resolves tokens into content, applying expiry, revocation, and login
/// policy in that order.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    links: Arc<dyn ShareLinkStore>,
    articles: Arc<dyn ArticleStore>,
    settings: Arc<ShareSettingsService>,
    views: ViewRecorder,
}

impl AccessResolver {
    /// Create a new resolver.
    pub fn new(
        links: Arc<dyn ShareLinkStore>,
        articles: Arc<dyn ArticleStore>,
        settings: Arc<ShareSettingsService>,
    ) -> Self {
        Self {
            views: ViewRecorder::new(Arc::clone(&links)),
            links,
            articles,
            settings,
        }
    }

    /// Resolve `token` for the caller in `ctx`.
    ///
    /// Only a granted resolution has side effects: with view tracking on,
    /// exactly one view is recorded per call. Unknown tokens resolve to
    /// [`ShareResolution::NotFound`] rather than an error.
    pub async fn resolve(&self, ctx: &RequestContext, token: &str) -> AppResult<ShareResolution> {
        let Some(link) = self.links.find_by_token(token).await? else {
            debug!("Unknown share token");
            return Ok(ShareResolution::NotFound);
        };

        let now = Utc::now();
        match link.state_at(now) {
            LinkState::Expired => return Ok(ShareResolution::Expired),
            LinkState::Inactive => return Ok(ShareResolution::Inactive),
            LinkState::Valid => {}
        }

        let settings = self.settings.get().await?;
        if settings.require_auth && !ctx.is_authenticated() {
            return Ok(ShareResolution::AuthRequired);
        }

        let Some((article, paragraphs, paragraph)) = self.load_content(&link.target).await? else {
            info!(link_id = %link.id, target = %link.target, "Shared content no longer exists");
            return Ok(ShareResolution::NotFound);
        };

        let link = if settings.track_views {
            match self.views.record(&link, ctx.viewer(), now).await? {
                Some(updated) => updated,
                None => return self.reclassify(link.id, now).await,
            }
        } else {
            link
        };

        Ok(ShareResolution::Granted(Box::new(SharedContent {
            link,
            article,
            paragraphs,
            paragraph,
        })))
    }

    /// State of a link that stopped being valid between lookup and view
    /// recording, e.g. deactivated by an administrator in that window.
    async fn reclassify(&self, id: ShareLinkId, now: DateTime<Utc>) -> AppResult<ShareResolution> {
        let resolution = match self.links.find_by_id(id).await? {
            None => ShareResolution::NotFound,
            Some(link) => match link.state_at(now) {
                LinkState::Expired => ShareResolution::Expired,
                LinkState::Inactive | LinkState::Valid => ShareResolution::Inactive,
            },
        };
        debug!(link_id = %id, outcome = resolution.label(), "Share link changed while resolving");
        Ok(resolution)
    }

    async fn load_content(
        &self,
        target: &ShareTarget,
    ) -> AppResult<Option<(Article, Vec<Paragraph>, Option<Paragraph>)>> {
        let Some(article) = self.articles.find_article(target.article_id()).await? else {
            return Ok(None);
        };

        let paragraphs = self.articles.list_paragraphs(article.id).await?;
        let paragraph = match target.paragraph_id() {
            Some(paragraph_id) => match paragraphs.iter().find(|p| p.id == paragraph_id) {
                Some(p) => Some(p.clone()),
                None => return Ok(None),
            },
            None => None,
        };

        Ok(Some((article, paragraphs, paragraph)))
    }
}
