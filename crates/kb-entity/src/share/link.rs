//! Share link entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kb_core::types::{ArticleId, ShareLinkId, UserId};

use super::target::ShareTarget;

/// Validity of a link at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// Active and not yet expired.
    Valid,
    /// `now >= expires_at`, regardless of the active flag.
    Expired,
    /// Not expired but deactivated (evicted or revoked).
    Inactive,
}

/// A token granting time-limited access to an article or paragraph.
///
/// Only `is_active`, `view_count`, and `last_accessed_at` change after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    /// Unique link identifier (time-ordered).
    pub id: ShareLinkId,
    /// Opaque URL-safe token. Unique and immutable.
    pub token: String,
    /// Shared content.
    pub target: ShareTarget,
    /// User who created the link, if any.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time. Always set.
    pub expires_at: DateTime<Utc>,
    /// Number of recorded views.
    pub view_count: u64,
    /// Time of the last recorded view.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Whether the link has not been deactivated.
    pub is_active: bool,
}

impl ShareLink {
    /// Classify the link at `now`. Expiry is checked before the active flag.
    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if now >= self.expires_at {
            LinkState::Expired
        } else if !self.is_active {
            LinkState::Inactive
        } else {
            LinkState::Valid
        }
    }

    /// Whether the link is active and unexpired at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == LinkState::Valid
    }

    /// First characters of the token for listings and logs.
    pub fn token_preview(&self) -> String {
        let prefix: String = self.token.chars().take(8).collect();
        format!("{prefix}...")
    }
}

/// Data required to insert a new link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareLink {
    /// Pre-allocated identifier.
    pub id: ShareLinkId,
    /// Freshly generated token.
    pub token: String,
    /// Shared content.
    pub target: ShareTarget,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl NewShareLink {
    /// The stored shape of this link right after insertion.
    pub fn into_link(self) -> ShareLink {
        ShareLink {
            id: self.id,
            token: self.token,
            target: self.target,
            created_by: self.created_by,
            created_at: self.created_at,
            expires_at: self.expires_at,
            view_count: 0,
            last_accessed_at: None,
            is_active: true,
        }
    }
}

/// Outcome of the atomic evict-then-insert store operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkInsert {
    /// The newly stored link.
    pub link: ShareLink,
    /// Links deactivated to keep the target under its cap, oldest first.
    pub evicted: Vec<ShareLinkId>,
}

/// Filter for administrative link listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareLinkFilter {
    /// Restrict to links of one article (both scopes).
    pub article_id: Option<ArticleId>,
    /// Only links that are currently valid.
    #[serde(default)]
    pub active_only: bool,
}

impl ShareLinkFilter {
    /// Whether `link` passes the filter at `now`.
    pub fn matches(&self, link: &ShareLink, now: DateTime<Utc>) -> bool {
        if let Some(article_id) = self.article_id {
            if link.target.article_id() != article_id {
                return false;
            }
        }
        !self.active_only || link.is_valid_at(now)
    }
}
