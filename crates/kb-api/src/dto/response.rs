//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kb_core::types::{ShareLinkId, UserId};
use kb_entity::article::{Article, Paragraph};
use kb_entity::share::{ShareLink, ShareTarget};
use kb_service::{CreatedShareLink, SharedContent};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A freshly issued share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedShareResponse {
    /// Link ID.
    pub id: ShareLinkId,
    /// The secret token.
    pub token: String,
    /// Absolute URL resolving the token.
    pub url: String,
    /// What the link grants access to.
    pub target: ShareTarget,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Always zero for a new link.
    pub view_count: u64,
    /// How many older links were deactivated to make room.
    pub evicted: usize,
}

impl From<CreatedShareLink> for CreatedShareResponse {
    fn from(created: CreatedShareLink) -> Self {
        Self {
            id: created.link.id,
            token: created.link.token,
            url: created.url,
            target: created.link.target,
            expires_at: created.link.expires_at,
            view_count: created.link.view_count,
            evicted: created.evicted.len(),
        }
    }
}

/// Administrative view of a share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkResponse {
    /// Link ID.
    pub id: ShareLinkId,
    /// The secret token.
    pub token: String,
    /// Absolute URL resolving the token.
    pub url: String,
    /// What the link grants access to.
    pub target: ShareTarget,
    /// Who issued it, when signed in.
    pub created_by: Option<UserId>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Counted views.
    pub view_count: u64,
    /// Last counted view.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// False once revoked or evicted.
    pub is_active: bool,
    /// Whether the link resolves right now.
    pub is_valid: bool,
}

impl ShareLinkResponse {
    /// Build the view of `link` at `now`.
    pub fn new(link: ShareLink, url: String, now: DateTime<Utc>) -> Self {
        Self {
            is_valid: link.is_valid_at(now),
            id: link.id,
            token: link.token,
            url,
            target: link.target,
            created_by: link.created_by,
            created_at: link.created_at,
            expires_at: link.expires_at,
            view_count: link.view_count,
            last_accessed_at: link.last_accessed_at,
            is_active: link.is_active,
        }
    }
}

/// Content delivered through a share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedContentResponse {
    /// The shared article.
    pub article: Article,
    /// Its paragraphs in order.
    pub paragraphs: Vec<Paragraph>,
    /// The highlighted paragraph, for paragraph links.
    pub paragraph: Option<Paragraph>,
    /// When the link stops working.
    pub expires_at: DateTime<Utc>,
    /// Counted views including this one.
    pub view_count: u64,
}

impl From<SharedContent> for SharedContentResponse {
    fn from(content: SharedContent) -> Self {
        Self {
            article: content.article,
            paragraphs: content.paragraphs,
            paragraph: content.paragraph,
            expires_at: content.link.expires_at,
            view_count: content.link.view_count,
        }
    }
}

/// Result of a bulk deactivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivatedResponse {
    /// Links that were active and are now inactive.
    pub deactivated: u64,
}

/// Result of a bulk comment moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratedResponse {
    /// Comments whose approval state changed.
    pub changed: u64,
}

/// Result of an expired-link purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    /// Links deleted.
    pub removed: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: i64,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Store backend in use.
    pub backend: String,
    /// Database status.
    pub database: String,
    /// Cache status.
    pub cache: String,
}
