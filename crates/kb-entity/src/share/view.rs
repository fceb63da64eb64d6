//! Share link view records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kb_core::types::{ShareLinkId, ShareLinkViewId};

/// One successful access through a share link. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ShareLinkView {
    /// Record identifier.
    pub id: ShareLinkViewId,
    /// The link that was resolved.
    pub link_id: ShareLinkId,
    /// Requester IP address.
    pub ip_address: String,
    /// Requester user agent.
    pub user_agent: String,
    /// Referring page, if sent.
    pub referrer: Option<String>,
    /// When the view happened.
    pub viewed_at: DateTime<Utc>,
}

/// Request metadata captured for a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerInfo {
    /// Requester IP address.
    pub ip_address: String,
    /// Requester user agent (empty when not sent).
    pub user_agent: String,
    /// Referring page.
    pub referrer: Option<String>,
}

impl ViewerInfo {
    /// Build the immutable record for a view of `link_id` at `now`.
    pub fn into_view(self, link_id: ShareLinkId, now: DateTime<Utc>) -> ShareLinkView {
        ShareLinkView {
            id: ShareLinkViewId::new(),
            link_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            referrer: self.referrer,
            viewed_at: now,
        }
    }
}
