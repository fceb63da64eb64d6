//! Per-request caller and transport metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kb_core::types::UserId;
use kb_entity::share::ViewerInfo;
use kb_entity::user::AuthenticatedUser;

/// Who is calling and from where.
///
/// Built by the HTTP layer (or the CLI) and passed into service methods.
/// `user` is `None` for anonymous visitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated caller, if any.
    pub user: Option<AuthenticatedUser>,
    /// Client IP address.
    pub ip_address: String,
    /// User-Agent header value (empty when absent).
    pub user_agent: String,
    /// Referer header value.
    pub referrer: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an HTTP request.
    pub fn new(
        user: Option<AuthenticatedUser>,
        ip_address: String,
        user_agent: String,
        referrer: Option<String>,
    ) -> Self {
        Self {
            user,
            ip_address,
            user_agent,
            referrer,
            request_time: Utc::now(),
        }
    }

    /// Context for operator tooling and scheduled jobs.
    pub fn system() -> Self {
        Self::new(None, "127.0.0.1".to_string(), "kb-system".to_string(), None)
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The caller's ID, if signed in.
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.user_id)
    }

    /// Whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(AuthenticatedUser::is_admin)
    }

    /// Request metadata recorded with a share view.
    pub fn viewer(&self) -> ViewerInfo {
        ViewerInfo {
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
        }
    }
}
