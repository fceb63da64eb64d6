//! JWT claims carried by bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kb_core::types::UserId;
use kb_entity::user::{AuthenticatedUser, UserRole};

/// Claims payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Username for logs and listings.
    pub username: String,
    /// Role at issuance.
    pub role: UserRole,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// The caller these claims identify.
    pub fn into_user(self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.sub,
            username: self.username,
            role: self.role,
        }
    }
}
