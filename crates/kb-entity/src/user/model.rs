//! The authenticated caller.

use serde::{Deserialize, Serialize};

use kb_core::types::UserId;

use super::role::UserRole;

/// A user recognized from a valid bearer token.
///
/// Users are owned by the external identity provider; the knowledge base
/// only keeps their ID on the share links they create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User ID.
    pub user_id: UserId,
    /// Username, for logs and listings.
    pub username: String,
    /// Role at token issuance.
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Whether this user may use the administrative surface.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
