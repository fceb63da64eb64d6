//! Article comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kb_core::types::{ArticleId, CommentId, UserId};

/// A reader comment. New comments wait for moderation before they are
/// listed publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ArticleComment {
    /// Unique comment identifier.
    pub id: CommentId,
    /// Commented article.
    pub article_id: ArticleId,
    /// Author.
    pub user_id: UserId,
    /// Author's username at the time of writing.
    pub username: String,
    /// Comment this one replies to, on the same article.
    pub parent_id: Option<CommentId>,
    /// Plain-text body.
    pub content: String,
    /// Whether a moderator has approved the comment.
    pub is_approved: bool,
    /// When the comment was written.
    pub created_at: DateTime<Utc>,
    /// When the comment last changed (including moderation).
    pub updated_at: DateTime<Utc>,
}

/// Data required to store a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    /// Commented article.
    pub article_id: ArticleId,
    /// Author.
    pub user_id: UserId,
    /// Author's username.
    pub username: String,
    /// Replied-to comment.
    pub parent_id: Option<CommentId>,
    /// Body.
    pub content: String,
}

/// Filter for comment listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CommentFilter {
    /// Restrict to one article.
    pub article_id: Option<ArticleId>,
    /// Restrict to approved (`true`) or pending (`false`) comments.
    pub approved: Option<bool>,
}

impl CommentFilter {
    /// Whether `comment` passes this filter.
    pub fn matches(&self, comment: &ArticleComment) -> bool {
        self.article_id.is_none_or(|id| comment.article_id == id)
            && self.approved.is_none_or(|a| comment.is_approved == a)
    }
}
