//! Paragraph like entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kb_core::types::{ParagraphId, ParagraphLikeId, UserId};

/// One user's vote on one paragraph: a like or a dislike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ParagraphLike {
    /// Unique vote identifier.
    pub id: ParagraphLikeId,
    /// Voted paragraph.
    pub paragraph_id: ParagraphId,
    /// Voting user.
    pub user_id: UserId,
    /// `true` for a like, `false` for a dislike.
    pub is_like: bool,
    /// When the user first voted.
    pub created_at: DateTime<Utc>,
    /// When the vote last changed.
    pub updated_at: DateTime<Utc>,
}

/// Vote tally of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSummary {
    /// The paragraph.
    pub paragraph_id: ParagraphId,
    /// Number of likes.
    pub likes: u64,
    /// Number of dislikes.
    pub dislikes: u64,
    /// The caller's own vote, when signed in and voted.
    pub own_vote: Option<bool>,
}
