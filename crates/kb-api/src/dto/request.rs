//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use kb_core::types::{ArticleId, CategoryId, CommentId, ShareLinkId};
use kb_entity::article::{CreateArticle, CreateCategory, CreateParagraph};
use kb_entity::engagement::{CommentFilter, MAX_RATING, MIN_RATING};
use kb_entity::share::settings::MAX_EXPIRY_HOURS;
use kb_entity::share::{ShareLinkFilter, UpdateShareSettings};

/// Optional body of the share endpoints.
///
/// Out-of-range values are not rejected; the default expiry applies instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// Hours until the link expires.
    pub expiry_hours: Option<i64>,
}

/// Partial update of the share settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateShareSettingsRequest {
    /// Default link lifetime in hours.
    #[validate(range(min = 1, max = MAX_EXPIRY_HOURS))]
    pub expiry_hours: Option<u32>,
    /// Valid links allowed per shared item.
    #[validate(range(min = 1))]
    pub max_shares_per_item: Option<u32>,
    /// Whether visitors must be signed in.
    pub require_auth: Option<bool>,
    /// Whether views are counted and logged.
    pub track_views: Option<bool>,
}

impl From<UpdateShareSettingsRequest> for UpdateShareSettings {
    fn from(req: UpdateShareSettingsRequest) -> Self {
        Self {
            expiry_hours: req.expiry_hours,
            max_shares_per_item: req.max_shares_per_item,
            require_auth: req.require_auth,
            track_views: req.track_views,
        }
    }
}

/// Share link listing filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareLinkQuery {
    /// Only links of this article.
    pub article_id: Option<ArticleId>,
    /// Only links valid right now.
    #[serde(default)]
    pub active_only: bool,
}

impl From<ShareLinkQuery> for ShareLinkFilter {
    fn from(query: ShareLinkQuery) -> Self {
        Self {
            article_id: query.article_id,
            active_only: query.active_only,
        }
    }
}

/// Bulk deactivation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeactivateLinksRequest {
    /// Links to deactivate.
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<ShareLinkId>,
}

/// Search query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Text to look for.
    #[serde(default)]
    pub q: String,
}

/// Create category request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl From<CreateCategoryRequest> for CreateCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// Create article request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateArticleRequest {
    /// Owning category.
    pub category_id: CategoryId,
    /// Title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Summary.
    #[serde(default)]
    pub summary: String,
    /// Lead content.
    #[serde(default)]
    pub content: String,
    /// Tags.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tags: Vec<String>,
}

impl From<CreateArticleRequest> for CreateArticle {
    fn from(req: CreateArticleRequest) -> Self {
        Self {
            category_id: req.category_id,
            title: req.title,
            summary: req.summary,
            content: req.content,
            tags: req.tags,
        }
    }
}

/// Add paragraph request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateParagraphRequest {
    /// Optional heading.
    pub title: Option<String>,
    /// Body text.
    #[validate(length(min = 1))]
    pub content: String,
    /// Explicit position; appended when absent.
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

impl CreateParagraphRequest {
    /// Bind the request to its article.
    pub fn into_create(self, article_id: ArticleId) -> CreateParagraph {
        CreateParagraph {
            article_id,
            title: self.title,
            content: self.content,
            position: self.position,
        }
    }
}

/// Star rating of an article.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateArticleRequest {
    /// Stars.
    #[validate(range(min = MIN_RATING, max = MAX_RATING))]
    pub rating: i16,
}

/// New comment or reply.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Body text.
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    /// Comment being replied to.
    pub parent_id: Option<CommentId>,
}

/// Like or dislike of a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    /// `true` to like, `false` to dislike.
    pub is_like: bool,
}

/// Moderation listing filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentQuery {
    /// Only comments on this article.
    pub article_id: Option<ArticleId>,
    /// Only approved (`true`) or pending (`false`) comments.
    pub approved: Option<bool>,
}

impl From<CommentQuery> for CommentFilter {
    fn from(query: CommentQuery) -> Self {
        Self {
            article_id: query.article_id,
            approved: query.approved,
        }
    }
}

/// Bulk approval or unapproval of comments.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModerateCommentsRequest {
    /// Comments to update.
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<CommentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_request_rules() {
        let ok = UpdateShareSettingsRequest {
            expiry_hours: Some(48),
            max_shares_per_item: None,
            require_auth: Some(true),
            track_views: None,
        };
        assert!(ok.validate().is_ok());

        let too_long = UpdateShareSettingsRequest {
            expiry_hours: Some(MAX_EXPIRY_HOURS + 1),
            ..ok.clone()
        };
        assert!(too_long.validate().is_err());

        let zero_cap = UpdateShareSettingsRequest {
            max_shares_per_item: Some(0),
            ..ok
        };
        assert!(zero_cap.validate().is_err());
    }

    #[test]
    fn test_empty_deactivation_is_rejected() {
        let req = DeactivateLinksRequest { ids: Vec::new() };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_engagement_request_rules() {
        assert!(RateArticleRequest { rating: 5 }.validate().is_ok());
        assert!(RateArticleRequest { rating: 0 }.validate().is_err());

        let blank = CreateCommentRequest {
            content: String::new(),
            parent_id: None,
        };
        assert!(blank.validate().is_err());

        let empty = ModerateCommentsRequest { ids: Vec::new() };
        assert!(empty.validate().is_err());
    }
}
