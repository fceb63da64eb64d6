//! Reader engagement on articles and paragraphs.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use kb_core::error::AppError;
use kb_core::result::AppResult;
use kb_core::types::{ArticleId, CommentId, PageRequest, PageResponse, ParagraphId};
use kb_database::{ArticleStore, EngagementStore};
use kb_entity::engagement::{
    ArticleComment, ArticleRating, CommentFilter, LikeSummary, MAX_RATING, MIN_RATING,
    NewComment, RatingSummary,
};
use kb_entity::user::AuthenticatedUser;

use crate::context::RequestContext;

/// Maximum comment length, in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Rates articles, collects comments for moderation, and tallies paragraph
/// votes. Writes require a signed-in caller; reads are open to everyone.
#[derive(Debug, Clone)]
pub struct EngagementService {
    store: Arc<dyn EngagementStore>,
    articles: Arc<dyn ArticleStore>,
}

impl EngagementService {
    /// Create a new engagement service.
    pub fn new(store: Arc<dyn EngagementStore>, articles: Arc<dyn ArticleStore>) -> Self {
        Self { store, articles }
    }

    /// Set the caller's 1 to 5 star rating of an article, replacing any
    /// earlier one.
    pub async fn rate_article(
        &self,
        ctx: &RequestContext,
        article_id: ArticleId,
        rating: i16,
    ) -> AppResult<ArticleRating> {
        let user = signed_in(ctx, "rate articles")?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        self.ensure_article(article_id).await?;

        let saved = self
            .store
            .upsert_rating(article_id, user.user_id, rating, Utc::now())
            .await?;
        info!(article_id = %article_id, user_id = %user.user_id, rating, "Article rated");
        Ok(saved)
    }

    /// Rating count and average, with the caller's own rating when signed in.
    pub async fn rating_summary(
        &self,
        ctx: &RequestContext,
        article_id: ArticleId,
    ) -> AppResult<RatingSummary> {
        self.ensure_article(article_id).await?;
        self.store.rating_summary(article_id, ctx.user_id()).await
    }

    /// Submit a comment. It stays hidden until a moderator approves it.
    ///
    /// A reply's parent must belong to the same article.
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        article_id: ArticleId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> AppResult<ArticleComment> {
        let user = signed_in(ctx, "comment")?;
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Comment must not be empty"));
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::validation(format!(
                "Comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }
        self.ensure_article(article_id).await?;
        if let Some(parent_id) = parent_id {
            let parent = self
                .store
                .find_comment(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Comment {parent_id} not found")))?;
            if parent.article_id != article_id {
                return Err(AppError::validation(
                    "A reply must belong to the same article as its parent",
                ));
            }
        }

        let comment = self
            .store
            .insert_comment(
                NewComment {
                    article_id,
                    user_id: user.user_id,
                    username: user.username.clone(),
                    parent_id,
                    content: content.to_string(),
                },
                Utc::now(),
            )
            .await?;
        info!(
            comment_id = %comment.id,
            article_id = %article_id,
            user_id = %user.user_id,
            "Comment submitted for moderation"
        );
        Ok(comment)
    }

    /// Approved comments of an article, oldest first.
    pub async fn list_comments(
        &self,
        article_id: ArticleId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleComment>> {
        self.ensure_article(article_id).await?;
        let filter = CommentFilter {
            article_id: Some(article_id),
            approved: Some(true),
        };
        self.store.list_comments(&filter, page).await
    }

    /// Comments for moderators, any approval state.
    pub async fn moderation_list(
        &self,
        filter: &CommentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleComment>> {
        self.store.list_comments(filter, page).await
    }

    /// Approve or withdraw approval of comments. Returns how many changed.
    pub async fn set_approval(&self, ids: &[CommentId], approved: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let changed = self
            .store
            .set_comment_approval(ids, approved, Utc::now())
            .await?;
        info!(requested = ids.len(), changed, approved, "Comments moderated");
        Ok(changed)
    }

    /// Like (`true`) or dislike (`false`) a paragraph, replacing the
    /// caller's earlier vote. Returns the new tally.
    pub async fn vote_paragraph(
        &self,
        ctx: &RequestContext,
        article_id: ArticleId,
        paragraph_id: ParagraphId,
        is_like: bool,
    ) -> AppResult<LikeSummary> {
        let user = signed_in(ctx, "vote on paragraphs")?;
        self.ensure_paragraph(article_id, paragraph_id).await?;
        self.store
            .upsert_like(paragraph_id, user.user_id, is_like, Utc::now())
            .await?;
        debug!(paragraph_id = %paragraph_id, user_id = %user.user_id, is_like, "Paragraph vote saved");
        self.store
            .like_summary(paragraph_id, Some(user.user_id))
            .await
    }

    /// Withdraw the caller's vote, if any. Returns the new tally.
    pub async fn clear_vote(
        &self,
        ctx: &RequestContext,
        article_id: ArticleId,
        paragraph_id: ParagraphId,
    ) -> AppResult<LikeSummary> {
        let user = signed_in(ctx, "vote on paragraphs")?;
        self.ensure_paragraph(article_id, paragraph_id).await?;
        if self.store.remove_like(paragraph_id, user.user_id).await? {
            debug!(paragraph_id = %paragraph_id, user_id = %user.user_id, "Paragraph vote removed");
        }
        self.store
            .like_summary(paragraph_id, Some(user.user_id))
            .await
    }

    /// Like and dislike counts of a paragraph.
    pub async fn paragraph_votes(
        &self,
        ctx: &RequestContext,
        article_id: ArticleId,
        paragraph_id: ParagraphId,
    ) -> AppResult<LikeSummary> {
        self.ensure_paragraph(article_id, paragraph_id).await?;
        self.store.like_summary(paragraph_id, ctx.user_id()).await
    }

    async fn ensure_article(&self, id: ArticleId) -> AppResult<()> {
        match self.articles.find_article(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("Article {id} not found"))),
        }
    }

    async fn ensure_paragraph(&self, article_id: ArticleId, paragraph_id: ParagraphId) -> AppResult<()> {
        match self.articles.find_paragraph(paragraph_id).await? {
            Some(p) if p.article_id == article_id => Ok(()),
            _ => Err(AppError::not_found(format!(
                "Paragraph {paragraph_id} not found in article {article_id}"
            ))),
        }
    }
}

fn signed_in<'a>(ctx: &'a RequestContext, action: &str) -> AppResult<&'a AuthenticatedUser> {
    ctx.user
        .as_ref()
        .ok_or_else(|| AppError::authentication(format!("Sign in to {action}")))
}
