use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kb_core::error::AppError;
use kb_core::result::AppResult;
use kb_core::types::{
    ArticleId, CommentId, PageRequest, PageResponse, ParagraphId, ParagraphLikeId, RatingId,
    UserId,
};
use kb_entity::engagement::{
    ArticleComment, ArticleRating, CommentFilter, LikeSummary, NewComment, ParagraphLike,
    RatingSummary,
};

use super::MemoryStore;
use crate::traits::EngagementStore;

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn upsert_rating(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        rating: i16,
        now: DateTime<Utc>,
    ) -> AppResult<ArticleRating> {
        let mut state = self.state.write().await;
        if !state.articles.iter().any(|a| a.id == article_id) {
            return Err(AppError::not_found("Article not found"));
        }
        if let Some(existing) = state
            .ratings
            .iter_mut()
            .find(|r| r.article_id == article_id && r.user_id == user_id)
        {
            existing.rating = rating;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let created = ArticleRating {
            id: RatingId::new(),
            article_id,
            user_id,
            rating,
            created_at: now,
            updated_at: now,
        };
        state.ratings.push(created.clone());
        Ok(created)
    }

    async fn rating_summary(
        &self,
        article_id: ArticleId,
        viewer: Option<UserId>,
    ) -> AppResult<RatingSummary> {
        let state = self.state.read().await;
        let ratings: Vec<&ArticleRating> = state
            .ratings
            .iter()
            .filter(|r| r.article_id == article_id)
            .collect();
        let values: Vec<i16> = ratings.iter().map(|r| r.rating).collect();
        let own = viewer.and_then(|user| {
            ratings
                .iter()
                .find(|r| r.user_id == user)
                .map(|r| r.rating)
        });
        Ok(RatingSummary::from_ratings(article_id, &values, own))
    }

    async fn insert_comment(
        &self,
        comment: NewComment,
        now: DateTime<Utc>,
    ) -> AppResult<ArticleComment> {
        let mut state = self.state.write().await;
        if !state.articles.iter().any(|a| a.id == comment.article_id) {
            return Err(AppError::not_found("Article not found"));
        }
        if comment
            .parent_id
            .is_some_and(|parent| !state.comments.iter().any(|c| c.id == parent))
        {
            return Err(AppError::not_found("Parent comment not found"));
        }
        let stored = ArticleComment {
            id: CommentId::new(),
            article_id: comment.article_id,
            user_id: comment.user_id,
            username: comment.username,
            parent_id: comment.parent_id,
            content: comment.content,
            is_approved: false,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(stored.clone());
        Ok(stored)
    }

    async fn find_comment(&self, id: CommentId) -> AppResult<Option<ArticleComment>> {
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(
        &self,
        filter: &CommentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleComment>> {
        let state = self.state.read().await;
        let mut matching: Vec<ArticleComment> = state
            .comments
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.created_at);
        Ok(PageResponse::from_all(matching, page))
    }

    async fn set_comment_approval(
        &self,
        ids: &[CommentId],
        approved: bool,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for comment in state
            .comments
            .iter_mut()
            .filter(|c| ids.contains(&c.id) && c.is_approved != approved)
        {
            comment.is_approved = approved;
            comment.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn upsert_like(
        &self,
        paragraph_id: ParagraphId,
        user_id: UserId,
        is_like: bool,
        now: DateTime<Utc>,
    ) -> AppResult<ParagraphLike> {
        let mut state = self.state.write().await;
        if !state.paragraphs.iter().any(|p| p.id == paragraph_id) {
            return Err(AppError::not_found("Paragraph not found"));
        }
        if let Some(existing) = state
            .likes
            .iter_mut()
            .find(|l| l.paragraph_id == paragraph_id && l.user_id == user_id)
        {
            existing.is_like = is_like;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let created = ParagraphLike {
            id: ParagraphLikeId::new(),
            paragraph_id,
            user_id,
            is_like,
            created_at: now,
            updated_at: now,
        };
        state.likes.push(created.clone());
        Ok(created)
    }

    async fn remove_like(&self, paragraph_id: ParagraphId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(l.paragraph_id == paragraph_id && l.user_id == user_id));
        Ok(state.likes.len() < before)
    }

    async fn like_summary(
        &self,
        paragraph_id: ParagraphId,
        viewer: Option<UserId>,
    ) -> AppResult<LikeSummary> {
        let state = self.state.read().await;
        let votes = state.likes.iter().filter(|l| l.paragraph_id == paragraph_id);
        let mut summary = LikeSummary {
            paragraph_id,
            likes: 0,
            dislikes: 0,
            own_vote: None,
        };
        for vote in votes {
            if vote.is_like {
                summary.likes += 1;
            } else {
                summary.dislikes += 1;
            }
            if viewer == Some(vote.user_id) {
                summary.own_vote = Some(vote.is_like);
            }
        }
        Ok(summary)
    }
}
