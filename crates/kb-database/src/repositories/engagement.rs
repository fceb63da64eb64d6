//! Rating, comment, and paragraph-like repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kb_core::error::{AppError, ErrorKind};
use kb_core::result::AppResult;
use kb_core::types::{
    ArticleId, CommentId, PageRequest, PageResponse, ParagraphId, ParagraphLikeId, RatingId,
    UserId,
};
use kb_entity::engagement::{
    ArticleComment, ArticleRating, CommentFilter, LikeSummary, NewComment, ParagraphLike,
    RatingSummary,
};

use crate::traits::EngagementStore;

const COMMENT_WHERE: &str =
    "($1::uuid IS NULL OR article_id = $1) AND ($2::boolean IS NULL OR is_approved = $2)";

/// PostgreSQL-backed [`EngagementStore`].
#[derive(Debug, Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn missing_parent(e: sqlx::Error, what: &'static str, fallback: &'static str) -> AppError {
    if e.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
    {
        AppError::with_source(ErrorKind::NotFound, what, e)
    } else {
        AppError::with_source(ErrorKind::Database, fallback, e)
    }
}

#[async_trait]
impl EngagementStore for EngagementRepository {
    async fn upsert_rating(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        rating: i16,
        now: DateTime<Utc>,
    ) -> AppResult<ArticleRating> {
        sqlx::query_as::<_, ArticleRating>(
            "INSERT INTO article_ratings (id, article_id, user_id, rating, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT (article_id, user_id) \
             DO UPDATE SET rating = EXCLUDED.rating, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(RatingId::new())
        .bind(article_id)
        .bind(user_id)
        .bind(rating)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_parent(e, "Article not found", "Failed to save rating"))
    }

    async fn rating_summary(
        &self,
        article_id: ArticleId,
        viewer: Option<UserId>,
    ) -> AppResult<RatingSummary> {
        let (count, average, own_rating): (i64, Option<f64>, Option<i16>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating)::float8, \
                 (SELECT rating FROM article_ratings WHERE article_id = $1 AND user_id = $2) \
             FROM article_ratings WHERE article_id = $1",
        )
        .bind(article_id)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to summarize ratings", e))?;

        Ok(RatingSummary {
            article_id,
            count: count as u64,
            average,
            own_rating,
        })
    }

    async fn insert_comment(
        &self,
        comment: NewComment,
        now: DateTime<Utc>,
    ) -> AppResult<ArticleComment> {
        sqlx::query_as::<_, ArticleComment>(
            "INSERT INTO article_comments \
                 (id, article_id, user_id, username, parent_id, content, is_approved, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $7) RETURNING *",
        )
        .bind(CommentId::new())
        .bind(comment.article_id)
        .bind(comment.user_id)
        .bind(&comment.username)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_parent(e, "Article or parent comment not found", "Failed to save comment"))
    }

    async fn find_comment(&self, id: CommentId) -> AppResult<Option<ArticleComment>> {
        sqlx::query_as::<_, ArticleComment>("SELECT * FROM article_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find comment", e))
    }

    async fn list_comments(
        &self,
        filter: &CommentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleComment>> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM article_comments WHERE {COMMENT_WHERE}"
        ))
        .bind(filter.article_id)
        .bind(filter.approved)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count comments", e))?;

        let items = sqlx::query_as::<_, ArticleComment>(&format!(
            "SELECT * FROM article_comments WHERE {COMMENT_WHERE} \
             ORDER BY created_at, id LIMIT $3 OFFSET $4"
        ))
        .bind(filter.article_id)
        .bind(filter.approved)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list comments", e))?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn set_comment_approval(
        &self,
        ids: &[CommentId],
        approved: bool,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE article_comments SET is_approved = $2, updated_at = $3 \
             WHERE id = ANY($1) AND is_approved <> $2",
        )
        .bind(ids)
        .bind(approved)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to moderate comments", e))?;
        Ok(result.rows_affected())
    }

    async fn upsert_like(
        &self,
        paragraph_id: ParagraphId,
        user_id: UserId,
        is_like: bool,
        now: DateTime<Utc>,
    ) -> AppResult<ParagraphLike> {
        sqlx::query_as::<_, ParagraphLike>(
            "INSERT INTO paragraph_likes (id, paragraph_id, user_id, is_like, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT (paragraph_id, user_id) \
             DO UPDATE SET is_like = EXCLUDED.is_like, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(ParagraphLikeId::new())
        .bind(paragraph_id)
        .bind(user_id)
        .bind(is_like)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_parent(e, "Paragraph not found", "Failed to save vote"))
    }

    async fn remove_like(&self, paragraph_id: ParagraphId, user_id: UserId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM paragraph_likes WHERE paragraph_id = $1 AND user_id = $2")
                .bind(paragraph_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove vote", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn like_summary(
        &self,
        paragraph_id: ParagraphId,
        viewer: Option<UserId>,
    ) -> AppResult<LikeSummary> {
        let (likes, dislikes, own_vote): (i64, i64, Option<bool>) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE is_like), COUNT(*) FILTER (WHERE NOT is_like), \
                 (SELECT is_like FROM paragraph_likes WHERE paragraph_id = $1 AND user_id = $2) \
             FROM paragraph_likes WHERE paragraph_id = $1",
        )
        .bind(paragraph_id)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count votes", e))?;

        Ok(LikeSummary {
            paragraph_id,
            likes: likes as u64,
            dislikes: dislikes as u64,
            own_vote,
        })
    }
}
