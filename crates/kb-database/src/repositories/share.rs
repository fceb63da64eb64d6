//! Share link and view-log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;

use kb_core::error::{AppError, ErrorKind};
use kb_core::result::AppResult;
use kb_core::types::{
    ArticleId, PageRequest, PageResponse, ParagraphId, ShareLinkId, UserId,
};
use kb_entity::share::{
    NewShareLink, ShareLink, ShareLinkFilter, ShareLinkInsert, ShareLinkView, ShareTarget,
    ViewerInfo,
};

use crate::traits::ShareLinkStore;

/// Table layout of `share_links`.
#[derive(Debug, Clone, FromRow)]
struct ShareLinkRow {
    id: ShareLinkId,
    token: String,
    article_id: ArticleId,
    paragraph_id: Option<ParagraphId>,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    view_count: i64,
    last_accessed_at: Option<DateTime<Utc>>,
    is_active: bool,
}

impl From<ShareLinkRow> for ShareLink {
    fn from(row: ShareLinkRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            target: ShareTarget::from_parts(row.article_id, row.paragraph_id),
            created_by: row.created_by,
            created_at: row.created_at,
            expires_at: row.expires_at,
            view_count: row.view_count.max(0) as u64,
            last_accessed_at: row.last_accessed_at,
            is_active: row.is_active,
        }
    }
}

/// PostgreSQL-backed [`ShareLinkStore`].
#[derive(Debug, Clone)]
pub struct ShareLinkRepository {
    pool: PgPool,
}

impl ShareLinkRepository {
    /// Create a new share link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn insert_error(e: sqlx::Error) -> AppError {
    let duplicate = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if duplicate {
        AppError::with_source(ErrorKind::TokenCollision, "Share token already exists", e)
    } else {
        AppError::with_source(ErrorKind::Database, "Failed to create share link", e)
    }
}

#[async_trait]
impl ShareLinkStore for ShareLinkRepository {
    async fn insert_with_cap(
        &self,
        link: NewShareLink,
        max_valid: u32,
        now: DateTime<Utc>,
    ) -> AppResult<ShareLinkInsert> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Serializes count, evict, and insert per target.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(link.target.bucket_key())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock share target", e)
            })?;

        let valid: Vec<ShareLinkId> = sqlx::query_scalar(
            "SELECT id FROM share_links \
             WHERE article_id = $1 AND paragraph_id IS NOT DISTINCT FROM $2 \
             AND is_active AND expires_at > $3 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(link.target.article_id())
        .bind(link.target.paragraph_id())
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count share links", e)
        })?;

        let keep = max_valid.max(1) as usize - 1;
        let evicted: Vec<ShareLinkId> = if valid.len() > keep {
            valid[..valid.len() - keep].to_vec()
        } else {
            Vec::new()
        };

        if !evicted.is_empty() {
            let changed = sqlx::query(
                "UPDATE share_links SET is_active = FALSE WHERE id = ANY($1) AND is_active",
            )
            .bind(&evicted)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to evict share links", e)
            })?
            .rows_affected();

            if changed as usize != evicted.len() {
                warn!(
                    expected = evicted.len(),
                    changed, "Eviction touched fewer links than selected"
                );
            }
        }

        let row = sqlx::query_as::<_, ShareLinkRow>(
            "INSERT INTO share_links \
             (id, token, article_id, paragraph_id, created_by, created_at, expires_at, view_count, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, TRUE) RETURNING *",
        )
        .bind(link.id)
        .bind(&link.token)
        .bind(link.target.article_id())
        .bind(link.target.paragraph_id())
        .bind(link.created_by)
        .bind(link.created_at)
        .bind(link.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(insert_error)?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit share link", e)
        })?;

        Ok(ShareLinkInsert {
            link: row.into(),
            evicted,
        })
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLinkRow>("SELECT * FROM share_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(ShareLink::from))
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find share link by token", e)
            })
    }

    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLinkRow>("SELECT * FROM share_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(ShareLink::from))
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share link", e))
    }

    async fn list(
        &self,
        filter: &ShareLinkFilter,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<ShareLink>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM share_links \
             WHERE ($1::uuid IS NULL OR article_id = $1) \
             AND (NOT $2 OR (is_active AND expires_at > $3))",
        )
        .bind(filter.article_id)
        .bind(filter.active_only)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count share links", e))?;

        let rows = sqlx::query_as::<_, ShareLinkRow>(
            "SELECT * FROM share_links \
             WHERE ($1::uuid IS NULL OR article_id = $1) \
             AND (NOT $2 OR (is_active AND expires_at > $3)) \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5",
        )
        .bind(filter.article_id)
        .bind(filter.active_only)
        .bind(now)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list share links", e))?;

        Ok(PageResponse::new(
            rows.into_iter().map(ShareLink::from).collect(),
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_valid(&self, target: &ShareTarget, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM share_links \
             WHERE article_id = $1 AND paragraph_id IS NOT DISTINCT FROM $2 \
             AND is_active AND expires_at > $3",
        )
        .bind(target.article_id())
        .bind(target.paragraph_id())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count share links", e))?;
        Ok(count as u64)
    }

    async fn record_view(
        &self,
        link_id: ShareLinkId,
        viewer: ViewerInfo,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let row = sqlx::query_as::<_, ShareLinkRow>(
            "UPDATE share_links SET view_count = view_count + 1, last_accessed_at = $2 \
             WHERE id = $1 AND is_active AND expires_at > $2 RETURNING *",
        )
        .bind(link_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count share view", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let view = viewer.into_view(link_id, now);
        sqlx::query(
            "INSERT INTO share_link_views (id, link_id, ip_address, user_agent, referrer, viewed_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(view.id)
        .bind(view.link_id)
        .bind(&view.ip_address)
        .bind(&view.user_agent)
        .bind(&view.referrer)
        .bind(view.viewed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record share view", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit share view", e)
        })?;

        Ok(Some(row.into()))
    }

    async fn list_views(
        &self,
        link_id: ShareLinkId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLinkView>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM share_link_views WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count share views", e)
                })?;

        let views = sqlx::query_as::<_, ShareLinkView>(
            "SELECT * FROM share_link_views WHERE link_id = $1 \
             ORDER BY viewed_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(link_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list share views", e))?;

        Ok(PageResponse::new(
            views,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn deactivate_many(&self, ids: &[ShareLinkId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result =
            sqlx::query("UPDATE share_links SET is_active = FALSE WHERE id = ANY($1) AND is_active")
                .bind(ids)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to deactivate share links", e)
                })?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM share_links WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired share links", e)
            })?;
        Ok(result.rows_affected())
    }
}
