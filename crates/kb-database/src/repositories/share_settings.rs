//! Share settings singleton repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use kb_core::error::{AppError, ErrorKind};
use kb_core::result::AppResult;
use kb_entity::share::{ShareSettings, UpdateShareSettings};

use crate::traits::ShareSettingsStore;

/// Table layout of `share_settings`. The table holds at most one row (`id = 1`).
#[derive(Debug, Clone, FromRow)]
struct ShareSettingsRow {
    expiry_hours: i32,
    max_shares_per_item: i32,
    require_auth: bool,
    track_views: bool,
    updated_at: DateTime<Utc>,
}

impl From<ShareSettingsRow> for ShareSettings {
    fn from(row: ShareSettingsRow) -> Self {
        Self {
            expiry_hours: row.expiry_hours.max(1) as u32,
            max_shares_per_item: row.max_shares_per_item.max(1) as u32,
            require_auth: row.require_auth,
            track_views: row.track_views,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed [`ShareSettingsStore`].
#[derive(Debug, Clone)]
pub struct ShareSettingsRepository {
    pool: PgPool,
}

impl ShareSettingsRepository {
    /// Create a new share settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_row(&self, now: DateTime<Utc>) -> AppResult<()> {
        let defaults = ShareSettings::with_defaults(now);
        sqlx::query(
            "INSERT INTO share_settings \
             (id, expiry_hours, max_shares_per_item, require_auth, track_views, updated_at) \
             VALUES (1, $1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
        )
        .bind(defaults.expiry_hours as i32)
        .bind(defaults.max_shares_per_item as i32)
        .bind(defaults.require_auth)
        .bind(defaults.track_views)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create share settings", e)
        })?;
        Ok(())
    }
}

#[async_trait]
impl ShareSettingsStore for ShareSettingsRepository {
    async fn get_or_create(&self, now: DateTime<Utc>) -> AppResult<ShareSettings> {
        self.ensure_row(now).await?;
        sqlx::query_as::<_, ShareSettingsRow>("SELECT * FROM share_settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map(ShareSettings::from)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load share settings", e)
            })
    }

    async fn last_updated(&self) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT updated_at FROM share_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to read share settings revision",
                e,
            )
        })
    }

    async fn update(
        &self,
        update: &UpdateShareSettings,
        now: DateTime<Utc>,
    ) -> AppResult<ShareSettings> {
        self.ensure_row(now).await?;
        sqlx::query_as::<_, ShareSettingsRow>(
            "UPDATE share_settings SET \
             expiry_hours = COALESCE($1, expiry_hours), \
             max_shares_per_item = COALESCE($2, max_shares_per_item), \
             require_auth = COALESCE($3, require_auth), \
             track_views = COALESCE($4, track_views), \
             updated_at = $5 \
             WHERE id = 1 RETURNING *",
        )
        .bind(update.expiry_hours.map(|v| v as i32))
        .bind(update.max_shares_per_item.map(|v| v as i32))
        .bind(update.require_auth)
        .bind(update.track_views)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map(ShareSettings::from)
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update share settings", e)
        })
    }
}
