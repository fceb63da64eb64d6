//! String-valued cache abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A key-value cache with per-entry expiry.
///
/// Values are opaque strings; callers encode JSON themselves. A miss and an
/// expired entry look the same.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Value under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Store `value` for the configured default TTL.
    async fn set_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Whether `key` currently holds a value.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Whether the backend answers.
    async fn health_check(&self) -> AppResult<bool>;
}
