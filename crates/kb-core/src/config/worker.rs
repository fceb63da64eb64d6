//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether scheduled jobs run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for expired share-link cleanup.
    #[serde(default = "default_share_cleanup_cron")]
    pub share_cleanup_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            share_cleanup_cron: default_share_cleanup_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_share_cleanup_cron() -> String {
    "0 0 * * * *".to_string()
}
