//! Share link presentation configuration.
//!
//! Expiry, capacity, and tracking policy live in the persisted
//! share-settings row, not here.

use serde::{Deserialize, Serialize};

/// Settings for building share URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Absolute origin used when building share URLs (no trailing slash).
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
