//! View recording for granted share resolutions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use kb_core::result::AppResult;
use kb_database::ShareLinkStore;
use kb_entity::share::{ShareLink, ViewerInfo};

/// Counts a view and appends its record in one store operation.
#[derive(Debug, Clone)]
pub struct ViewRecorder {
    links: Arc<dyn ShareLinkStore>,
}

impl ViewRecorder {
    /// Create a new view recorder.
    pub fn new(links: Arc<dyn ShareLinkStore>) -> Self {
        Self { links }
    }

    /// Record one view of `link`. Returns the updated link, or `None` if it
    /// was deleted in the meantime.
    pub async fn record(
        &self,
        link: &ShareLink,
        viewer: ViewerInfo,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>> {
        let updated = self.links.record_view(link.id, viewer, now).await?;
        if let Some(updated) = &updated {
            debug!(
                link_id = %updated.id,
                view_count = updated.view_count,
                "Share view recorded"
            );
        }
        Ok(updated)
    }
}
