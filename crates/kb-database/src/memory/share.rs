use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kb_core::error::AppError;
use kb_core::result::AppResult;
use kb_core::types::{PageRequest, PageResponse, ShareLinkId};
use kb_entity::share::{
    NewShareLink, ShareLink, ShareLinkFilter, ShareLinkInsert, ShareLinkView, ShareSettings,
    ShareTarget, UpdateShareSettings, ViewerInfo,
};

use super::MemoryStore;
use crate::traits::{ShareLinkStore, ShareSettingsStore};

#[async_trait]
impl ShareLinkStore for MemoryStore {
    async fn insert_with_cap(
        &self,
        link: NewShareLink,
        max_valid: u32,
        now: DateTime<Utc>,
    ) -> AppResult<ShareLinkInsert> {
        let mut state = self.state.write().await;

        if state.links.iter().any(|l| l.token == link.token) {
            return Err(AppError::token_collision("Share token already exists"));
        }

        // Stable sort: insertion order breaks created_at ties.
        let mut valid: Vec<(DateTime<Utc>, usize)> = state
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.target == link.target && l.is_valid_at(now))
            .map(|(idx, l)| (l.created_at, idx))
            .collect();
        valid.sort_by_key(|(created_at, _)| *created_at);

        let keep = max_valid.max(1) as usize - 1;
        let excess = valid.len().saturating_sub(keep);
        let mut evicted = Vec::with_capacity(excess);
        for (_, idx) in valid.into_iter().take(excess) {
            let existing = &mut state.links[idx];
            existing.is_active = false;
            evicted.push(existing.id);
        }

        let link = link.into_link();
        state.links.push(link.clone());
        Ok(ShareLinkInsert { link, evicted })
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        let state = self.state.read().await;
        Ok(state.links.iter().find(|l| l.token == token).cloned())
    }

    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        let state = self.state.read().await;
        Ok(state.links.iter().find(|l| l.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &ShareLinkFilter,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<ShareLink>> {
        let state = self.state.read().await;
        let mut links: Vec<ShareLink> = state
            .links
            .iter()
            .rev()
            .filter(|l| filter.matches(l, now))
            .cloned()
            .collect();
        links.sort_by_key(|l| Reverse(l.created_at));
        Ok(PageResponse::from_all(links, page))
    }

    async fn count_valid(&self, target: &ShareTarget, now: DateTime<Utc>) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .links
            .iter()
            .filter(|l| l.target == *target && l.is_valid_at(now))
            .count() as u64)
    }

    async fn record_view(
        &self,
        link_id: ShareLinkId,
        viewer: ViewerInfo,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>> {
        let mut state = self.state.write().await;
        let Some(link) = state
            .links
            .iter_mut()
            .find(|l| l.id == link_id && l.is_valid_at(now))
        else {
            return Ok(None);
        };
        link.view_count += 1;
        link.last_accessed_at = Some(now);
        let updated = link.clone();
        state.views.push(viewer.into_view(link_id, now));
        Ok(Some(updated))
    }

    async fn list_views(
        &self,
        link_id: ShareLinkId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLinkView>> {
        let state = self.state.read().await;
        let mut views: Vec<ShareLinkView> = state
            .views
            .iter()
            .rev()
            .filter(|v| v.link_id == link_id)
            .cloned()
            .collect();
        views.sort_by_key(|v| Reverse(v.viewed_at));
        Ok(PageResponse::from_all(views, page))
    }

    async fn deactivate_many(&self, ids: &[ShareLinkId]) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for link in state
            .links
            .iter_mut()
            .filter(|l| l.is_active && ids.contains(&l.id))
        {
            link.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let removed: Vec<ShareLinkId> = state
            .links
            .iter()
            .filter(|l| l.expires_at < now)
            .map(|l| l.id)
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }
        state.links.retain(|l| !removed.contains(&l.id));
        state.views.retain(|v| !removed.contains(&v.link_id));
        Ok(removed.len() as u64)
    }
}

#[async_trait]
impl ShareSettingsStore for MemoryStore {
    async fn get_or_create(&self, now: DateTime<Utc>) -> AppResult<ShareSettings> {
        let mut state = self.state.write().await;
        Ok(state
            .settings
            .get_or_insert_with(|| ShareSettings::with_defaults(now))
            .clone())
    }

    async fn last_updated(&self) -> AppResult<Option<DateTime<Utc>>> {
        let state = self.state.read().await;
        Ok(state.settings.as_ref().map(|s| s.updated_at))
    }

    async fn update(
        &self,
        update: &UpdateShareSettings,
        now: DateTime<Utc>,
    ) -> AppResult<ShareSettings> {
        let mut state = self.state.write().await;
        let current = state
            .settings
            .get_or_insert_with(|| ShareSettings::with_defaults(now));
        *current = update.apply(current, now);
        Ok(current.clone())
    }
}
