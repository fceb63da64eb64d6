//! Share settings and share link administration handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;

use kb_core::types::{PageResponse, ShareLinkId};
use kb_entity::share::{ShareLinkFilter, ShareLinkView, ShareSettings};

use crate::dto::request::{DeactivateLinksRequest, ShareLinkQuery, UpdateShareSettingsRequest};
use crate::dto::response::{ApiResponse, DeactivatedResponse, RemovedResponse, ShareLinkResponse};
use crate::dto::validate_request;
use crate::error::ApiResult;
use crate::extractors::{AdminUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/share-settings
pub async fn get_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<ShareSettings>>> {
    let settings = state.share_settings_service.get().await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// PUT /api/admin/share-settings
pub async fn update_settings(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(req): Json<UpdateShareSettingsRequest>,
) -> ApiResult<Json<ApiResponse<ShareSettings>>> {
    validate_request(&req)?;
    let settings = state.share_settings_service.update(req.into()).await?;
    tracing::info!(admin = ?admin.user_id(), "Share settings changed via API");
    Ok(Json(ApiResponse::ok(settings)))
}

/// GET /api/admin/share-links
pub async fn list_links(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ShareLinkQuery>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ShareLinkResponse>>>> {
    let filter = ShareLinkFilter::from(query);
    let page = state
        .share_link_service
        .list_links(&filter, &params.into_page_request())
        .await?;

    let now = Utc::now();
    let service = &state.share_link_service;
    let page = page.map(|link| {
        let url = service.share_url(&link.token);
        ShareLinkResponse::new(link, url, now)
    });
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/share-links/{id}/views
pub async fn list_views(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<ShareLinkId>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ShareLinkView>>>> {
    let views = state
        .share_link_service
        .list_views(id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// POST /api/admin/share-links/deactivate
pub async fn deactivate_links(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<DeactivateLinksRequest>,
) -> ApiResult<Json<ApiResponse<DeactivatedResponse>>> {
    validate_request(&req)?;
    let deactivated = state.share_link_service.deactivate_all(&req.ids).await?;
    Ok(Json(ApiResponse::ok(DeactivatedResponse { deactivated })))
}

/// POST /api/admin/share-links/cleanup
pub async fn cleanup_links(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<RemovedResponse>>> {
    let removed = state.share_link_service.cleanup_expired().await?;
    Ok(Json(ApiResponse::ok(RemovedResponse { removed })))
}
