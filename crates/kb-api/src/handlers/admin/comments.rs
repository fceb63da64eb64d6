//! Comment moderation handlers.

use axum::Json;
use axum::extract::{Query, State};

use kb_core::types::PageResponse;
use kb_entity::engagement::{ArticleComment, CommentFilter};

use crate::dto::request::{CommentQuery, ModerateCommentsRequest};
use crate::dto::response::{ApiResponse, ModeratedResponse};
use crate::dto::validate_request;
use crate::error::ApiResult;
use crate::extractors::{AdminUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/comments
pub async fn list_comments(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<CommentQuery>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ArticleComment>>>> {
    let page = state
        .engagement_service
        .moderation_list(&CommentFilter::from(query), &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/admin/comments/approve
pub async fn approve(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(req): Json<ModerateCommentsRequest>,
) -> ApiResult<Json<ApiResponse<ModeratedResponse>>> {
    moderate(state, admin, req, true).await
}

/// POST /api/admin/comments/unapprove
pub async fn unapprove(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(req): Json<ModerateCommentsRequest>,
) -> ApiResult<Json<ApiResponse<ModeratedResponse>>> {
    moderate(state, admin, req, false).await
}

async fn moderate(
    state: AppState,
    admin: AdminUser,
    req: ModerateCommentsRequest,
    approved: bool,
) -> ApiResult<Json<ApiResponse<ModeratedResponse>>> {
    validate_request(&req)?;
    let changed = state
        .engagement_service
        .set_approval(&req.ids, approved)
        .await?;
    tracing::info!(admin = ?admin.user_id(), changed, approved, "Comments moderated via API");
    Ok(Json(ApiResponse::ok(ModeratedResponse { changed })))
}
