//! Ratings, comments, and paragraph vote handlers.
//!
//! Reads are public. Writes need a signed-in caller; the service rejects
//! anonymous ones.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use kb_core::types::{ArticleId, PageResponse, ParagraphId};
use kb_entity::engagement::{ArticleComment, ArticleRating, LikeSummary, RatingSummary};

use crate::dto::request::{CreateCommentRequest, RateArticleRequest, VoteRequest};
use crate::dto::response::ApiResponse;
use crate::dto::validate_request;
use crate::error::ApiResult;
use crate::extractors::{MaybeUser, PaginationParams};
use crate::state::AppState;

/// GET /api/articles/{id}/rating
pub async fn get_rating(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(article_id): Path<ArticleId>,
) -> ApiResult<Json<ApiResponse<RatingSummary>>> {
    let summary = state
        .engagement_service
        .rating_summary(&caller, article_id)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// PUT /api/articles/{id}/rating
pub async fn rate_article(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(article_id): Path<ArticleId>,
    Json(req): Json<RateArticleRequest>,
) -> ApiResult<Json<ApiResponse<ArticleRating>>> {
    validate_request(&req)?;
    let rating = state
        .engagement_service
        .rate_article(&caller, article_id, req.rating)
        .await?;
    Ok(Json(ApiResponse::ok(rating)))
}

/// GET /api/articles/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<ArticleId>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ArticleComment>>>> {
    let page = state
        .engagement_service
        .list_comments(article_id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/articles/{id}/comments
///
/// 202 Accepted: the comment is stored but waits for moderation.
pub async fn add_comment(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(article_id): Path<ArticleId>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ArticleComment>>)> {
    validate_request(&req)?;
    let comment = state
        .engagement_service
        .add_comment(&caller, article_id, &req.content, req.parent_id)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(comment))))
}

/// GET /api/articles/{id}/paragraphs/{pid}/like
pub async fn get_votes(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((article_id, paragraph_id)): Path<(ArticleId, ParagraphId)>,
) -> ApiResult<Json<ApiResponse<LikeSummary>>> {
    let tally = state
        .engagement_service
        .paragraph_votes(&caller, article_id, paragraph_id)
        .await?;
    Ok(Json(ApiResponse::ok(tally)))
}

/// PUT /api/articles/{id}/paragraphs/{pid}/like
pub async fn vote(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((article_id, paragraph_id)): Path<(ArticleId, ParagraphId)>,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<ApiResponse<LikeSummary>>> {
    let tally = state
        .engagement_service
        .vote_paragraph(&caller, article_id, paragraph_id, req.is_like)
        .await?;
    Ok(Json(ApiResponse::ok(tally)))
}

/// DELETE /api/articles/{id}/paragraphs/{pid}/like
pub async fn clear_vote(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((article_id, paragraph_id)): Path<(ArticleId, ParagraphId)>,
) -> ApiResult<Json<ApiResponse<LikeSummary>>> {
    let tally = state
        .engagement_service
        .clear_vote(&caller, article_id, paragraph_id)
        .await?;
    Ok(Json(ApiResponse::ok(tally)))
}
