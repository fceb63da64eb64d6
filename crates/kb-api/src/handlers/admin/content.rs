//! Content seeding handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use kb_core::types::ArticleId;
use kb_entity::article::{Article, Category, Paragraph};

use crate::dto::request::{CreateArticleRequest, CreateCategoryRequest, CreateParagraphRequest};
use crate::dto::response::ApiResponse;
use crate::dto::validate_request;
use crate::error::ApiResult;
use crate::extractors::AdminUser;
use crate::state::AppState;

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Category>>)> {
    validate_request(&req)?;
    let category = state.article_service.create_category(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// POST /api/admin/articles
pub async fn create_article(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateArticleRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Article>>)> {
    validate_request(&req)?;
    let article = state.article_service.create_article(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(article))))
}

/// POST /api/admin/articles/{id}/paragraphs
pub async fn add_paragraph(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(article_id): Path<ArticleId>,
    Json(req): Json<CreateParagraphRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Paragraph>>)> {
    validate_request(&req)?;
    let paragraph = state
        .article_service
        .add_paragraph(req.into_create(article_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(paragraph))))
}
