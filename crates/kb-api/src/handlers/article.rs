//! Public knowledge-base browsing handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use kb_core::types::{ArticleId, CategoryId, PageResponse};
use kb_entity::article::{ArticleSummary, Category};
use kb_service::article::{ArticleDetail, CategoryDetail, HomePage};

use crate::dto::request::SearchQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// GET /api/home
pub async fn home(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<HomePage>>> {
    let home = state.article_service.home().await?;
    Ok(Json(ApiResponse::ok(home)))
}

/// GET /api/articles
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ArticleSummary>>>> {
    let page = state
        .article_service
        .list_articles(&params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
) -> ApiResult<Json<ApiResponse<ArticleDetail>>> {
    let detail = state.article_service.get_article(id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.article_service.list_categories().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<CategoryDetail>>> {
    let detail = state
        .article_service
        .get_category(id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ArticleSummary>>>> {
    let page = state
        .article_service
        .search(&query.q, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
