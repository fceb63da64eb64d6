//! Share link issuance and public resolution handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::info;

use kb_core::types::{ArticleId, ParagraphId};
use kb_entity::share::ShareTarget;
use kb_service::ShareResolution;

use crate::dto::request::CreateShareRequest;
use crate::dto::response::{ApiResponse, CreatedShareResponse, SharedContentResponse};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::extractors::MaybeUser;
use crate::state::AppState;

/// POST /api/articles/{id}/share
pub async fn share_article(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(article_id): Path<ArticleId>,
    body: Option<Json<CreateShareRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreatedShareResponse>>)> {
    create(state, caller, ShareTarget::article(article_id), body).await
}

/// POST /api/articles/{id}/paragraphs/{pid}/share
pub async fn share_paragraph(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((article_id, paragraph_id)): Path<(ArticleId, ParagraphId)>,
    body: Option<Json<CreateShareRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreatedShareResponse>>)> {
    create(
        state,
        caller,
        ShareTarget::paragraph(article_id, paragraph_id),
        body,
    )
    .await
}

async fn create(
    state: AppState,
    caller: MaybeUser,
    target: ShareTarget,
    body: Option<Json<CreateShareRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreatedShareResponse>>)> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let created = state
        .share_link_service
        .create_link(&caller, target, req.expiry_hours)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreatedShareResponse::from(created))),
    ))
}

/// GET /s/{token}
///
/// Granted → 200, unknown → 404, expired → 410, deactivated → 403, and an
/// anonymous visitor under `require_auth` is redirected to the login page.
pub async fn resolve_share(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(token): Path<String>,
) -> ApiResult<Response> {
    let resolution = state.access_resolver.resolve(&caller, &token).await?;
    info!(
        outcome = resolution.label(),
        authenticated = caller.is_authenticated(),
        "Share link resolved"
    );

    let response = match resolution {
        ShareResolution::Granted(content) => {
            Json(ApiResponse::ok(SharedContentResponse::from(*content))).into_response()
        }
        ShareResolution::NotFound => share_error(
            StatusCode::NOT_FOUND,
            "SHARE_NOT_FOUND",
            "This share link does not exist",
        ),
        ShareResolution::Expired => share_error(
            StatusCode::GONE,
            "SHARE_EXPIRED",
            "This share link has expired",
        ),
        ShareResolution::Inactive => share_error(
            StatusCode::FORBIDDEN,
            "SHARE_INACTIVE",
            "This share link is no longer active",
        ),
        ShareResolution::AuthRequired => {
            let login = format!("{}?next=/s/{token}", state.config.auth.login_url);
            Redirect::to(&login).into_response()
        }
    };
    Ok(response)
}

fn share_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(ApiErrorResponse::new(code, message))).into_response()
}
