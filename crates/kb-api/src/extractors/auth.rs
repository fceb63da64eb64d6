//! Caller extractors: pull the optional Bearer token, validate it, and build
//! the request context with transport metadata.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header::REFERER;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt, UserAgent};

use kb_core::error::AppError;
use kb_entity::user::AuthenticatedUser;
use kb_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Request context for an optional caller.
///
/// No `Authorization` header yields an anonymous context. A header that is
/// present but carries an invalid token is rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub RequestContext);

impl std::ops::Deref for MaybeUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match parts.headers.typed_get::<Authorization<Bearer>>() {
            Some(Authorization(bearer)) => Some(state.jwt_decoder.authenticate(bearer.token())?),
            None if parts.headers.contains_key("authorization") => {
                return Err(AppError::authentication("Invalid Authorization header format").into());
            }
            None => None,
        };
        Ok(MaybeUser(request_context(parts, user)))
    }
}

/// Request context for an authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub RequestContext);

impl std::ops::Deref for AdminUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(ctx) = MaybeUser::from_request_parts(parts, state).await?;
        if !ctx.is_authenticated() {
            return Err(AppError::authentication("Missing Authorization header").into());
        }
        if !ctx.is_admin() {
            return Err(AppError::authorization("Admin access required").into());
        }
        Ok(AdminUser(ctx))
    }
}

fn request_context(parts: &Parts, user: Option<AuthenticatedUser>) -> RequestContext {
    let ip_address = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = parts
        .headers
        .typed_get::<UserAgent>()
        .map(|ua| ua.as_str().to_string())
        .unwrap_or_default();

    let referrer = parts
        .headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    RequestContext::new(user, ip_address, user_agent, referrer)
}
