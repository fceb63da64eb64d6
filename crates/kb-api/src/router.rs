//! Route definitions for the knowledge-base HTTP API.
//!
//! JSON routes are mounted under `/api`; share links resolve at `/s/{token}`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(article_routes())
        .merge(share_routes())
        .merge(engagement_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .route("/s/{token}", get(handlers::share::resolve_share))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Public browsing and search
fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/home", get(handlers::article::home))
        .route("/articles", get(handlers::article::list_articles))
        .route("/articles/{id}", get(handlers::article::get_article))
        .route("/categories", get(handlers::article::list_categories))
        .route("/categories/{id}", get(handlers::article::get_category))
        .route("/search", get(handlers::article::search))
}

/// Share link issuance
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/articles/{id}/share", post(handlers::share::share_article))
        .route(
            "/articles/{id}/paragraphs/{pid}/share",
            post(handlers::share::share_paragraph),
        )
}

/// Ratings, comments, and paragraph votes
fn engagement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/articles/{id}/rating",
            get(handlers::engagement::get_rating).put(handlers::engagement::rate_article),
        )
        .route(
            "/articles/{id}/comments",
            get(handlers::engagement::list_comments).post(handlers::engagement::add_comment),
        )
        .route(
            "/articles/{id}/paragraphs/{pid}/like",
            get(handlers::engagement::get_votes)
                .put(handlers::engagement::vote)
                .delete(handlers::engagement::clear_vote),
        )
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Share settings
        .route(
            "/admin/share-settings",
            get(handlers::admin::share::get_settings).put(handlers::admin::share::update_settings),
        )
        // Share links
        .route("/admin/share-links", get(handlers::admin::share::list_links))
        .route(
            "/admin/share-links/{id}/views",
            get(handlers::admin::share::list_views),
        )
        .route(
            "/admin/share-links/deactivate",
            post(handlers::admin::share::deactivate_links),
        )
        .route(
            "/admin/share-links/cleanup",
            post(handlers::admin::share::cleanup_links),
        )
        // Comment moderation
        .route(
            "/admin/comments",
            get(handlers::admin::comments::list_comments),
        )
        .route(
            "/admin/comments/approve",
            post(handlers::admin::comments::approve),
        )
        .route(
            "/admin/comments/unapprove",
            post(handlers::admin::comments::unapprove),
        )
        // Content
        .route(
            "/admin/categories",
            post(handlers::admin::content::create_category),
        )
        .route(
            "/admin/articles",
            post(handlers::admin::content::create_article),
        )
        .route(
            "/admin/articles/{id}/paragraphs",
            post(handlers::admin::content::add_paragraph),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
