//! # kb-api
//!
//! HTTP API layer for the knowledge base built on Axum.
//!
//! Provides the public browsing endpoints, share-link issuance and
//! resolution, the administrative endpoints, middleware, extractors, DTOs,
//! and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
