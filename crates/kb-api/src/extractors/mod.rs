//! Custom Axum extractors.

pub mod auth;
pub mod pagination;

pub use auth::{AdminUser, MaybeUser};
pub use pagination::PaginationParams;
