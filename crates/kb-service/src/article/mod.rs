//! Knowledge-base browsing, search, and content seeding.

pub mod service;

pub use service::{ArticleDetail, ArticleService, CategoryDetail, HomePage};
