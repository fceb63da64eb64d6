//! Ratings, moderated comments, and paragraph likes from signed-in readers.

pub mod service;

pub use service::{EngagementService, MAX_COMMENT_CHARS};
