//! Admin-only handlers.

pub mod comments;
pub mod content;
pub mod share;
