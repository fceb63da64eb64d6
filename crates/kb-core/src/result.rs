//! Convenience result type alias.

use crate::error::AppError;

/// A specialized `Result` type for knowledge-base operations.
pub type AppResult<T> = Result<T, AppError>;
