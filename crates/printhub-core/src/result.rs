//! Convenience result type alias for PrintHub.

use crate::error::AppError;

/// A specialized `Result` type for PrintHub operations.
pub type AppResult<T> = Result<T, AppError>;
