//! Built-in route handlers.

pub mod auth;
pub mod health;

use g7kaih_core::AppError;

use crate::error::ApiError;

/// Fallback for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError(AppError::not_found("Route not found"))
}
