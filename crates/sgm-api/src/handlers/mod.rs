//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod graph;
pub mod health;

use crate::error::AppError;
use axum::http::Uri;

/// JSON 404 for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}
