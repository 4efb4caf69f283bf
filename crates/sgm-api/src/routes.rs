//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::graph;
use crate::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/graph", get(graph::graph_handler))
}
