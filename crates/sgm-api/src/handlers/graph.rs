//! Co-mention graph handler
//!
//! Author: hephaex@gmail.com

use crate::error::{ApiError, AppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sgm_graph::GraphResponse;
use std::sync::Arc;
use tracing::Instrument;
use utoipa::IntoParams;
use uuid::Uuid;

/// Graph query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GraphQuery {
    /// Person to build the graph around
    #[param(example = "Ada Lovelace")]
    pub q: Option<String>,
}

/// Build the co-mention graph for a person
///
/// An empty or missing `q` returns an empty element list without running
/// any search.
#[utoipa::path(
    get,
    path = "/api/graph",
    tag = "graph",
    params(GraphQuery),
    responses(
        (status = 200, description = "Co-mention graph", body = GraphResponse),
        (status = 500, description = "Graph construction failed", body = ApiError),
        (status = 504, description = "Graph construction timed out", body = ApiError)
    )
)]
pub async fn graph_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphQuery>,
) -> Result<Json<GraphResponse>, AppError> {
    state.increment_requests();

    let person = params.q.as_deref().unwrap_or_default();
    if person.is_empty() {
        return Ok(Json(GraphResponse::empty()));
    }

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("graph_request", %request_id, person);
    let timeout = state.request_timeout();

    match tokio::time::timeout(timeout, state.builder.build_graph(person).instrument(span)).await
    {
        Ok(Ok(graph)) => Ok(Json(graph)),
        Ok(Err(e)) => {
            tracing::error!(%request_id, error = %e, "Graph construction failed");
            Err(e.into())
        }
        Err(_) => {
            tracing::error!(%request_id, timeout_secs = timeout.as_secs(), "Graph construction timed out");
            Err(AppError::Timeout(format!(
                "Graph for '{person}' not ready after {}s",
                timeout.as_secs()
            )))
        }
    }
}
