//! Sociogram API - HTTP server
//!
//! Serves co-mention graphs at `GET /api/graph?q=<name>` plus health probes
//! and the OpenAPI document.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "Sociogram API", description = "Person co-mention graphs from web and news search"),
    paths(
        handlers::graph::graph_handler,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        sgm_graph::GraphResponse,
        sgm_graph::Element,
        sgm_graph::ElementData,
        sgm_graph::NodeData,
        sgm_graph::EdgeData,
        sgm_graph::NodeType,
        error::ApiError,
        handlers::health::HealthResponse,
        handlers::health::BuildInfo,
        handlers::health::ReadinessResponse,
        handlers::health::ReadinessChecks,
    )),
    tags(
        (name = "graph", description = "Co-mention graph construction"),
        (name = "health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .nest("/api", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router over the given collaborators with default configuration
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing(
    search: Arc<dyn sgm_core::WebSearch>,
    extractor: Arc<dyn sgm_extractor::EntityExtractor>,
) -> Router {
    let config = sgm_core::AppConfig::default();
    let builder = sgm_graph::GraphBuilder::from_config(search, extractor, &config.search);
    let state = AppState::new(config, builder).with_model_version("test");
    create_router(Arc::new(state))
}
