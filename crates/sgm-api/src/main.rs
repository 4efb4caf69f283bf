//! Sociogram API Server
//!
//! REST API server for person co-mention graphs.
//!
//! Author: hephaex@gmail.com

use sgm_api::{create_router, state::AppState};
use sgm_core::config::{AppConfig, LoggingConfig};
use sgm_extractor::{NerModel, RuleBasedNer};
use sgm_graph::GraphBuilder;
use sgm_search::DuckDuckGoClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.logging);

    // Load the NER model once for the whole process
    let model = NerModel::init_global(&config.ner).await?;
    let extractor =
        RuleBasedNer::new(model.clone())?.with_min_confidence(config.ner.min_confidence);
    let search = DuckDuckGoClient::new(&config.search)?;
    let builder = GraphBuilder::from_config(Arc::new(search), Arc::new(extractor), &config.search);

    let addr = config.server.addr();

    // Create application state
    let state = Arc::new(AppState::new(config, builder).with_model_version(model.version()));

    // Create router
    let app = create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Sociogram API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("sgm_api=debug,tower_http=debug,{}", logging.level).into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolve on Ctrl-C, marking the service not ready so probes drain traffic
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    state.set_ready(false);
    tracing::info!("Shutdown signal received, draining connections");
}
