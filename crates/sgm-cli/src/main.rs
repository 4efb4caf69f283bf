//! Sociogram CLI - Command-line interface
//!
//! Usage:
//!   sgm graph <name> [--pretty]
//!   sgm extract <text>
//!   sgm model fetch
//!   sgm model info

use anyhow::Context;
use clap::{Parser, Subcommand};
use sgm_core::config::{AppConfig, ConfigError, NerConfig};
use sgm_core::SgmError;
use sgm_extractor::{model::fetch_model, EntityExtractor, NerModel, RuleBasedNer};
use sgm_graph::GraphBuilder;
use sgm_search::DuckDuckGoClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sgm")]
#[command(about = "Person co-mention graphs from web and news search")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the co-mention graph for a person and print it as JSON
    Graph {
        /// Person name
        name: String,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Extract entities from text
    Extract {
        /// Text to analyze
        text: String,
        /// Override the configured confidence threshold
        #[arg(long)]
        min_confidence: Option<f32>,
    },
    /// Manage the NER model artifact
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the model to the configured path
    Fetch {
        /// Download URL (defaults to NER_MODEL_URL)
        #[arg(long)]
        url: Option<String>,
        /// Destination (defaults to NER_MODEL_PATH)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the model that would be loaded
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.as_str().into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Graph { name, pretty } => {
            if name.is_empty() {
                return Err(SgmError::Validation("person name is empty".to_string()).into());
            }
            let model = NerModel::init_global(&config.ner).await?;
            let extractor =
                RuleBasedNer::new(model)?.with_min_confidence(config.ner.min_confidence);
            let search = DuckDuckGoClient::new(&config.search)?;
            let builder =
                GraphBuilder::from_config(Arc::new(search), Arc::new(extractor), &config.search);

            info!(name = %name, backend = builder.search_backend(), "Building graph");
            let graph = builder.build_graph(&name).await?;
            info!(
                elements = graph.elements.len(),
                edges = graph.edges().count(),
                "Graph built"
            );
            let json = if pretty {
                serde_json::to_string_pretty(&graph)?
            } else {
                serde_json::to_string(&graph)?
            };
            println!("{json}");
        }
        Commands::Extract {
            text,
            min_confidence,
        } => {
            let model = NerModel::init_global(&config.ner).await?;
            let threshold = min_confidence.unwrap_or(config.ner.min_confidence);
            let extractor = RuleBasedNer::new(model)?.with_min_confidence(threshold);

            for mention in extractor.extract(&text)? {
                println!(
                    "{}\t{}\t{:.2}\t{}..{}",
                    mention.label, mention.text, mention.confidence, mention.start, mention.end
                );
            }
        }
        Commands::Model { action } => match action {
            ModelAction::Fetch { url, path } => {
                let (url, path) = fetch_target(url, path, &config.ner)?;

                info!(url = %url, path = %path.display(), "Fetching NER model");
                let json = fetch_model(&url, &path).await?;
                let model = NerModel::from_json(&json)?;
                println!(
                    "Saved model {} ({} entries) to {}",
                    model.version(),
                    model.len(),
                    path.display()
                );
            }
            ModelAction::Info => {
                let model = NerModel::load(&config.ner).await?;
                println!("version: {}", model.version());
                println!("entries: {}", model.len());
                match &config.ner.model_path {
                    Some(path) if path.exists() => println!("source:  {}", path.display()),
                    _ => println!("source:  built-in"),
                }
            }
        },
    }

    Ok(())
}

/// Download source and destination: flags first, then configuration
fn fetch_target(
    url: Option<String>,
    path: Option<PathBuf>,
    ner: &NerConfig,
) -> Result<(String, PathBuf), ConfigError> {
    let url = url
        .or_else(|| ner.model_url.clone())
        .ok_or_else(|| ConfigError::MissingRequired("NER_MODEL_URL (or --url)".to_string()))?;
    let path = path
        .or_else(|| ner.model_path.clone())
        .ok_or_else(|| ConfigError::MissingRequired("NER_MODEL_PATH (or --path)".to_string()))?;
    Ok((url, path))
}

/// File configuration overridden by the environment, or the environment alone
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}
