//! Sociogram Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Search client configuration
    pub search: SearchConfig,

    /// Entity recognition configuration
    pub ner: NerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(&lookup)?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_lookup(&|key: &str| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_lookup<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(secs) = lookup("API_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = parse_value("API_REQUEST_TIMEOUT_SECS", secs)?;
        }

        // Search
        if let Some(n) = lookup("SEARCH_WEB_RESULTS") {
            self.search.web_results = parse_value("SEARCH_WEB_RESULTS", n)?;
        }
        if let Some(n) = lookup("SEARCH_NEWS_RESULTS") {
            self.search.news_results = parse_value("SEARCH_NEWS_RESULTS", n)?;
        }
        if let Some(secs) = lookup("SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = parse_value("SEARCH_TIMEOUT_SECS", secs)?;
        }
        if let Some(region) = lookup("SEARCH_REGION") {
            self.search.region = region;
        }
        if let Some(ua) = lookup("SEARCH_USER_AGENT") {
            self.search.user_agent = Some(ua);
        }

        // NER model
        if let Some(path) = lookup("NER_MODEL_PATH") {
            self.ner.model_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("NER_MODEL_URL") {
            self.ner.model_url = Some(url);
        }
        if let Some(threshold) = lookup("NER_MIN_CONFIDENCE") {
            self.ner.min_confidence = parse_value("NER_MIN_CONFIDENCE", threshold)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", json)?;
        }

        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    /// Socket address string, e.g. `0.0.0.0:8080`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Search client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Web results requested per query
    pub web_results: usize,

    /// News results requested per query
    pub news_results: usize,

    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Region code passed to the search engine (e.g. `us-en`, `wt-wt`)
    pub region: String,

    /// Ask the engine to filter adult content
    pub safe_search: bool,

    /// Fixed User-Agent; a browser string is picked at random when unset
    pub user_agent: Option<String>,

    /// Engine base URL override (used by tests against a mock server)
    pub base_url: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            web_results: 20,
            news_results: 10,
            timeout_secs: 15,
            region: "us-en".to_string(),
            safe_search: true,
            user_agent: None,
            base_url: None,
        }
    }
}

/// Entity recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Local path of the gazetteer model artifact
    pub model_path: Option<PathBuf>,

    /// Where to fetch the artifact from when `model_path` does not exist yet
    pub model_url: Option<String>,

    /// Spans scoring below this are dropped
    pub min_confidence: f32,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            model_url: None,
            min_confidence: 0.5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
