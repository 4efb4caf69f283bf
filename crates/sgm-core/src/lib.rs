//! Sociogram Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the Sociogram system:
//! - Search result records shared by the search and graph crates
//! - The web search collaborator trait
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, LoggingConfig, NerConfig, SearchConfig, ServerConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Sociogram operations
#[derive(Error, Debug)]
pub enum SgmError {
    #[error("Search error: {0}")]
    Search(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for SgmError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SgmError>;

// ============================================================================
// Search Records
// ============================================================================

/// A single web or news search hit
///
/// Every field is optional: search engines omit titles, links or bodies
/// often enough that consumers must tolerate any of them being absent.
/// News hits additionally carry `source` and `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Page or article title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Result URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Result body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Alternate snippet text, used when `body` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// Publisher name (news only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Publication date, RFC 3339 (news only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl SearchRecord {
    /// Create a record with title, link and body
    pub fn new(
        title: impl Into<String>,
        href: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            href: Some(href.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Text to run entity extraction on: `body`, then `snippet`, then empty.
    ///
    /// An empty body counts as absent.
    pub fn text(&self) -> &str {
        self.body
            .as_deref()
            .filter(|b| !b.is_empty())
            .or(self.snippet.as_deref())
            .unwrap_or("")
    }

    /// Result URL, empty when unknown
    pub fn url(&self) -> &str {
        self.href.as_deref().unwrap_or("")
    }

    /// Result title, empty when unknown
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Web and news search collaborator
///
/// Implementations absorb their own failures: a rate limit, network error
/// or unparseable page yields an empty vector, never an error. Anything
/// worth reporting is logged by the implementation.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web, returning at most `max_results` hits in engine order
    async fn search_web(&self, query: &str, max_results: usize) -> Vec<SearchRecord>;

    /// Search news articles, returning at most `max_results` hits
    async fn search_news(&self, query: &str, max_results: usize) -> Vec<SearchRecord>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
