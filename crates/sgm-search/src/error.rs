//! Error types for the search client.
//!
//! These never cross into the graph builder: the [`sgm_core::WebSearch`]
//! implementation logs them and returns an empty result set instead.

/// Errors that can occur while querying a search engine.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The engine throttled us (HTTP 202/403/429 from DuckDuckGo).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// An HTTP request failed or returned an error status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The engine response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for search results.
pub type Result<T> = std::result::Result<T, SearchError>;

impl From<SearchError> for sgm_core::SgmError {
    fn from(err: SearchError) -> Self {
        sgm_core::SgmError::Search(err.to_string())
    }
}
