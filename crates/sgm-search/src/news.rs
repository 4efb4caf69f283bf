//! DuckDuckGo news results.
//!
//! News goes through the JSON endpoint `news.js`, which requires a `vqd`
//! token scraped from the regular results page for the same query.

use crate::error::SearchError;
use crate::web::collapse_whitespace;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use sgm_core::SearchRecord;

/// Raw `news.js` payload
#[derive(Debug, Deserialize)]
pub(crate) struct NewsResponse {
    #[serde(default)]
    pub results: Vec<NewsItem>,
}

/// One raw news article
#[derive(Debug, Deserialize)]
pub(crate) struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// HTML-highlighted excerpt
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub date: Option<i64>,
}

impl From<NewsItem> for SearchRecord {
    fn from(item: NewsItem) -> Self {
        SearchRecord {
            title: item.title.map(|t| strip_html(&t)),
            href: item.url,
            body: item.excerpt.map(|e| strip_html(&e)),
            snippet: None,
            source: item.source,
            date: item.date.and_then(unix_to_rfc3339),
        }
    }
}

static VQD_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"vqd=["']?([0-9-]+)"#));

/// Pull the `vqd` token out of a DuckDuckGo results page.
pub(crate) fn extract_vqd(html: &str) -> Result<String, SearchError> {
    let pattern = VQD_PATTERN
        .as_ref()
        .map_err(|e| SearchError::Parse(format!("invalid vqd pattern: {e}")))?;

    pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SearchError::Parse("vqd token not found".to_string()))
}

/// Parse a `news.js` body into records, keeping at most `max_results`.
pub(crate) fn parse_news_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchRecord>, SearchError> {
    let response: NewsResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid news payload: {e}")))?;

    let results: Vec<SearchRecord> = response
        .results
        .into_iter()
        .take(max_results)
        .map(SearchRecord::from)
        .collect();

    tracing::debug!(count = results.len(), "DuckDuckGo news results parsed");
    Ok(results)
}

/// Strip tags and decode entities (`<b>Ada</b> &amp; co` -> `Ada & co`).
fn strip_html(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    collapse_whitespace(&parsed.root_element().text().collect::<String>())
}

fn unix_to_rfc3339(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
}
