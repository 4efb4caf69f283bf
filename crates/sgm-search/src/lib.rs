//! Sociogram Search - Web and news search client
//!
//! Scrapes DuckDuckGo for web results (HTML endpoint) and news results
//! (JSON endpoint). The inherent methods on [`DuckDuckGoClient`] report
//! failures as [`SearchError`]; the [`WebSearch`] implementation logs them
//! and degrades to an empty result set so callers never see an error.

pub mod error;
pub mod http;
mod news;
mod web;

pub use error::{Result, SearchError};

use async_trait::async_trait;
use sgm_core::{SearchConfig, SearchRecord, WebSearch};
use std::collections::HashSet;

const HTML_BASE_URL: &str = "https://html.duckduckgo.com";
const BASE_URL: &str = "https://duckduckgo.com";

/// Result pages fetched at most per web query
const MAX_WEB_PAGES: usize = 3;

/// DuckDuckGo search client
pub struct DuckDuckGoClient {
    client: reqwest::Client,
    html_base: String,
    base: String,
    region: String,
    safe_search: bool,
}

impl DuckDuckGoClient {
    /// Create a client from search configuration
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = http::build_client(config)?;

        // One override serves both hosts so a single mock server can stand in
        let (html_base, base) = match config.base_url.as_deref() {
            Some(url) => {
                url::Url::parse(url).map_err(|e| {
                    SearchError::Config(format!("invalid search base URL '{url}': {e}"))
                })?;
                let url = url.trim_end_matches('/').to_string();
                (url.clone(), url)
            }
            None => (HTML_BASE_URL.to_string(), BASE_URL.to_string()),
        };

        Ok(Self {
            client,
            html_base,
            base,
            region: config.region.clone(),
            safe_search: config.safe_search,
        })
    }

    /// Fetch up to `max_results` web results, following result pages
    pub async fn web(&self, query: &str, max_results: usize) -> Result<Vec<SearchRecord>> {
        tracing::trace!(query, max_results, "DuckDuckGo web search");

        let mut results: Vec<SearchRecord> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        for page in 0..MAX_WEB_PAGES {
            if results.len() >= max_results {
                break;
            }

            let offset = results.len().to_string();
            let mut params = vec![("q", query), ("kl", self.region.as_str())];
            if page > 0 {
                params.push(("s", offset.as_str()));
                params.push(("dc", offset.as_str()));
            }
            if self.safe_search {
                params.push(("kp", "1"));
            }

            let response = self
                .client
                .post(format!("{}/html/", self.html_base))
                .form(&params)
                .header("Accept-Language", "en-US,en;q=0.9")
                .send()
                .await
                .map_err(|e| SearchError::Http(format!("web request failed: {e}")))?;
            http::check_status(response.status(), "web search")?;

            let html = response
                .text()
                .await
                .map_err(|e| SearchError::Http(format!("web response read failed: {e}")))?;

            let remaining = max_results - results.len();
            let before = results.len();
            for record in web::parse_web_html(&html, remaining)? {
                if seen_urls.insert(record.url().to_string()) {
                    results.push(record);
                }
            }

            if results.len() == before {
                break;
            }
        }

        Ok(results)
    }

    /// Fetch up to `max_results` news articles
    pub async fn news(&self, query: &str, max_results: usize) -> Result<Vec<SearchRecord>> {
        tracing::trace!(query, max_results, "DuckDuckGo news search");

        let vqd = self.fetch_vqd(query).await?;
        let safe = if self.safe_search { "1" } else { "-1" };

        let response = self
            .client
            .get(format!("{}/news.js", self.base))
            .query(&[
                ("l", self.region.as_str()),
                ("o", "json"),
                ("noamp", "1"),
                ("q", query),
                ("vqd", vqd.as_str()),
                ("p", safe),
            ])
            .header("Referer", format!("{}/", self.base))
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("news request failed: {e}")))?;
        http::check_status(response.status(), "news search")?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("news response read failed: {e}")))?;

        news::parse_news_json(&body, max_results)
    }

    async fn fetch_vqd(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/", self.base))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("token request failed: {e}")))?;
        http::check_status(response.status(), "token request")?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("token response read failed: {e}")))?;

        news::extract_vqd(&html)
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoClient {
    async fn search_web(&self, query: &str, max_results: usize) -> Vec<SearchRecord> {
        match self.web(query, max_results).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Error searching DuckDuckGo");
                Vec::new()
            }
        }
    }

    async fn search_news(&self, query: &str, max_results: usize) -> Vec<SearchRecord> {
        match self.news(query, max_results).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Error searching DuckDuckGo news");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_override_trims_slash() {
        let config = SearchConfig {
            base_url: Some("http://127.0.0.1:9999/".to_string()),
            ..Default::default()
        };
        let client = DuckDuckGoClient::new(&config).unwrap();
        assert_eq!(client.base, "http://127.0.0.1:9999");
        assert_eq!(client.html_base, "http://127.0.0.1:9999");
    }

    #[test]
    fn invalid_base_url_rejected() {
        let config = SearchConfig {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            DuckDuckGoClient::new(&config),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn default_hosts() {
        let client = DuckDuckGoClient::new(&SearchConfig::default()).unwrap();
        assert_eq!(client.html_base, HTML_BASE_URL);
        assert_eq!(client.base, BASE_URL);
        assert_eq!(client.name(), "duckduckgo");
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DuckDuckGoClient>();
    }

    #[tokio::test]
    #[ignore = "hits the live DuckDuckGo service"]
    async fn live_web_search() {
        let client = DuckDuckGoClient::new(&SearchConfig::default()).unwrap();
        let results = client.web("Ada Lovelace", 5).await.unwrap();
        assert!(!results.is_empty());
    }
}
