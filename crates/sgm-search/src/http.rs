//! Shared HTTP client with User-Agent rotation for search engine requests.

use crate::error::SearchError;
use rand::seq::SliceRandom;
use reqwest::StatusCode;
use sgm_core::SearchConfig;
use std::time::Duration;

/// Browser User-Agent strings, one picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for search engine scraping.
///
/// Cookies are kept so the token handshake for news search sticks, and the
/// timeout comes from config.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Map a response status to an error, treating throttling statuses separately.
///
/// DuckDuckGo answers throttled clients with 202 and an empty page rather
/// than 429, so 202 counts as a rate limit too.
pub fn check_status(status: StatusCode, what: &str) -> Result<(), SearchError> {
    match status {
        StatusCode::ACCEPTED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(
            SearchError::RateLimited(format!("{what} returned status {}", status.as_u16())),
        ),
        s if !s.is_success() => Err(SearchError::Http(format!(
            "{what} returned status {}",
            s.as_u16()
        ))),
        _ => Ok(()),
    }
}
