//! DuckDuckGo web results.
//!
//! Uses the HTML-only endpoint (`/html/`), which needs no JavaScript and is
//! tolerant of automated requests.

use crate::error::SearchError;
use scraper::{Html, Selector};
use sgm_core::SearchRecord;
use url::Url;

/// Extract the target URL from DuckDuckGo's redirect wrapper.
///
/// DDG wraps links like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
pub(crate) fn extract_url(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

/// Parse a DuckDuckGo HTML results page.
///
/// Ads are skipped. A result without a usable link is skipped; a result
/// without a snippet is kept with an empty body.
pub(crate) fn parse_web_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchRecord>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let Some(url) = title_el.value().attr("href").and_then(extract_url) else {
            continue;
        };

        let title = collapse_whitespace(&title_el.text().collect::<String>());
        let body = element
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        results.push(SearchRecord::new(title, url, body));
    }

    tracing::debug!(count = results.len(), "DuckDuckGo web results parsed");
    Ok(results)
}

/// Collapse runs of whitespace (including the newlines scraped HTML is full of).
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
