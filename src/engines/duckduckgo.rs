//! DuckDuckGo backend with a structured API mode and an HTML scrape mode
//!
//! The API mode fetches a `vqd` token from the front page and then reads the
//! JSON web-results payload from `d.js`. The HTML mode posts the query to the
//! lightweight results page and scrapes it.

use super::traits::*;
use crate::config::{BackendMode, FallbackSettings};
use crate::network::{accept_html, accept_json, HttpClient};
use crate::results::{SearchError, SearchResult};
use crate::search::SearchQuery;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;
use url::Url;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("valid result selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("valid title selector"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("valid snippet selector"));
static CHALLENGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".anomaly-modal, #challenge-form, form[action*=\"anomaly\"]")
        .expect("valid challenge selector")
});

/// Prefix of the results array inside the `d.js` script
const PAYLOAD_MARKER: &str = "DDG.pageLayout.load('d',";

/// DuckDuckGo web search backend
pub struct DuckDuckGo {
    client: HttpClient,
    vqd_url: String,
    api_url: String,
    html_url: String,
    region: String,
}

impl DuckDuckGo {
    pub fn new(client: HttpClient, settings: &FallbackSettings) -> Self {
        Self {
            client,
            vqd_url: settings.vqd_url.clone(),
            api_url: settings.api_url.clone(),
            html_url: settings.html_url.clone(),
            region: settings.region.clone(),
        }
    }

    fn vqd_request(&self, query: &SearchQuery, user_agent: &str) -> EngineRequest {
        EngineRequest::post(&self.vqd_url)
            .form(vec![("q".to_string(), query.query().to_string())])
            .header("User-Agent", user_agent)
            .header("Accept", accept_html())
    }

    fn api_request(&self, query: &SearchQuery, vqd: &str, user_agent: &str) -> EngineRequest {
        EngineRequest::get(&self.api_url)
            .param("q", query.query())
            .param("kl", self.region.as_str())
            .param("l", self.region.as_str())
            .param("p", "")
            .param("s", "0")
            .param("df", "")
            .param("vqd", vqd)
            .param("ex", "-1")
            .header("User-Agent", user_agent)
            .header("Accept", accept_json())
    }

    fn html_request(&self, query: &SearchQuery, user_agent: &str) -> EngineRequest {
        let form_data = vec![
            ("q".to_string(), query.query().to_string()),
            ("b".to_string(), String::new()),
            ("kl".to_string(), self.region.clone()),
        ];

        EngineRequest::post(&self.html_url)
            .form(form_data)
            .header("User-Agent", user_agent)
            .header("Accept", accept_html())
    }

    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, SearchError> {
        let response = self.client.execute(request).await?;
        if response.is_rate_limited() {
            return Err(SearchError::Blocked("rate limited".to_string()));
        }
        if !response.is_success() {
            return Err(SearchError::HttpStatus(response.status));
        }
        Ok(response)
    }

    async fn search_api(
        &self,
        query: &SearchQuery,
        user_agent: &str,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let token_page = self.send(self.vqd_request(query, user_agent)).await?;
        let vqd = extract_vqd(&token_page.text)
            .ok_or_else(|| SearchError::Protocol("no vqd token in response".to_string()))?;

        let response = self.send(self.api_request(query, &vqd, user_agent)).await?;
        parse_api_results(&response.text)
    }

    async fn search_html(
        &self,
        query: &SearchQuery,
        user_agent: &str,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self.send(self.html_request(query, user_agent)).await?;
        let document = Html::parse_document(&response.text);
        if is_challenge(&document) {
            return Err(SearchError::Blocked("CAPTCHA challenge".to_string()));
        }
        Ok(parse_html_results(&document))
    }
}

/// Pull the `vqd` token out of the front page
fn extract_vqd(body: &str) -> Option<String> {
    for (start, end) in [("vqd=\"", '"'), ("vqd='", '\''), ("vqd=", '&')] {
        let Some(pos) = body.find(start) else {
            continue;
        };
        let rest = &body[pos + start.len()..];
        if let Some(len) = rest.find(end) {
            let token = rest[..len].trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    None
}

/// Parse the web results embedded in the `d.js` script
///
/// Rows carrying an `n` key point at the next page and are skipped.
fn parse_api_results(body: &str) -> Result<Vec<SearchResult>, SearchError> {
    let start = body
        .find(PAYLOAD_MARKER)
        .ok_or_else(|| SearchError::Protocol("results payload not found".to_string()))?;

    let rows: Value = serde_json::Deserializer::from_str(&body[start + PAYLOAD_MARKER.len()..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| SearchError::Protocol("empty results payload".to_string()))??;

    let rows = rows
        .as_array()
        .ok_or_else(|| SearchError::Protocol("results payload is not an array".to_string()))?;

    let field = |row: &Value, key: &str| row.get(key).and_then(Value::as_str).map(strip_markup);

    Ok(rows
        .iter()
        .filter(|row| row.get("n").is_none())
        .filter_map(|row| {
            let url = row.get("u").and_then(Value::as_str)?.to_string();
            Some(SearchResult::from_parts(
                Some(url),
                field(row, "t"),
                field(row, "a"),
            ))
        })
        .collect())
}

/// Challenge pages are detected by markup, never by text
fn is_challenge(document: &Html) -> bool {
    document.select(&CHALLENGE_SELECTOR).next().is_some()
}

/// Parse the HTML results page
fn parse_html_results(document: &Html) -> Vec<SearchResult> {
    document
        .select(&RESULT_SELECTOR)
        .filter(|element| !is_ad(element))
        .filter_map(|element| {
            let title_elem = element.select(&TITLE_SELECTOR).next()?;
            let url = title_elem.value().attr("href").and_then(decode_redirect)?;

            // Skip DuckDuckGo internal links
            if is_internal(&url) {
                return None;
            }

            let title = collect_text(&title_elem);
            let snippet = element
                .select(&SNIPPET_SELECTOR)
                .next()
                .map(|s| collect_text(&s));

            Some(SearchResult::from_parts(Some(url), Some(title), snippet))
        })
        .collect()
}

fn is_ad(element: &ElementRef) -> bool {
    element.value().classes().any(|c| c == "result--ad")
}

fn is_internal(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.ends_with("duckduckgo.com")))
        .unwrap_or(false)
}

fn collect_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Plain text of an HTML fragment such as `<b>Rust</b> &amp; Cargo`
fn strip_markup(fragment: &str) -> String {
    let fragment = Html::parse_fragment(fragment);
    collapse_whitespace(&fragment.root_element().text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `//duckduckgo.com/l/?uddg=<target>` links to their target
fn decode_redirect(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    if let Ok(parsed) = Url::parse(&absolute) {
        let is_redirect = parsed
            .host_str()
            .map(|h| h.ends_with("duckduckgo.com"))
            .unwrap_or(false)
            && parsed.path() == "/l/";
        if is_redirect {
            return parsed
                .query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned());
        }
    }

    Some(absolute)
}

#[async_trait]
impl FallbackBackend for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn query(
        &self,
        mode: BackendMode,
        query: &SearchQuery,
        user_agent: &str,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut results = match mode {
            BackendMode::Api => self.search_api(query, user_agent).await?,
            BackendMode::Html => self.search_html(query, user_agent).await?,
        };
        debug!("DuckDuckGo {} mode returned {} results", mode, results.len());

        results.truncate(query.max_results());
        Ok(results)
    }
}
