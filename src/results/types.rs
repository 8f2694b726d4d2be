//! Result type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal rendered in place of a field the provider did not supply
pub const UNKNOWN: &str = "N/A";

/// A single search result
///
/// Every field is optional because neither provider guarantees them. A result
/// with missing fields is still a result and keeps its position in the list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// The URL of the result
    pub url: Option<String>,
    /// The title of the result
    pub title: Option<String>,
    /// Content snippet/description
    pub snippet: Option<String>,
}

impl SearchResult {
    /// Create a result with all three fields present
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
            snippet: Some(snippet.into()),
        }
    }

    /// Build a result from optional fields, treating blank strings as absent
    pub fn from_parts(
        url: Option<String>,
        title: Option<String>,
        snippet: Option<String>,
    ) -> Self {
        Self {
            url: non_blank(url),
            title: non_blank(title),
            snippet: non_blank(snippet),
        }
    }

    pub fn url_or_unknown(&self) -> &str {
        self.url.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn title_or_unknown(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn snippet_or_unknown(&self) -> &str {
        self.snippet.as_deref().unwrap_or(UNKNOWN)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Which provider produced the final result list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Primary,
    Fallback,
    /// Neither provider had anything to return
    None,
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Search error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Provider is not usable with the current configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The query itself cannot be searched
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Network failure or timeout
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Response body did not have the expected shape
    #[error("provider protocol error: {0}")]
    Protocol(String),

    /// CAPTCHA or rate-limit page instead of results
    #[error("blocked by provider: {0}")]
    Blocked(String),

    /// Every fallback attempt failed
    #[error("all {attempts} fallback attempts failed, last error: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<SearchError> },
}

impl SearchError {
    /// Whether the error was raised by the remote backend rather than by
    /// local configuration, i.e. whether another request mode may succeed.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus(_) | Self::Protocol(_) | Self::Blocked(_)
        )
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else if let Some(status) = err.status() {
            Self::HttpStatus(status.as_u16())
        } else if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(format!("invalid JSON: {}", err))
    }
}

/// Outcome of a single provider invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// At least one result
    Success(Vec<SearchResult>),
    /// The provider answered but had nothing
    Empty,
    /// The provider could not answer
    Failure(SearchError),
}

impl ProviderOutcome {
    /// Wrap a provider's result list, truncating it to `max_results`
    pub fn from_results(mut results: Vec<SearchResult>, max_results: usize) -> Self {
        if results.is_empty() {
            return Self::Empty;
        }
        results.truncate(max_results);
        Self::Success(results)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Success(results) => format!("{} results", results.len()),
            Self::Empty => "no results".to_string(),
            Self::Failure(e) => format!("failed: {}", e),
        }
    }
}
