//! Provider traits and request/response types

use crate::config::BackendMode;
use crate::results::{ProviderOutcome, SearchError, SearchResult};
use crate::search::SearchQuery;
use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP request to be made by a provider
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// Request body
    pub data: Option<RequestBody>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: Vec::new(),
            data: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add form data (sets content-type to form-urlencoded)
    pub fn form(mut self, data: Vec<(String, String)>) -> Self {
        self.data = Some(RequestBody::Form(data));
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(RequestBody::Json(data));
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl EngineResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, SearchError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// A search backend that answers one query with one outcome
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name used in diagnostics
    fn name(&self) -> &str;

    /// Run the query; implementations never panic on provider misbehavior
    async fn search(&self, query: &SearchQuery) -> ProviderOutcome;
}

/// A backend that can be queried in several request modes
#[async_trait]
pub trait FallbackBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Run one request in the given mode with the given user agent
    async fn query(
        &self,
        mode: BackendMode,
        query: &SearchQuery,
        user_agent: &str,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
