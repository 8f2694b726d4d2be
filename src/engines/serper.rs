//! Serper (Google Search API) provider implementation

use super::traits::*;
use crate::config::PrimarySettings;
use crate::network::{accept_json, HttpClient};
use crate::results::{ProviderOutcome, SearchError, SearchResult};
use crate::search::SearchQuery;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Primary provider: one authenticated request, no retries
pub struct Serper {
    client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
}

impl Serper {
    pub fn new(client: HttpClient, settings: &PrimarySettings) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    /// Whether a credential is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn request(&self, api_key: &str, query: &SearchQuery) -> EngineRequest {
        EngineRequest::post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .header("Content-Type", "application/json")
            .header("Accept", accept_json())
            .json(json!({
                "q": query.query(),
                "num": query.max_results(),
            }))
    }

    fn response(&self, response: EngineResponse) -> Result<Vec<SearchResult>, SearchError> {
        if !response.is_success() {
            return Err(SearchError::HttpStatus(response.status));
        }

        let body: Value = response.json()?;
        parse_organic(&body)
    }
}

/// Extract the `organic` results from a Serper response body
fn parse_organic(body: &Value) -> Result<Vec<SearchResult>, SearchError> {
    let object = body
        .as_object()
        .ok_or_else(|| SearchError::Protocol("response is not a JSON object".to_string()))?;

    let organic = match object.get("organic") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(SearchError::Protocol(
                "\"organic\" is not an array".to_string(),
            ))
        }
    };

    let field = |item: &Value, key: &str| item.get(key).and_then(Value::as_str).map(String::from);

    Ok(organic
        .iter()
        .map(|item| {
            SearchResult::from_parts(
                field(item, "link"),
                field(item, "title"),
                field(item, "snippet"),
            )
        })
        .collect())
}

#[async_trait]
impl SearchProvider for Serper {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &SearchQuery) -> ProviderOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return ProviderOutcome::Failure(SearchError::Configuration(
                "missing credential".to_string(),
            ));
        };

        debug!("Searching with Serper API: {}", query.query());

        let result = match self.client.execute(self.request(api_key, query)).await {
            Ok(response) => self.response(response),
            Err(e) => Err(e),
        };

        match result {
            Ok(results) => {
                if results.is_empty() {
                    info!("No results found from Serper API");
                } else {
                    debug!("Found {} results from Serper API", results.len());
                }
                ProviderOutcome::from_results(results, query.max_results())
            }
            Err(e) => ProviderOutcome::Failure(e),
        }
    }
}
