//! Search execution and orchestration

use super::models::{SearchQuery, SearchResponse};
use crate::config::Settings;
use crate::engines::{DuckDuckGo, FallbackClient, SearchProvider, Serper};
use crate::network::HttpClient;
use crate::results::{ProviderOutcome, ResultSource, SearchError, SearchResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Search orchestrator: primary provider first, fallback second
///
/// The primary gets exactly one try. The fallback runs only when the primary
/// failed or had nothing, and its retry exhaustion is the only error that
/// reaches the caller.
pub struct Search {
    primary: Option<Arc<dyn SearchProvider>>,
    fallback: Arc<dyn SearchProvider>,
}

impl Search {
    /// Create a search orchestrator from explicit providers
    pub fn new(primary: Arc<dyn SearchProvider>, fallback: Arc<dyn SearchProvider>) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }

    /// Orchestrator that goes straight to the fallback provider
    pub fn fallback_only(fallback: Arc<dyn SearchProvider>) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    /// Build the Serper + DuckDuckGo pair from settings
    pub fn from_settings(settings: &Settings, client: HttpClient) -> Self {
        let backend = Arc::new(DuckDuckGo::new(client.clone(), &settings.fallback));
        let fallback = FallbackClient::new(backend, &settings.fallback);
        debug!(
            "Fallback modes {:?}, sleeping at most {:?} with {} retries",
            fallback.modes(),
            fallback
                .policy()
                .worst_case_total(settings.search.max_retries, fallback.modes().len()),
            settings.search.max_retries
        );
        let fallback = Arc::new(fallback);

        if settings.primary.disabled {
            info!("Primary provider disabled by configuration");
            return Self::fallback_only(fallback);
        }

        let primary = Serper::new(client, &settings.primary);
        if !primary.is_configured() {
            warn!("SERPER_API_KEY is not set, every search will use the fallback");
        }
        Self::new(Arc::new(primary), fallback)
    }

    /// Execute a search and return the result list
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.search_with_source(query).await.map(|r| r.results)
    }

    /// Execute a search, also reporting which provider answered
    pub async fn search_with_source(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResponse, SearchError> {
        if let Some(ref primary) = self.primary {
            let outcome = primary.search(query).await;
            debug!("{}: {}", primary.name(), outcome.describe());
            match outcome {
                ProviderOutcome::Success(results) => {
                    info!("Using {} results", primary.name());
                    return Ok(Self::respond(results, query, ResultSource::Primary));
                }
                ProviderOutcome::Empty => {
                    info!("{} returned no results, falling back to {}", primary.name(), self.fallback.name());
                }
                ProviderOutcome::Failure(e) => {
                    warn!("{} search failed: {}", primary.name(), e);
                    debug!("Falling back to {}", self.fallback.name());
                }
            }
        }

        let outcome = self.fallback.search(query).await;
        debug!("{}: {}", self.fallback.name(), outcome.describe());
        match outcome {
            ProviderOutcome::Success(results) => {
                info!("Using {} results", self.fallback.name());
                Ok(Self::respond(results, query, ResultSource::Fallback))
            }
            ProviderOutcome::Empty => {
                info!("No results from any provider");
                Ok(SearchResponse {
                    results: Vec::new(),
                    source: ResultSource::None,
                })
            }
            ProviderOutcome::Failure(e) => Err(e),
        }
    }

    fn respond(
        mut results: Vec<SearchResult>,
        query: &SearchQuery,
        source: ResultSource,
    ) -> SearchResponse {
        results.truncate(query.max_results());
        SearchResponse { results, source }
    }
}
