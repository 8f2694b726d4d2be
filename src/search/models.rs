//! Search query and response models

use crate::results::{ResultSource, SearchError, SearchResult};
use serde::Serialize;

/// Default number of results requested
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default number of fallback attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A validated search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: String,
    max_results: usize,
    max_retries: u32,
}

impl SearchQuery {
    /// Create a query with default limits
    pub fn new(query: impl Into<String>) -> Result<Self, SearchError> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query text is empty".to_string()));
        }

        Ok(Self {
            query,
            max_results: DEFAULT_MAX_RESULTS,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum result count; must be positive
    pub fn with_max_results(mut self, max_results: usize) -> Result<Self, SearchError> {
        if max_results == 0 {
            return Err(SearchError::InvalidQuery(
                "max results must be at least 1".to_string(),
            ));
        }
        self.max_results = max_results;
        Ok(self)
    }

    /// Set the fallback retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Final result list together with the provider that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub source: ResultSource,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
