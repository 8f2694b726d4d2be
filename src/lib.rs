//! WebSearch-RS: web search with a structured primary provider and a
//! scraping fallback
//!
//! Queries the Serper API first and falls back to DuckDuckGo, with retries
//! and jittered backoff, when the primary fails or finds nothing.

pub mod config;
pub mod engines;
pub mod network;
pub mod results;
pub mod search;

pub use config::Settings;
pub use engines::SearchProvider;
pub use results::{format_results, ProviderOutcome, SearchError, SearchResult};
pub use search::{Search, SearchQuery};
