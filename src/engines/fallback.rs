//! Retrying fallback provider
//!
//! Wraps a [`FallbackBackend`] in a bounded retry loop. Each attempt draws a
//! fresh user agent and walks the configured mode list in order; only when
//! every mode fails does the attempt count against the retry budget.

use super::traits::*;
use crate::config::{BackendMode, FallbackSettings};
use crate::network::{SharedRng, UserAgentRotator};
use crate::results::{ProviderOutcome, SearchError, SearchResult};
use crate::search::SearchQuery;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Backoff between fallback attempts
///
/// The delay before attempt `n` (0-indexed, `n >= 1`) is
/// `initial_delay * n + U[0, max_jitter)`.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_jitter: Duration,
    pub mode_switch_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_settings(&FallbackSettings::default())
    }
}

impl BackoffPolicy {
    pub fn from_settings(settings: &FallbackSettings) -> Self {
        Self {
            initial_delay: settings.initial_delay(),
            max_jitter: settings.max_jitter(),
            mode_switch_delay: settings.mode_switch_delay(),
        }
    }

    /// Policy with no waiting at all
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
            mode_switch_delay: Duration::ZERO,
        }
    }

    /// Delay to sleep before attempt `attempt`; zero for the first attempt
    pub fn delay_for(&self, attempt: u32, rng: &SharedRng) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.initial_delay
            .saturating_mul(attempt)
            .saturating_add(rng.uniform(self.max_jitter))
    }

    /// Upper bound on the time one invocation can spend sleeping
    ///
    /// Covers every backoff plus a mode switch within every attempt. Request
    /// time itself is bounded separately by the HTTP timeout.
    pub fn worst_case_total(&self, max_retries: u32, modes: usize) -> Duration {
        let attempts = max_retries.max(1);
        let backoff = (1..attempts)
            .map(|n| self.initial_delay.saturating_mul(n).saturating_add(self.max_jitter))
            .fold(Duration::ZERO, Duration::saturating_add);
        let switches = u32::try_from(modes.saturating_sub(1))
            .unwrap_or(u32::MAX)
            .saturating_mul(attempts);
        backoff.saturating_add(self.mode_switch_delay.saturating_mul(switches))
    }
}

/// Fallback provider: retries a multi-mode backend with jittered backoff
pub struct FallbackClient {
    backend: Arc<dyn FallbackBackend>,
    modes: Vec<BackendMode>,
    policy: BackoffPolicy,
    user_agents: UserAgentRotator,
    rng: SharedRng,
}

impl FallbackClient {
    pub fn new(backend: Arc<dyn FallbackBackend>, settings: &FallbackSettings) -> Self {
        Self::with_rng(backend, settings, SharedRng::from_entropy())
    }

    /// Build with an explicit random source shared by rotation and jitter
    pub fn with_rng(
        backend: Arc<dyn FallbackBackend>,
        settings: &FallbackSettings,
        rng: SharedRng,
    ) -> Self {
        let modes = if settings.modes.is_empty() {
            FallbackSettings::default().modes
        } else {
            settings.modes.clone()
        };

        Self {
            backend,
            modes,
            policy: BackoffPolicy::from_settings(settings),
            user_agents: UserAgentRotator::new(rng.clone()),
            rng,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub fn modes(&self) -> &[BackendMode] {
        &self.modes
    }

    /// Run the retry loop with an explicit budget and base delay
    ///
    /// A budget of zero still makes one attempt.
    pub async fn search_with_retries(
        &self,
        query: &SearchQuery,
        max_retries: u32,
        initial_delay: Duration,
    ) -> ProviderOutcome {
        let attempts = max_retries.max(1);
        let policy = BackoffPolicy {
            initial_delay,
            ..self.policy.clone()
        };
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = policy.delay_for(attempt, &self.rng);
                debug!("Waiting {:.2} seconds before retry...", delay.as_secs_f64());
                tokio::time::sleep(delay).await;
            }

            let user_agent = self.user_agents.next();
            debug!(
                "{} attempt {}/{} - searching for query: {}",
                self.backend.name(),
                attempt + 1,
                attempts,
                query.query()
            );

            match self.attempt(query, &user_agent, &policy).await {
                Ok(results) => {
                    if results.is_empty() {
                        info!("No results found from {}", self.backend.name());
                    } else {
                        debug!("Found {} results from {}", results.len(), self.backend.name());
                    }
                    return ProviderOutcome::from_results(results, query.max_results());
                }
                Err(e) => {
                    warn!("{} attempt {} failed: {}", self.backend.name(), attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        error!("All {} retry attempts failed", self.backend.name());
        ProviderOutcome::Failure(SearchError::ExhaustedRetries {
            attempts,
            last: Box::new(last_error.unwrap_or_else(|| {
                SearchError::Configuration("no attempt was made".to_string())
            })),
        })
    }

    /// One attempt: try each mode in order until one answers
    async fn attempt(
        &self,
        query: &SearchQuery,
        user_agent: &str,
        policy: &BackoffPolicy,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut last_error = None;

        for (i, mode) in self.modes.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(policy.mode_switch_delay).await;
            }

            match self.backend.query(*mode, query, user_agent).await {
                Ok(results) => return Ok(results),
                Err(e) if e.is_provider_error() => {
                    if let Some(next) = self.modes.get(i + 1) {
                        debug!("{} {} mode failed, trying {} mode: {}", self.backend.name(), mode, next, e);
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SearchError::Configuration("no backend modes configured".to_string())
        }))
    }
}

#[async_trait]
impl SearchProvider for FallbackClient {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn search(&self, query: &SearchQuery) -> ProviderOutcome {
        self.search_with_retries(query, query.max_retries(), self.policy.initial_delay)
            .await
    }
}
