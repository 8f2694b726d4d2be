//! Settings structures for WebSearch-RS configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Main settings structure matching websearch.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
    pub primary: PrimarySettings,
    pub fallback: FallbackSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|name| std::env::var(name).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SERPER_API_KEY") {
            self.primary.api_key = Some(val);
        }
        if let Some(val) = var("WEBSEARCH_REQUEST_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.outgoing.request_timeout = timeout;
            }
        }
        if let Some(val) = var("WEBSEARCH_PROXY") {
            self.outgoing.proxies.all = Some(val);
        }
    }
}

/// Search defaults, overridable from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum number of results to return
    pub max_results: usize,
    /// Maximum number of fallback attempts
    pub max_retries: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 10,
            max_retries: 3,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Per-request timeout in seconds
    pub request_timeout: f64,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

impl OutgoingSettings {
    pub fn request_timeout(&self) -> Duration {
        secs(self.request_timeout)
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Primary (Serper) provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimarySettings {
    /// API key; usually supplied through `SERPER_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Search endpoint
    pub endpoint: String,
    /// Skip the primary provider entirely
    pub disabled: bool,
}

impl Default for PrimarySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://google.serper.dev/search".to_string(),
            disabled: false,
        }
    }
}

/// Request mode for the fallback backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Structured JSON API
    Api,
    /// Scraped HTML results page
    Html,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// Fallback (DuckDuckGo) provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    /// Front page that hands out the `vqd` token for the API mode
    pub vqd_url: String,
    /// JSON web-results endpoint
    pub api_url: String,
    /// HTML results endpoint
    pub html_url: String,
    /// Region code sent with HTML requests
    pub region: String,
    /// Base backoff between attempts in seconds
    pub initial_delay: f64,
    /// Upper bound of the random jitter added to each backoff, in seconds
    pub max_jitter: f64,
    /// Pause before switching to the next mode within one attempt, in seconds
    pub mode_switch_delay: f64,
    /// Modes tried in order within one attempt
    pub modes: Vec<BackendMode>,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            vqd_url: "https://duckduckgo.com/".to_string(),
            api_url: "https://links.duckduckgo.com/d.js".to_string(),
            html_url: "https://html.duckduckgo.com/html/".to_string(),
            region: "wt-wt".to_string(),
            initial_delay: 2.0,
            max_jitter: 2.0,
            mode_switch_delay: 1.0,
            modes: vec![BackendMode::Api, BackendMode::Html],
        }
    }
}

impl FallbackSettings {
    pub fn initial_delay(&self) -> Duration {
        secs(self.initial_delay)
    }

    pub fn max_jitter(&self) -> Duration {
        secs(self.max_jitter)
    }

    pub fn mode_switch_delay(&self) -> Duration {
        secs(self.mode_switch_delay)
    }
}

/// Convert a seconds value from the settings file
///
/// Negative and NaN values clamp to zero, values too large for a `Duration`
/// saturate.
fn secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
