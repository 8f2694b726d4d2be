//! HTTP client for making requests to search providers

use super::user_agent::{accept_html, accept_language};
use crate::config::OutgoingSettings;
use crate::engines::{EngineRequest, EngineResponse, HttpMethod, RequestBody};
use crate::results::SearchError;
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

/// User agent sent when a request does not set its own
const DEFAULT_USER_AGENT: &str = concat!("websearch-rs/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper configured from outgoing settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = match settings.request_timeout() {
            t if t.is_zero() => OutgoingSettings::default().request_timeout(),
            t => t,
        };
        let mut builder = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: timeout,
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Execute a provider request
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// become errors.
    pub async fn execute(&self, request: EngineRequest) -> Result<EngineResponse, SearchError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .timeout(self.default_timeout)
            .headers(self.build_headers(&request.headers)?);

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(body) = request.data {
            req_builder = match body {
                RequestBody::Form(data) => req_builder.form(&data),
                RequestBody::Json(json) => req_builder.json(&json),
            };
        }

        trace!("{:?} {}", request.method, request.url);
        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// Defaults, then configured extra headers, then the request's own
    ///
    /// Later layers replace earlier ones, so each header is sent once.
    fn build_headers(&self, request: &HashMap<String, String>) -> Result<HeaderMap, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(accept_html()));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&accept_language("en"))
                .map_err(|e| SearchError::Configuration(e.to_string()))?,
        );
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));

        for (key, value) in self.extra_headers.iter().chain(request.iter()) {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| SearchError::Configuration(format!("header {}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SearchError::Configuration(format!("header {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Parse response into EngineResponse
    async fn parse_response(response: Response) -> Result<EngineResponse, SearchError> {
        let status = response.status().as_u16();
        trace!("{} {}", status, response.url());
        let text = response.text().await?;

        Ok(EngineResponse { status, text })
    }
}
