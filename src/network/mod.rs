//! HTTP networking module
//!
//! Provides the HTTP client, user agent rotation and the shared random source.

mod client;
mod rng;
mod user_agent;

pub use client::HttpClient;
pub use rng::SharedRng;
pub use user_agent::{accept_html, accept_json, accept_language, UserAgentRotator};
