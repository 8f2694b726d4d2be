//! User agent rotation

use super::rng::SharedRng;

/// Browser identification strings rotated across outgoing requests
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Picks a user agent uniformly at random for each request
#[derive(Debug, Clone, Default)]
pub struct UserAgentRotator {
    rng: SharedRng,
}

impl UserAgentRotator {
    pub fn new(rng: SharedRng) -> Self {
        Self { rng }
    }

    /// Rotator with a deterministic sequence
    pub fn seeded(seed: u64) -> Self {
        Self::new(SharedRng::seeded(seed))
    }

    /// Draw the next user agent
    pub fn next(&self) -> String {
        self.rng
            .choose(USER_AGENTS)
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }

    /// The full pool of candidate user agents
    pub fn pool() -> &'static [&'static str] {
        USER_AGENTS
    }
}

/// Standard accept headers for HTML requests
pub fn accept_html() -> &'static str {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
}

/// Standard accept headers for JSON requests
pub fn accept_json() -> &'static str {
    "application/json,text/javascript,*/*;q=0.01"
}

/// Standard accept-language header
pub fn accept_language(lang: &str) -> String {
    if lang == "all" || lang.is_empty() {
        "en-US,en;q=0.9".to_string()
    } else {
        format!("{},en-US;q=0.9,en;q=0.8", lang)
    }
}
