//! Rendering of result lists for the command line

use super::types::SearchResult;

/// Render results as numbered plain-text blocks
///
/// Numbering is 1-based and follows list order. Absent fields print as
/// [`UNKNOWN`](super::UNKNOWN).
pub fn format_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "\n=== Result {} ===\nURL: {}\nTitle: {}\nSnippet: {}\n",
                i + 1,
                result.url_or_unknown(),
                result.title_or_unknown(),
                result.snippet_or_unknown(),
            )
        })
        .collect()
}

/// Render results as a pretty-printed JSON array
pub fn format_json(results: &[SearchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Output format selectable from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

impl OutputFormat {
    pub fn render(&self, results: &[SearchResult]) -> serde_json::Result<String> {
        match self {
            Self::Text => Ok(format_results(results)),
            Self::Json => format_json(results),
        }
    }
}
