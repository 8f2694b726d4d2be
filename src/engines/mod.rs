//! Search provider module
//!
//! Defines the provider traits and the primary and fallback implementations.

mod traits;

pub mod duckduckgo;
pub mod fallback;
pub mod serper;

pub use duckduckgo::DuckDuckGo;
pub use fallback::{BackoffPolicy, FallbackClient};
pub use serper::Serper;
pub use traits::*;
