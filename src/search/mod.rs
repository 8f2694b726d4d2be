//! Search orchestration module
//!
//! Coordinates the primary and fallback providers for a single query.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
