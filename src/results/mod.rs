//! Result types, errors and output formatting
//!
//! This module defines the core result structures shared by both providers.

mod format;
mod types;

pub use format::{format_json, format_results, OutputFormat};
pub use types::*;
