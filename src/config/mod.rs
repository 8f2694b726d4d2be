//! Configuration module for WebSearch-RS
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "WEBSEARCH_SETTINGS_PATH";

/// Default locations searched for a settings file, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("websearch.yml"),
        PathBuf::from("config/websearch.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("websearch-rs/websearch.yml"));
    }
    paths
}

/// Load settings from an explicit path, the settings env var, or the default
/// locations, then apply environment overrides
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match find_settings_file(explicit)? {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            debug!("No settings file found, using defaults");
            Settings::default()
        }
    };
    settings.merge_env();
    Ok(settings)
}

fn find_settings_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Settings file not found: {}",
                path.display()
            ));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(default_paths().into_iter().find(|p| p.exists()))
}
