//! Configuration management for the CLI

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration persisted under `~/.config/podmon/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        let Some(config_path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&config_path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("podmon").join("config.json"))
    }
}

/// Resolve the API endpoint: explicit flag/env first, then the config
/// file, then the local default.
pub fn resolve_api_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }
    Config::load()
        .api_url
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        assert_eq!(
            resolve_api_url(Some("http://agent:9090")),
            "http://agent:9090"
        );
    }

    #[test]
    fn config_parses_api_url() {
        let config: Config = serde_json::from_str(r#"{"api_url":"http://backend:3000"}"#).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://backend:3000"));
    }
}
