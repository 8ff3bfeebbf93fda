//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tunedeck\config.toml
//! - macOS: ~/Library/Application Support/tunedeck/config.toml
//! - Linux: ~/.config/tunedeck/config.toml
//!
//! The config file is human-readable and editable. Settings are loaded at
//! startup; a missing file falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External service endpoints and credentials
    pub services: ServicesConfig,

    /// Widget bridge settings
    pub bridge: BridgeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: ServicesConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

/// Endpoints and API keys for the external collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Base URL of the video platform's data API (search, trending)
    pub media_api_url: String,

    /// API key for the data API
    pub media_api_key: Option<String>,

    /// Base URL of the user document store
    pub user_store_url: String,

    /// Base URL of the generative-text recommendation service
    pub recommender_url: String,

    /// API key for the recommendation service
    pub recommender_api_key: Option<String>,

    /// Base URL of the transactional-mail API used for OTP delivery
    pub mailer_url: String,

    /// API key for the mail API
    pub mailer_api_key: Option<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            media_api_url: "https://www.googleapis.com/youtube/v3".to_string(),
            media_api_key: None,
            user_store_url: "http://127.0.0.1:5984/tunedeck".to_string(),
            recommender_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            recommender_api_key: None,
            mailer_url: "https://api.mailchannels.net".to_string(),
            mailer_api_key: None,
        }
    }
}

/// Where the companion embed page connects to reach the widget bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listen address for the single embed-page connection
    pub listen_addr: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7797".to_string(),
        }
    }
}

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunedeck"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

impl Config {
    /// Load the config from disk, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Config loaded");
                    config
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Config parse failed, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config back to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.bridge.listen_addr.starts_with("127.0.0.1"));
        assert!(config.services.media_api_key.is_none());
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = Config::default();
        config.services.media_api_key = Some("k".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.services.media_api_key.as_deref(), Some("k"));
    }
}
