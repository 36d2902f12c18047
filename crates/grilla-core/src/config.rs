use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Live event stream (server push) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Full URL of the event stream endpoint.
    #[serde(default = "default_events_url")]
    pub url: String,
    /// Delay before reconnecting after the stream drops.
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
}

/// Session presence only — the client shows authenticated affordances
/// when a token is configured, but never manages login itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for cached schedule data.
    /// Defaults to the platform cache dir (`~/.cache/grilla`).
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            url: default_events_url(),
            reconnect_secs: default_reconnect_secs(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_base_url() -> String {
    "https://streaming-guide-backend-staging.up.railway.app".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_events_url() -> String {
    format!("{}/youtube/live-events", default_base_url())
}

fn default_reconnect_secs() -> u64 {
    5
}

fn default_cache_dir() -> PathBuf {
    platform::cache_dir()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn has_session(&self) -> bool {
        self.session
            .access_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            events: EventsConfig::default(),
            session: SessionConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api.base_url.starts_with("https://"));
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.events.url.ends_with("/live-events"));
        assert_eq!(config.events.reconnect_secs, 5);
        assert!(!config.has_session());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [session]
            access_token = "tok"
            "#,
        )
        .unwrap();
        assert!(config.has_session());
        assert_eq!(config.events.reconnect_secs, 5);
        assert!(config.api.base_url.starts_with("https://"));
    }
}
