//! Configuration: a TOML file for tunables, environment variables for
//! credentials. Everything is optional; a missing file or credential
//! degrades functionality instead of failing startup.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::app::{Result, TechTrendError};
use crate::engine::EngineTunables;

pub const NEWS_API_KEY_VAR: &str = "TECHTREND_NEWS_API_KEY";
pub const UNSPLASH_KEY_VAR: &str = "TECHTREND_UNSPLASH_ACCESS_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-source cache lifetime in seconds.
    pub cache_ttl_secs: u64,
    /// Cooldown between non-forced aggregation passes, in seconds.
    pub cooldown_secs: u64,
    /// Per-source HTTP timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Articles per image-enrichment wave.
    pub enrich_batch: usize,
    /// JSON-API credential; the environment variable takes precedence.
    pub news_api_key: Option<String>,
    /// Image-search credential; the environment variable takes precedence.
    pub unsplash_access_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 5 * 60,
            cooldown_secs: 30,
            fetch_timeout_secs: 10,
            enrich_batch: 5,
            news_api_key: None,
            unsplash_access_key: None,
        }
    }
}

impl Config {
    /// Load from `~/.config/techtrend/config.toml` when it exists, then
    /// apply environment credential overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content).map_err(|e| {
                    TechTrendError::Config(format!("Bad config at {}: {e}", path.display()))
                })?
            }
            _ => Self::default(),
        };

        if let Ok(key) = std::env::var(NEWS_API_KEY_VAR) {
            config.news_api_key = Some(key);
        }
        if let Ok(key) = std::env::var(UNSPLASH_KEY_VAR) {
            config.unsplash_access_key = Some(key);
        }

        Ok(config)
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("techtrend").join("config.toml"))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn tunables(&self) -> EngineTunables {
        EngineTunables {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cooldown: Duration::from_secs(self.cooldown_secs),
            enrich_batch: self.enrich_batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.cooldown_secs, 30);
        assert_eq!(config.enrich_batch, 5);
        assert_eq!(config.news_api_key, None);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("cache_ttl_secs = 60\n").unwrap();
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_tunables_conversion() {
        let config = Config::default();
        let tunables = config.tunables();
        assert_eq!(tunables.cache_ttl, Duration::from_secs(300));
        assert_eq!(tunables.cooldown, Duration::from_secs(30));
    }
}
