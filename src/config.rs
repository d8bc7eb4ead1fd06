use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Directory holding the persisted favorites and watchlist
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Transport timeout for catalog requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Quiet period before a search query is sent, in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".cinelist")
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_search_debounce_ms() -> u64 {
    300
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::from_iter(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.tmdb_api_key.trim().is_empty() {
            anyhow::bail!("Failed to load config: TMDB_API_KEY is empty");
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_vars(vars(&[("TMDB_API_KEY", "abc123")])).unwrap();
        assert_eq!(config.tmdb_api_key, "abc123");
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.data_dir, PathBuf::from(".cinelist"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("TMDB_API_KEY", "abc123"),
            ("TMDB_API_URL", "http://localhost:9000"),
            ("DATA_DIR", "/tmp/cinelist"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("SEARCH_DEBOUNCE_MS", "50"),
        ]))
        .unwrap();
        assert_eq!(config.tmdb_api_url, "http://localhost:9000");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cinelist"));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.search_debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_vars(vars(&[("DATA_DIR", "/tmp")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_api_key() {
        let result = Config::from_vars(vars(&[("TMDB_API_KEY", "  ")]));
        assert!(result.is_err());
    }
}
