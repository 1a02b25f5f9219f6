use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    #[serde(default)]
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub discover: DiscoverDefaults,
    #[serde(default)]
    pub share: ShareConfig,
}

/// Metadata provider credentials.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
}

/// Endpoints and key for the hosted document/identity service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    pub api_key: String,
    pub docstore_url: String,
    pub identity_url: String,
    /// Snapshot poll interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// Defaults applied to `discover` when flags are omitted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscoverDefaults {
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShareConfig {
    /// Base used to build public share URLs; the share token is appended.
    #[serde(default = "default_share_base_url")]
    pub base_url: String,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_sort_by() -> String {
    "popularity.desc".to_string()
}

fn default_share_base_url() -> String {
    "https://watchlister.app/shared".to_string()
}

impl Default for DiscoverDefaults {
    fn default() -> Self {
        Self {
            min_rating: None,
            sort_by: default_sort_by(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_share_base_url(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.tmdb.is_none());
        assert_eq!(config.share.base_url, default_share_base_url());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            tmdb: Some(TmdbConfig {
                api_key: "key".to_string(),
                base_url: default_tmdb_base_url(),
            }),
            backend: Some(BackendConfig {
                api_key: "backend-key".to_string(),
                docstore_url: "https://docs.example.com".to_string(),
                identity_url: "https://id.example.com".to_string(),
                poll_interval_secs: 5,
            }),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.tmdb.unwrap().api_key, "key");
        assert_eq!(loaded.backend.unwrap().poll_interval_secs, 5);
    }
}
