//! Layered CLI configuration
//!
//! Defaults, then an optional TOML file, then `KEYWARDEN_`-prefixed
//! environment variables. The encryption key itself is deliberately not
//! part of this struct; it is loaded straight from the environment by
//! `MasterKey::from_env` so it never lands in a config file.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use keywarden_core::dispatch::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_ENDPOINT, DispatchConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Generation API endpoint
    pub endpoint: String,
    /// Bound on each individual credential attempt
    pub attempt_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the tenant document file
    pub data_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            attempt_timeout_seconds: DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_path: base.join("keywarden").join("tenants.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file, and the
    /// environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("KEYWARDEN_").split("__"))
            .extract()
            .context("failed to load configuration")
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keywarden")
            .join("config.toml")
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            endpoint: self.upstream.endpoint.clone(),
            attempt_timeout: Duration::from_secs(self.upstream.attempt_timeout_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.upstream.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.upstream.attempt_timeout_seconds, 30);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[upstream]\nendpoint = \"http://localhost:9/generate\"\nattempt_timeout_seconds = 3\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.upstream.endpoint, "http://localhost:9/generate");
        assert_eq!(config.upstream.attempt_timeout_seconds, 3);
        // Storage keeps its default when the file does not mention it
        assert!(config.storage.data_path.ends_with("tenants.json"));
    }

    #[test]
    fn test_dispatch_config_conversion() {
        let mut config = AppConfig::default();
        config.upstream.attempt_timeout_seconds = 5;
        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.attempt_timeout, Duration::from_secs(5));
    }
}
