//! Configuration management for typi

pub mod schema;

pub use schema::{CacheConfig, Config, GeneralConfig, LogFormat};

use crate::error::{TypiError, TypiResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typi")
            .join("config.toml")
    }

    /// Platform default package cache: `<data dir>/typst/packages`
    pub fn default_cache_root() -> TypiResult<PathBuf> {
        dirs::data_dir()
            .map(|d| d.join("typst").join("packages"))
            .ok_or(TypiError::NoDataDir)
    }

    /// Pick the cache root: explicit override, then config file, then platform default
    pub fn resolve_cache_root(override_root: Option<&Path>, config: &Config) -> TypiResult<PathBuf> {
        if let Some(root) = override_root {
            debug!("Using cache root override {}", root.display());
            return Ok(root.to_path_buf());
        }
        if let Some(ref root) = config.cache.root {
            debug!("Using cache root from config {}", root.display());
            return Ok(root.clone());
        }
        Self::default_cache_root()
    }

    /// Load configuration, using defaults if the file does not exist
    pub fn load(&self) -> TypiResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> TypiResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| TypiError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| TypiError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
