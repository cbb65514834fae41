//! Application configuration loaded from `config.toml` and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::session::ControllerSettings;

/// Directory name used under the platform config and cache roots.
pub const APP_DIR: &str = "gamesearch";

const DEFAULT_CONFIG: &str = r#"# gamesearch configuration

# Base URL of the game search API.
api_base_url = "http://localhost:8000"

# Number of games the API returns for a full page.
page_size = 20

# Quiet period applied to query edits before a search is issued.
debounce_ms = 300

# Requests exceeding this many seconds fail with a network error.
request_timeout_secs = 15
"#;

/// Runtime configuration for the search client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the search API, e.g. `http://localhost:8000`.
    pub api_base_url: String,
    /// Expected length of a full result page.
    pub page_size: usize,
    /// Debounce window for query edits in milliseconds.
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Directory holding the last-results cache slot.
    pub cache_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            page_size: 20,
            debounce_ms: 300,
            request_timeout_secs: 15,
            cache_root: default_cache_root(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file and `GAMESEARCH_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from an explicit file, falling back to defaults for missing keys.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("page_size", defaults.page_size as u64)?
            .set_default("debounce_ms", defaults.debounce_ms)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default(
                "cache_root",
                defaults.cache_root.to_string_lossy().to_string(),
            )?
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("GAMESEARCH"))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Settings consumed by the search controller.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            page_size: self.page_size,
        }
    }

    /// HTTP timeout applied to every API request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Location of the cached last-results file.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_root.join("last_results.json")
    }

    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        if self.page_size == 0 {
            self.page_size = 1;
        }
        self
    }
}

/// Default location of `config.toml`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a commented default config file when none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: PathBuf) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!("wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.page_size, 20);
        assert_eq!(
            config.controller_settings().debounce,
            Duration::from_millis(300)
        );
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"http://search.local:9000/\"\npage_size = 10\ncache_root = \"/tmp/gs\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, "http://search.local:9000");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/gs/last_results.json"));
        Ok(())
    }

    #[test]
    fn default_config_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(path.clone())?;
        let written = fs::read_to_string(&path)?;
        assert!(written.contains("debounce_ms = 300"));

        fs::write(&path, "page_size = 5\n")?;
        write_default_config(path.clone())?;
        assert_eq!(fs::read_to_string(&path)?, "page_size = 5\n");

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.page_size, 5);
        Ok(())
    }
}
