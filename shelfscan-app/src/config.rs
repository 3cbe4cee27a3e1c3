use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./shelfscan.yaml";
pub const CONFIG_PATH_ENV: &str = "SHELFSCAN_CONFIG";
pub const BASE_URL_ENV: &str = "SHELFSCAN_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Pre-filled at the login prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub scan: ScanSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_repeat_suppression_ms")]
    pub repeat_suppression_ms: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            repeat_suppression_ms: default_repeat_suppression_ms(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_repeat_suppression_ms() -> u64 {
    1500
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            log_level: default_log_level(),
            username: None,
            scan: ScanSettings::default(),
        }
    }

    pub fn path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn exists() -> bool {
        Self::path().exists()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Remove the config file. Returns false if there was none.
    pub fn reset() -> Result<bool> {
        Self::remove_at(&Self::path())
    }

    pub fn remove_at(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("base_url must start with http:// or https://");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Server root, honoring the environment override.
    pub fn base_url(&self) -> String {
        std::env::var(BASE_URL_ENV).unwrap_or_else(|_| self.base_url.trim().to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn repeat_suppression(&self) -> Duration {
        Duration::from_millis(self.scan.repeat_suppression_ms)
    }
}
