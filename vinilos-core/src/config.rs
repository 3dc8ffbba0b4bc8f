use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Default public backend, used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://backvynils-q6yc.onrender.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// YAML config file structure (`~/.vinilos/config.yaml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigYaml {
    pub base_url: Option<String>,
    /// Path of the sqlite cache file. Absent = caching disabled.
    pub cache_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

/// Client configuration: env vars override the config file, which
/// overrides the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct VinilosConfig {
    pub base_url: String,
    pub cache_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for VinilosConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_path: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl VinilosConfig {
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }
        let file = Self::read_yaml(&Self::config_path());
        Self::from_sources(file)
    }

    /// Load from a specific config directory, ignoring the home-dir
    /// default. Env vars still take precedence.
    pub fn load_from_dir(dir: &Path) -> Self {
        let file = Self::read_yaml(&dir.join("config.yaml"));
        Self::from_sources(file)
    }

    fn from_sources(file: Option<ConfigYaml>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let base_url = env_var("VINILOS_BASE_URL")
            .or(file.base_url)
            .unwrap_or(defaults.base_url);
        let cache_path = env_var("VINILOS_CACHE_PATH")
            .map(PathBuf::from)
            .or(file.cache_path);
        let request_timeout_secs = env_var("VINILOS_TIMEOUT_SECS")
            .and_then(|raw| match raw.parse() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    warn!("VINILOS_TIMEOUT_SECS is not a number, ignoring");
                    None
                }
            })
            .or(file.request_timeout_secs)
            .unwrap_or(defaults.request_timeout_secs);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_path,
            request_timeout_secs,
        }
    }

    fn read_yaml(path: &Path) -> Option<ConfigYaml> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(yaml) => Some(yaml),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .expect("Failed to get home directory")
            .join(".vinilos")
            .join("config.yaml")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = ConfigYaml {
            base_url: Some(self.base_url.clone()),
            cache_path: self.cache_path.clone(),
            request_timeout_secs: Some(self.request_timeout_secs),
        };
        let content =
            serde_yaml::to_string(&yaml).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
