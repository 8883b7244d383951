//! dockhub.toml configuration parser.
//!
//! Every section is optional. `APPTITLE` and `EXCLUDED_SERVICES` from the
//! environment take precedence over the file and are looked up again for
//! each view, so they can change without a restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exclusion::ExclusionRules;
use crate::resolve::{Resolver, UncategorizedDefaults};

pub const TITLE_ENV: &str = "APPTITLE";
pub const EXCLUDED_ENV: &str = "EXCLUDED_SERVICES";
pub const DEFAULT_TITLE: &str = "Docker Services Hub";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub server: ServerConfig,
    pub docker: DockerConfig,
    pub store: StoreConfig,
    pub view: ViewConfig,
    pub defaults: UncategorizedDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub binary: String,
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("services.json"),
        }
    }
}

/// File-level fallbacks for the per-request view settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub title: Option<String>,
    pub excluded_services: Option<String>,
}

/// Settings resolved for a single view computation.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub title: String,
    pub exclusions: ExclusionRules,
    pub resolver: Resolver,
}

impl HubConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(?path, "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve view settings, consulting `env` before the file values.
    pub fn view_settings<F>(&self, env: F) -> ViewSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let title = env(TITLE_ENV)
            .or_else(|| self.view.title.clone())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let excluded = env(EXCLUDED_ENV)
            .or_else(|| self.view.excluded_services.clone())
            .unwrap_or_default();
        ViewSettings {
            title,
            exclusions: ExclusionRules::parse(&excluded),
            resolver: Resolver::new(self.defaults.clone()),
        }
    }
}

/// How view settings read the environment; tests substitute a fixed map.
pub type EnvLookup = fn(&str) -> Option<String>;

/// Environment lookup used by the server.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
