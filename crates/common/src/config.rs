//! Client configuration: one endpoint entry per backend service.
//!
//! Resolution order: built-in defaults, then `config.toml` from the platform
//! config directory (every field optional), then `JOBGRID_*_URL` environment
//! overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Local API gateway that fronts every service in development.
const DEFAULT_GATEWAY: &str = "http://localhost:8084/api/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory for this platform")]
    NoConfigDir,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: ServiceConfig,
    pub jobs: ServiceConfig,
    pub applications: ServiceConfig,
    pub profile: ServiceConfig,
}

/// Endpoint settings for a single backend service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY.to_string(),
            timeout_secs: 10,
            retries: 3,
        }
    }
}

impl ServiceConfig {
    fn with_limits(timeout_secs: u64, retries: u32) -> Self {
        Self {
            timeout_secs,
            retries,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: ServiceConfig::with_limits(10, 3),
            jobs: ServiceConfig::with_limits(15, 2),
            applications: ServiceConfig::with_limits(10, 3),
            profile: ServiceConfig::with_limits(10, 2),
        }
    }
}

impl Config {
    /// Loads the configuration from the platform config directory, falling
    /// back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("no config file at {}, using defaults", path.display());
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Loads the configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        config.apply_env_overrides();
        Ok(config)
    }

    /// Path of the default config file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = directories::ProjectDirs::from("com", "jobgrid", "jobgrid")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        let overrides = [
            ("JOBGRID_AUTH_URL", &mut self.auth),
            ("JOBGRID_JOBS_URL", &mut self.jobs),
            ("JOBGRID_APPLICATIONS_URL", &mut self.applications),
            ("JOBGRID_PROFILE_URL", &mut self.profile),
        ];
        for (key, service) in overrides {
            if let Ok(url) = std::env::var(key) {
                debug!("{} overrides {}", key, service.base_url);
                service.base_url = url;
            }
        }
    }
}
