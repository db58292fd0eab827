//! Dashboard configuration.
//!
//! Resolution order for the file: `--config`, then `$CVIEW_CONFIG`, then
//! `<config dir>/cview/config.toml` when it exists, else built-in defaults.
//! `$CVIEW_ENDPOINT` and `--endpoint` override `api.endpoint` in that order.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cview_fetch::ApiConfig;

pub const CONFIG_ENV: &str = "CVIEW_CONFIG";
pub const ENDPOINT_ENV: &str = "CVIEW_ENDPOINT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Listen address of `cview serve`.
    pub bind_addr: String,
    /// Upper bound on each backend read within a refresh cycle.
    pub fetch_timeout_secs: u64,
    pub api: ApiConfig,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            bind_addr: "127.0.0.1:8090".to_string(),
            fetch_timeout_secs: 10,
            api: ApiConfig::default(),
            source: None,
        }
    }
}

impl DashboardConfig {
    /// Load the file, apply `$CVIEW_ENDPOINT` then `cli_endpoint`, and
    /// validate the result.
    pub fn load(explicit: Option<&Path>, cli_endpoint: Option<String>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let config = match resolve_path(explicit, env_path, Self::default_config_path()) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.with_overrides(std::env::var(ENDPOINT_ENV).ok(), cli_endpoint)
    }

    /// Apply endpoint overrides in precedence order, then validate. Only the
    /// final endpoint has to be valid.
    pub fn with_overrides(
        mut self,
        env_endpoint: Option<String>,
        cli_endpoint: Option<String>,
    ) -> Result<Self, ConfigError> {
        self.override_endpoint(env_endpoint);
        self.override_endpoint(cli_endpoint);
        self.validate()?;
        Ok(self)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cview").join("config.toml"))
    }

    /// File this configuration came from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Replace the backend endpoint when `endpoint` is a non-empty value.
    pub fn override_endpoint(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.api.endpoint = endpoint.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("api.endpoint '{}': {e}", self.api.endpoint))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api.endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be > 0".into()));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.request_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Pick the config file to read. An explicit or environment path is used
/// as given; the default location only when the file exists.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    default_path: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    default_path.filter(|p| p.exists())
}
