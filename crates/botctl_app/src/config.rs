//! Control endpoint configuration.
//!
//! Values come from an optional RON file and are overridden by environment
//! variables and command-line flags. The endpoint address is never defaulted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use botctl_engine::{ClientSettings, ControlError, Endpoint, DEFAULT_MAX_BODY_BYTES};
use botctl_logging::ctl_info;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "botctl.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("no control endpoint configured; pass --endpoint, set BOTCTL_ENDPOINT or add `endpoint` to botctl.ron")]
    MissingEndpoint,
    #[error("invalid control endpoint: {0}")]
    InvalidEndpoint(#[from] ControlError),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Base address, e.g. `http://10.0.0.5:8080`.
    pub endpoint: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub max_body_bytes: Option<u64>,
}

impl ControlConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        ctl_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Like [`ControlConfig::load`], but a missing file yields the defaults.
    pub fn load_if_present(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Fields set in `overrides` win.
    pub fn merged_with(self, overrides: ControlConfig) -> Self {
        Self {
            endpoint: overrides.endpoint.or(self.endpoint),
            connect_timeout_ms: overrides.connect_timeout_ms.or(self.connect_timeout_ms),
            request_timeout_ms: overrides.request_timeout_ms.or(self.request_timeout_ms),
            max_body_bytes: overrides.max_body_bytes.or(self.max_body_bytes),
        }
    }

    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        let raw = self
            .endpoint
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;
        let endpoint = Endpoint::parse(raw)?;

        Ok(ClientSettings {
            endpoint,
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            max_body_bytes: self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES),
        })
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(|err| ConfigError::Serialize(err.to_string()))
    }
}
