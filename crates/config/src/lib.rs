#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for stagehand
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/stagehand/config.toml)
//! - Environment variables
//!
//! The backend preference deliberately bypasses the cached `Config`
//! snapshot: the selector re-reads it from disk on every resolution so a
//! preference change takes effect without restarting the process.

mod preference;

pub use preference::PreferenceStore;

use serde::{Deserialize, Serialize};
use stagehand_errors::{ConfigError, Error};
use stagehand_types::BackendPreference;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub platform: PlatformConfig,
}

/// Install orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Stored backend preference (integer form of `BackendKind`)
    #[serde(default)]
    pub preferred_backend: BackendPreference,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendPreference::default(),
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory holding the pending-operation database; defaults to the
    /// platform data directory.
    pub state_dir: Option<PathBuf>,
}

/// Simulated platform profile used by the CLI's `run` command and by
/// integration tests; real device bindings ignore this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_sdk_version")]
    pub sdk_version: i32,
    #[serde(default)]
    pub elevated_shell: bool,
    #[serde(default)]
    pub companion_service_version: Option<i64>,
    #[serde(default)]
    pub helper_app_installed: bool,
    #[serde(default)]
    pub broker_reachable: bool,
    #[serde(default)]
    pub broker_permission_granted: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            sdk_version: default_sdk_version(),
            elevated_shell: false,
            companion_service_version: None,
            helper_app_installed: false,
            broker_reachable: false,
            broker_permission_granted: false,
        }
    }
}

fn default_sdk_version() -> i32 {
    34
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::ReadFailed {
            path: "config directory".to_string(),
            message: "no system config directory".to_string(),
        })?;
        Ok(config_dir.join("stagehand").join("config.toml"))
    }

    /// Get the default state directory
    ///
    /// # Errors
    ///
    /// Returns an error if the system data directory cannot be determined.
    pub fn default_state_dir() -> Result<PathBuf, Error> {
        let data_dir = dirs::data_dir().ok_or_else(|| ConfigError::ReadFailed {
            path: "data directory".to_string(),
            message: "no system data directory".to_string(),
        })?;
        Ok(data_dir.join("stagehand"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid
    /// TOML syntax.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::Invalid {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from an optional path, falling back to the
    /// default location, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => {
                let config_path = Self::default_path()?;
                if config_path.exists() {
                    Self::load_from_file(&config_path).await
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge environment variables into the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an unparseable
    /// value.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(value) = std::env::var("STAGEHAND_BACKEND") {
            let id: i64 = value.parse().map_err(|_| ConfigError::Invalid {
                message: format!("STAGEHAND_BACKEND must be an integer, got {value:?}"),
            })?;
            self.install.preferred_backend = BackendPreference(id);
        }
        if let Ok(value) = std::env::var("STAGEHAND_STATE_DIR") {
            self.paths.state_dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Resolved state directory for this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no state directory is configured and the
    /// system data directory cannot be determined.
    pub fn state_dir(&self) -> Result<PathBuf, Error> {
        match &self.paths.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_state_dir(),
        }
    }

    /// Serialize this configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteFailed {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
        }
        fs::write(path, contents)
            .await
            .map_err(|e| ConfigError::WriteFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_types::BackendKind;

    #[tokio::test]
    async fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.install.preferred_backend = BackendKind::Root.into();
        config.platform.elevated_shell = true;
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.install.preferred_backend.kind(), BackendKind::Root);
        assert!(loaded.platform.elevated_shell);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load_from_file(&missing).await.is_err());
    }
}
