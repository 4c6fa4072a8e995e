//! Live backend-preference reads
//!
//! The selector consults the preference on every resolution. A corrupt
//! or missing file yields the default backend rather than an error, so a
//! damaged preference can never block installs.

use std::path::PathBuf;

use stagehand_errors::Error;
use stagehand_types::BackendPreference;
use tokio::fs;

use crate::Config;

/// Uncached reader/writer for the stored backend preference.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    config_path: PathBuf,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Create a store pointing at the default config location.
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be
    /// determined.
    pub fn at_default_path() -> Result<Self, Error> {
        Ok(Self::new(Config::default_path()?))
    }

    /// Read the current preference from disk.
    pub async fn preferred_backend(&self) -> BackendPreference {
        let Ok(contents) = fs::read_to_string(&self.config_path).await else {
            return BackendPreference::default();
        };
        toml::from_str::<Config>(&contents)
            .map(|config| config.install.preferred_backend)
            .unwrap_or_default()
    }

    /// Persist a new preference, keeping the rest of the config intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub async fn set_preferred_backend(&self, preference: BackendPreference) -> Result<(), Error> {
        let mut config = if self.config_path.exists() {
            Config::load_from_file(&self.config_path).await?
        } else {
            Config::default()
        };
        config.install.preferred_backend = preference;
        config.save_to_file(&self.config_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_types::BackendKind;

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("config.toml"));
        assert_eq!(
            store.preferred_backend().await.kind(),
            BackendKind::Session
        );
    }

    #[tokio::test]
    async fn set_then_read_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("config.toml"));

        store
            .set_preferred_backend(BackendKind::Broker.into())
            .await
            .unwrap();
        assert_eq!(store.preferred_backend().await.kind(), BackendKind::Broker);

        // A second write is picked up by the same store instance.
        store
            .set_preferred_backend(BackendKind::Root.into())
            .await
            .unwrap();
        assert_eq!(store.preferred_backend().await.kind(), BackendKind::Root);
    }
}
