//! Artifact record definitions
//!
//! An artifact is one package (plus optional shared libraries) tracked by
//! the pending-operation store from the moment it is queued until it is
//! installed or removed.

use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an artifact record.
///
/// Pre-install states (`Queued` through `Completed`/`Unavailable`) are
/// owned by the download pipeline; install states (`AwaitingInstall`
/// onward) are owned by the orchestrator. No transition skips
/// `AwaitingInstall` on the way to `Installing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Queued,
    Downloading,
    Failed,
    Cancelled,
    Completed,
    Unavailable,
    AwaitingInstall,
    Installing,
    Installed,
}

impl ArtifactStatus {
    /// Terminal states from the user's point of view.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            Self::Failed | Self::Cancelled | Self::Completed | Self::Installed
        )
    }

    /// States where the download pipeline is still working.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Queued | Self::Downloading)
    }

    /// States where the install orchestrator owns the record.
    #[must_use]
    pub fn is_installing(self) -> bool {
        matches!(self, Self::AwaitingInstall | Self::Installing)
    }

    /// Stable string form used for database storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Unavailable => "unavailable",
            Self::AwaitingInstall => "awaiting_install",
            Self::Installing => "installing",
            Self::Installed => "installed",
        }
    }

    /// Parse the database string form back into a status.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "queued" => Self::Queued,
            "downloading" => Self::Downloading,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "completed" => Self::Completed,
            "unavailable" => Self::Unavailable,
            "awaiting_install" => Self::AwaitingInstall,
            "installing" => Self::Installing,
            "installed" => Self::Installed,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependent shared library installed alongside a primary artifact.
///
/// The platform tracks each library in its own install session, so every
/// lib carries its own backend/session/progress fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLib {
    pub package_id: String,
    pub version_code: i64,
    pub backend: Option<BackendKind>,
    pub session_id: Option<i32>,
    pub install_progress: Option<i32>,
    pub installed_at: Option<i64>,
}

impl SharedLib {
    /// Create a lib entry with no install metadata yet.
    #[must_use]
    pub fn new(package_id: impl Into<String>, version_code: i64) -> Self {
        Self {
            package_id: package_id.into(),
            version_code,
            backend: None,
            session_id: None,
            install_progress: None,
            installed_at: None,
        }
    }
}

/// One package under install/update management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Unique key across all records.
    pub package_id: String,
    pub version_code: i64,
    pub display_name: String,
    pub size: u64,
    /// SDK level the package declares as its target.
    pub target_sdk: i32,
    pub status: ArtifactStatus,
    /// Dependent libraries, ordered; empty for most packages.
    pub shared_libs: Vec<SharedLib>,
    /// Backend that last claimed this record; preserved once set.
    pub backend: Option<BackendKind>,
    /// Platform session handle; preserved once set.
    pub session_id: Option<i32>,
    /// Install progress, 0-100.
    pub install_progress: Option<i32>,
    /// Epoch millis of install completion.
    pub installed_at: Option<i64>,
}

impl ArtifactRecord {
    /// Create a freshly queued record, as the download pipeline would.
    #[must_use]
    pub fn new_queued(
        package_id: impl Into<String>,
        version_code: i64,
        display_name: impl Into<String>,
        size: u64,
        target_sdk: i32,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            version_code,
            display_name: display_name.into(),
            size,
            target_sdk,
            status: ArtifactStatus::Queued,
            shared_libs: Vec::new(),
            backend: None,
            session_id: None,
            install_progress: None,
            installed_at: None,
        }
    }

    /// Attach dependent shared libraries.
    #[must_use]
    pub fn with_shared_libs(mut self, libs: Vec<SharedLib>) -> Self {
        self.shared_libs = libs;
        self
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    #[must_use]
    pub fn is_installing(&self) -> bool {
        self.status.is_installing()
    }

    /// Whether this record or one of its shared libs owns the given
    /// target package identity.
    #[must_use]
    pub fn covers_package(&self, package_id: &str) -> bool {
        self.package_id == package_id
            || self.shared_libs.iter().any(|lib| lib.package_id == package_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ArtifactStatus::Installed.is_finished());
        assert!(ArtifactStatus::Completed.is_finished());
        assert!(ArtifactStatus::Queued.is_running());
        assert!(ArtifactStatus::AwaitingInstall.is_installing());
        assert!(ArtifactStatus::Installing.is_installing());
        assert!(!ArtifactStatus::Installing.is_finished());
    }

    #[test]
    fn status_round_trips_through_db_form() {
        for status in [
            ArtifactStatus::Queued,
            ArtifactStatus::Downloading,
            ArtifactStatus::Failed,
            ArtifactStatus::Cancelled,
            ArtifactStatus::Completed,
            ArtifactStatus::Unavailable,
            ArtifactStatus::AwaitingInstall,
            ArtifactStatus::Installing,
            ArtifactStatus::Installed,
        ] {
            assert_eq!(ArtifactStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ArtifactStatus::parse("bogus"), None);
    }

    #[test]
    fn covers_package_matches_primary_and_libs() {
        let record = ArtifactRecord::new_queued("com.example.app", 42, "Example", 1024, 33)
            .with_shared_libs(vec![SharedLib::new("com.example.lib", 7)]);

        assert!(record.covers_package("com.example.app"));
        assert!(record.covers_package("com.example.lib"));
        assert!(!record.covers_package("com.example.other"));
    }
}
