//! Platform data types

use serde::{Deserialize, Serialize};

/// Installed-package metadata returned by package queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub package_id: String,
    pub version_code: i64,
    /// Whether the package is enabled (a disabled companion service does
    /// not count as available).
    pub enabled: bool,
}

/// Descriptor for one platform install session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: i32,
    /// Package identity of the installer that opened the session.
    pub owner_package: String,
    /// Package identity being installed by the session.
    pub target_package: String,
    pub version_code: i64,
    /// Progress fraction in `0.0..=1.0`.
    pub progress: f32,
}

/// Request to open a new install session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Package identity being installed.
    pub target_package: String,
    /// Installer identity that will own the session.
    pub owner_package: String,
    pub version_code: i64,
}

impl SessionSpec {
    #[must_use]
    pub fn new(
        target_package: impl Into<String>,
        owner_package: impl Into<String>,
        version_code: i64,
    ) -> Self {
        Self {
            target_package: target_package.into(),
            owner_package: owner_package.into(),
            version_code,
        }
    }
}
