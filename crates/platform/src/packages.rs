//! Package query seam

use async_trait::async_trait;
use stagehand_errors::Error;

use crate::types::PackageInfo;

/// Read-only queries against the device's installed-package database.
///
/// Implementations must answer each call from current device state;
/// results are never cached by this layer.
#[async_trait]
pub trait PackageQueries: Send + Sync {
    /// Whether the package is currently installed.
    async fn is_installed(&self, package_id: &str) -> bool;

    /// Metadata for an installed package, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error only for query failures other than absence;
    /// callers treating this as a capability probe map errors to
    /// "unavailable".
    async fn package_info(&self, package_id: &str) -> Result<Option<PackageInfo>, Error>;

    /// Package identity recorded as the update owner of the target, if any.
    async fn update_owner(&self, package_id: &str) -> Option<String>;

    /// SDK level of the running platform.
    fn sdk_version(&self) -> i32;
}
