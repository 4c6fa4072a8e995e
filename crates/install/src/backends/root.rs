//! Elevated-shell (root) backend
//!
//! Installs through an elevated shell grant. Sessions still surface
//! through the platform broker, so progress tracking is identical to
//! the default backend; the difference is that no user confirmation is
//! involved.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::Error;
use stagehand_platform::Platform;
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind};

use crate::identity::APP_PACKAGE;

use super::{open_artifact_sessions, InstallBackend};

pub struct RootBackend {
    platform: Arc<Platform>,
}

impl RootBackend {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl InstallBackend for RootBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Root
    }

    fn descriptor(&self) -> Option<BackendDescriptor> {
        Some(BackendDescriptor::new(BackendKind::Root))
    }

    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error> {
        open_artifact_sessions(&self.platform, record, APP_PACKAGE).await
    }

    async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        self.platform.sessions().request_uninstall(package_id).await
    }
}
