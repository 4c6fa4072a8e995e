//! Default session backend
//!
//! The ordinary unprivileged install flow: opens a platform install
//! session under our own identity and lets the platform drive user
//! confirmation where it is required. Always available on any supported
//! platform; the fallback target for every other backend.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::Error;
use stagehand_platform::Platform;
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind};

use crate::identity::APP_PACKAGE;

use super::{open_artifact_sessions, InstallBackend};

pub struct SessionBackend {
    platform: Arc<Platform>,
}

impl SessionBackend {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl InstallBackend for SessionBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Session
    }

    fn descriptor(&self) -> Option<BackendDescriptor> {
        Some(BackendDescriptor::new(BackendKind::Session))
    }

    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error> {
        open_artifact_sessions(&self.platform, record, APP_PACKAGE).await
    }

    async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        // Defers to an OS-level confirmation prompt; fire-and-forget.
        self.platform.sessions().request_uninstall(package_id).await
    }
}
