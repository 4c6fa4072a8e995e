//! Companion-service backend
//!
//! Hands installs to the privileged companion service; sessions it
//! opens are owned by the companion identity, which is part of our
//! known-installer set so its callbacks still reach the orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::Error;
use stagehand_platform::Platform;
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind};

use crate::identity::COMPANION_SERVICE_PACKAGE;

use super::{open_artifact_sessions, InstallBackend};

pub struct ServiceBackend {
    platform: Arc<Platform>,
}

impl ServiceBackend {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl InstallBackend for ServiceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Service
    }

    fn descriptor(&self) -> Option<BackendDescriptor> {
        Some(BackendDescriptor::new(BackendKind::Service))
    }

    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error> {
        open_artifact_sessions(&self.platform, record, COMPANION_SERVICE_PACKAGE).await
    }

    async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        self.platform.sessions().request_uninstall(package_id).await
    }
}
