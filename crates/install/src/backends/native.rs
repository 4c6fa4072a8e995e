//! Legacy native backend
//!
//! Pre-session install path kept for compatibility with setups that
//! still prefer it. Never capable of silent installs.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::Error;
use stagehand_platform::Platform;
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind};

use crate::identity::APP_PACKAGE;

use super::{open_artifact_sessions, InstallBackend};

pub struct NativeBackend {
    platform: Arc<Platform>,
}

impl NativeBackend {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl InstallBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn descriptor(&self) -> Option<BackendDescriptor> {
        Some(BackendDescriptor::new(BackendKind::Native))
    }

    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error> {
        open_artifact_sessions(&self.platform, record, APP_PACKAGE).await
    }

    async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        self.platform.sessions().request_uninstall(package_id).await
    }
}
