//! Third-party helper backend
//!
//! Delegates installs to an external helper app. Whether the helper can
//! auto-update anything is opaque to us, so this backend never reports
//! silent capability.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::Error;
use stagehand_platform::Platform;
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind};

use crate::identity::HELPER_PACKAGE;

use super::{open_artifact_sessions, InstallBackend};

pub struct HelperBackend {
    platform: Arc<Platform>,
}

impl HelperBackend {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl InstallBackend for HelperBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Helper
    }

    fn descriptor(&self) -> Option<BackendDescriptor> {
        Some(BackendDescriptor::new(BackendKind::Helper))
    }

    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error> {
        open_artifact_sessions(&self.platform, record, HELPER_PACKAGE).await
    }

    async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        self.platform.sessions().request_uninstall(package_id).await
    }
}
