//! Privilege-broker backend
//!
//! Installs through an inter-process privilege broker. The mechanism
//! does not exist on platforms older than `SDK_BROKER_MIN`, so the
//! descriptor is `None` there; on newer platforms the descriptor is
//! present regardless of whether the broker is currently reachable.

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::Error;
use stagehand_platform::Platform;
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind, SDK_BROKER_MIN};

use crate::identity::APP_PACKAGE;

use super::{open_artifact_sessions, InstallBackend};

pub struct BrokerBackend {
    platform: Arc<Platform>,
}

impl BrokerBackend {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl InstallBackend for BrokerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Broker
    }

    fn descriptor(&self) -> Option<BackendDescriptor> {
        if self.platform.packages().sdk_version() < SDK_BROKER_MIN {
            return None;
        }
        Some(BackendDescriptor::new(BackendKind::Broker))
    }

    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error> {
        open_artifact_sessions(&self.platform, record, APP_PACKAGE).await
    }

    async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        self.platform.sessions().request_uninstall(package_id).await
    }
}
