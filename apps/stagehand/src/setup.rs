//! System setup and component initialization

use std::path::PathBuf;
use std::sync::Arc;

use stagehand_config::{Config, PreferenceStore};
use stagehand_events::{EventSender, SessionEventReceiver};
use stagehand_install::identity::{COMPANION_SERVICE_PACKAGE, HELPER_PACKAGE};
use stagehand_install::{Orchestrator, Selector};
use stagehand_platform::SimPlatform;
use stagehand_store::PendingStore;

use crate::error::CliError;

/// Wires the store, platform, and orchestrator together from config.
///
/// The platform here is the simulated one, profiled by the `[platform]`
/// config table; a device build would substitute its real bindings at
/// this point and leave the rest untouched.
pub struct SystemSetup {
    config: Config,
    config_path: PathBuf,
    store: Option<PendingStore>,
    orchestrator: Option<Arc<Orchestrator>>,
    sessions: Option<SessionEventReceiver>,
}

impl SystemSetup {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
            store: None,
            orchestrator: None,
            sessions: None,
        }
    }

    /// Initialize all system components.
    pub async fn initialize(&mut self, event_sender: EventSender) -> Result<(), CliError> {
        let state_dir = self.config.state_dir()?;
        tokio::fs::create_dir_all(&state_dir)
            .await
            .map_err(|e| CliError::Setup(format!("cannot create {}: {e}", state_dir.display())))?;

        let (session_tx, session_rx) = stagehand_events::session_channel();

        let platform_config = &self.config.platform;
        let mut builder = SimPlatform::builder(session_tx)
            .sdk_version(platform_config.sdk_version)
            .elevated_shell(platform_config.elevated_shell)
            .broker(
                platform_config.broker_reachable,
                platform_config.broker_permission_granted,
            )
            .auto_drive(true);
        if let Some(version) = platform_config.companion_service_version {
            builder = builder.installed_package(COMPANION_SERVICE_PACKAGE, version);
        }
        if platform_config.helper_app_installed {
            builder = builder.installed_package(HELPER_PACKAGE, 1);
        }
        let platform = Arc::new(builder.build().into_platform());

        let store = PendingStore::open(&state_dir, Some(event_sender.clone())).await?;
        let preferences = PreferenceStore::new(self.config_path.clone());
        let selector = Selector::new(platform.clone(), preferences);
        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            platform,
            selector,
            Some(event_sender),
        ));

        self.store = Some(store);
        self.orchestrator = Some(orchestrator);
        self.sessions = Some(session_rx);
        Ok(())
    }

    pub fn store(&self) -> &PendingStore {
        self.store.as_ref().expect("store not initialized")
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.orchestrator
            .as_ref()
            .expect("orchestrator not initialized")
            .clone()
    }

    pub fn preferences(&self) -> PreferenceStore {
        PreferenceStore::new(self.config_path.clone())
    }

    /// Take the session receiver; the `run` command hands it to the
    /// orchestration loop.
    pub fn take_sessions(&mut self) -> SessionEventReceiver {
        self.sessions.take().expect("sessions already taken")
    }
}
