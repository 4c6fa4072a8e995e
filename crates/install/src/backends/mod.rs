//! The install backend set
//!
//! One implementation per privilege mechanism, polymorphic over
//! `InstallBackend`. Backends initiate platform install sessions and
//! return without waiting; completion is observed through session
//! events. Low-level transports (shell invocation, service binding, IPC
//! handshakes) live behind the platform seam and are not modelled here.

mod broker;
mod helper;
mod native;
mod root;
mod service;
mod session;

pub use broker::BrokerBackend;
pub use helper::HelperBackend;
pub use native::NativeBackend;
pub use root::RootBackend;
pub use service::ServiceBackend;
pub use session::SessionBackend;

use std::sync::Arc;

use async_trait::async_trait;
use stagehand_errors::{Error, InstallError};
use stagehand_platform::{Platform, SessionSpec};
use stagehand_types::{ArtifactRecord, BackendDescriptor, BackendKind};

/// The uniform contract every backend satisfies.
#[async_trait]
pub trait InstallBackend: Send + Sync {
    /// Which backend identity this implementation carries.
    fn kind(&self) -> BackendKind;

    /// Capability metadata, or `None` when the backend's prerequisites
    /// are structurally absent on this platform (current runtime
    /// availability is the selector's concern, not the descriptor's).
    fn descriptor(&self) -> Option<BackendDescriptor>;

    /// Initiate install sessions for the artifact and all of its shared
    /// libraries, returning before any of them complete.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::DispatchFailed`] if the platform rejects
    /// any of the session requests.
    async fn install(&self, record: &ArtifactRecord) -> Result<(), Error>;

    /// Request removal of a package. For the default backend this hands
    /// the user an OS confirmation prompt; no completion callback is
    /// available on that path.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be presented.
    async fn uninstall(&self, package_id: &str) -> Result<(), Error>;
}

/// Open one session per shared library, then one for the primary
/// artifact. The platform tracks each independently.
pub(crate) async fn open_artifact_sessions(
    platform: &Platform,
    record: &ArtifactRecord,
    owner_package: &str,
) -> Result<(), Error> {
    for lib in &record.shared_libs {
        platform
            .sessions()
            .open_session(SessionSpec::new(
                &lib.package_id,
                owner_package,
                lib.version_code,
            ))
            .await
            .map_err(|e| dispatch_error(&lib.package_id, &e))?;
    }
    platform
        .sessions()
        .open_session(SessionSpec::new(
            &record.package_id,
            owner_package,
            record.version_code,
        ))
        .await
        .map_err(|e| dispatch_error(&record.package_id, &e))?;
    Ok(())
}

fn dispatch_error(package: &str, source: &Error) -> Error {
    InstallError::DispatchFailed {
        package: package.to_string(),
        message: source.to_string(),
    }
    .into()
}

/// All six backends over one shared platform handle.
pub struct BackendSet {
    session: SessionBackend,
    native: NativeBackend,
    root: RootBackend,
    service: ServiceBackend,
    helper: HelperBackend,
    broker: BrokerBackend,
}

impl BackendSet {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self {
            session: SessionBackend::new(platform.clone()),
            native: NativeBackend::new(platform.clone()),
            root: RootBackend::new(platform.clone()),
            service: ServiceBackend::new(platform.clone()),
            helper: HelperBackend::new(platform.clone()),
            broker: BrokerBackend::new(platform),
        }
    }

    /// Look up the backend carrying the given identity.
    #[must_use]
    pub fn get(&self, kind: BackendKind) -> &dyn InstallBackend {
        match kind {
            BackendKind::Session => &self.session,
            BackendKind::Native => &self.native,
            BackendKind::Root => &self.root,
            BackendKind::Service => &self.service,
            BackendKind::Helper => &self.helper,
            BackendKind::Broker => &self.broker,
        }
    }

    /// Iterate every backend in preference-table order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn InstallBackend> {
        BackendKind::ALL.iter().map(|kind| self.get(*kind))
    }
}
