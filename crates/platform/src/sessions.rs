//! Install-session broker and privilege probe seams

use async_trait::async_trait;
use stagehand_errors::Error;

use crate::types::{SessionInfo, SessionSpec};

/// The platform's install-session mechanism.
///
/// Opening a session starts an asynchronous install; completion is
/// observed through `SessionEvent`s on the session channel, never by
/// waiting on these calls.
#[async_trait]
pub trait SessionBroker: Send + Sync {
    /// Open an install session and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the session request.
    async fn open_session(&self, spec: SessionSpec) -> Result<i32, Error>;

    /// Resolve a session identifier to its descriptor, `None` when the
    /// session is unknown.
    async fn session_info(&self, session_id: i32) -> Option<SessionInfo>;

    /// Abandon a session unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already gone; callers treat
    /// this as non-fatal.
    async fn abandon(&self, session_id: i32) -> Result<(), Error>;

    /// Hand an uninstall confirmation prompt to the platform.
    /// Fire-and-forget; no completion callback exists for this path.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be presented.
    async fn request_uninstall(&self, package_id: &str) -> Result<(), Error>;
}

/// Elevated shell access probe. Grant state is cached by the shell
/// subsystem itself, not by implementations of this trait.
pub trait ShellAccess: Send + Sync {
    fn has_elevated_shell(&self) -> bool;
}

/// Privilege broker reachability and permission probes.
pub trait BrokerAccess: Send + Sync {
    /// Whether a broker endpoint is present and answering.
    fn is_reachable(&self) -> bool;

    /// Whether this process has been granted the broker permission.
    fn permission_granted(&self) -> bool;
}
