#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for stagehand
//!
//! This crate defines the seams between the install orchestrator and the
//! device it runs on:
//! - Package queries (installed state, version codes, update ownership)
//! - The install-session broker (open/inspect/abandon sessions)
//! - Privilege probes (elevated shell, privilege broker)
//!
//! Session lifecycle notifications do not flow through these traits;
//! the broker implementation emits typed `SessionEvent`s onto the
//! session channel from `stagehand-events`, and the orchestrator is the
//! sole consumer. The `sim` module provides an in-process implementation
//! used by the CLI demo loop and by integration tests.

pub mod packages;
pub mod sessions;
pub mod sim;
pub mod types;

pub use packages::PackageQueries;
pub use sessions::{BrokerAccess, SessionBroker, ShellAccess};
pub use sim::SimPlatform;
pub use types::{PackageInfo, SessionInfo, SessionSpec};

/// Aggregate platform handle providing access to all platform seams.
pub struct Platform {
    packages: Box<dyn PackageQueries>,
    sessions: Box<dyn SessionBroker>,
    shell: Box<dyn ShellAccess>,
    broker: Box<dyn BrokerAccess>,
}

impl Platform {
    /// Create a platform instance from the individual seam implementations.
    #[must_use]
    pub fn new(
        packages: Box<dyn PackageQueries>,
        sessions: Box<dyn SessionBroker>,
        shell: Box<dyn ShellAccess>,
        broker: Box<dyn BrokerAccess>,
    ) -> Self {
        Self {
            packages,
            sessions,
            shell,
            broker,
        }
    }

    #[must_use]
    pub fn packages(&self) -> &dyn PackageQueries {
        self.packages.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionBroker {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn shell(&self) -> &dyn ShellAccess {
        self.shell.as_ref()
    }

    #[must_use]
    pub fn broker(&self) -> &dyn BrokerAccess {
        self.broker.as_ref()
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
