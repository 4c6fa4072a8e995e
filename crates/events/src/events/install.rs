use serde::{Deserialize, Serialize};
use stagehand_types::BackendKind;

use crate::EventLevel;

/// Install orchestration events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// An artifact was marked awaiting install
    Enqueued { package: String },

    /// An awaiting artifact was handed to a backend
    Dispatched { package: String, backend: BackendKind },

    /// The backend's install call raised; the record's status is left
    /// unmodified, only a finished callback drives FAILED
    DispatchFailed {
        package: String,
        backend: BackendKind,
        error: String,
    },

    /// A platform session reached a terminal state for this artifact
    Finished { package: String, success: bool },

    /// Startup reconciliation abandoned an orphaned session
    SessionAbandoned { session_id: i32 },

    /// Abandoning an orphaned session failed (non-fatal, session was
    /// likely already gone)
    SessionAbandonFailed { session_id: i32, error: String },

    /// A session callback was ignored because its owner is not one of
    /// our known identities, or it matched no record
    SessionIgnored { session_id: i32, owner: Option<String> },

    /// An uninstall confirmation prompt was handed to the platform
    UninstallRequested { package: String },
}

impl InstallEvent {
    #[must_use]
    pub fn default_level(&self) -> EventLevel {
        match self {
            Self::Enqueued { .. }
            | Self::Dispatched { .. }
            | Self::Finished { .. }
            | Self::UninstallRequested { .. } => EventLevel::Info,
            Self::DispatchFailed { .. } => EventLevel::Error,
            Self::SessionAbandonFailed { .. } => EventLevel::Warn,
            Self::SessionAbandoned { .. } | Self::SessionIgnored { .. } => EventLevel::Debug,
        }
    }
}
