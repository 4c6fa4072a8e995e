use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};

pub mod general;
pub mod install;
pub mod session;
pub mod store;

pub use general::GeneralEvent;
pub use install::InstallEvent;
pub use session::SessionEvent;
pub use store::StoreEvent;

/// Top-level application event enum that aggregates all domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Install orchestration events (dispatch, completion, reconcile)
    Install(InstallEvent),

    /// Pending-operation store events (record transitions)
    Store(StoreEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Install(_) => EventSource::INSTALL,
            Self::Store(_) => EventSource::STORE,
        }
    }

    /// Default severity used when no explicit level is attached.
    #[must_use]
    pub fn default_level(&self) -> EventLevel {
        match self {
            Self::General(event) => event.default_level(),
            Self::Install(event) => event.default_level(),
            Self::Store(_) => EventLevel::Debug,
        }
    }
}
