use serde::{Deserialize, Serialize};

/// Platform install-session lifecycle notifications.
///
/// These replace the platform's callback-style session observer: the
/// broker (or its binding) emits typed events onto the session channel
/// and the orchestrator consumes them in its event loop. Events arrive
/// on no guaranteed thread and out of order relative to store snapshot
/// emissions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A session was created for one of the artifacts we dispatched
    Created { session_id: i32 },

    /// Install progress changed; `fraction` is in `0.0..=1.0`
    Progress { session_id: i32, fraction: f32 },

    /// The session reached a terminal state
    Finished { session_id: i32, success: bool },
}

impl SessionEvent {
    /// The session identifier this event refers to.
    #[must_use]
    pub fn session_id(self) -> i32 {
        match self {
            Self::Created { session_id }
            | Self::Progress { session_id, .. }
            | Self::Finished { session_id, .. } => session_id,
        }
    }
}
