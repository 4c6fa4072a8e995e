//! Install backend identities and capability descriptors

use serde::{Deserialize, Serialize};

/// The enumerated set of install backends.
///
/// Exactly one backend handles any given dispatch. `Session` is the
/// designated default: it is available on every supported platform and is
/// the fallback target whenever a preferred backend's prerequisites are
/// missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Platform install-session flow, user confirmation where required.
    Session,
    /// Legacy intent-style install; kept for compatibility, never silent.
    Native,
    /// Elevated shell (root) install.
    Root,
    /// Companion privileged service.
    Service,
    /// Third-party privileged helper app.
    Helper,
    /// Inter-process privilege broker.
    Broker,
}

impl BackendKind {
    pub const ALL: [Self; 6] = [
        Self::Session,
        Self::Native,
        Self::Root,
        Self::Service,
        Self::Helper,
        Self::Broker,
    ];

    /// Human-readable label for capability listings.
    #[must_use]
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Session => "Session installer",
            Self::Native => "Native installer",
            Self::Root => "Root installer",
            Self::Service => "Service installer",
            Self::Helper => "Helper app installer",
            Self::Broker => "Privilege broker installer",
        }
    }

    /// Stable integer used by the preference store.
    #[must_use]
    pub fn as_preference(self) -> i64 {
        match self {
            Self::Session => 0,
            Self::Native => 1,
            Self::Root => 2,
            Self::Service => 3,
            Self::Helper => 4,
            Self::Broker => 5,
        }
    }

    /// Stable string form used for database storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Native => "native",
            Self::Root => "root",
            Self::Service => "service",
            Self::Helper => "helper",
            Self::Broker => "broker",
        }
    }

    /// Parse the database string form back into a backend identity.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "session" => Self::Session,
            "native" => Self::Native,
            "root" => Self::Root,
            "service" => Self::Service,
            "helper" => Self::Helper,
            "broker" => Self::Broker,
            _ => return None,
        })
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's stored backend preference.
///
/// A preference is not a guarantee: resolution falls back to the default
/// backend when the preferred mechanism is unavailable. Unknown stored
/// integers resolve to the default rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendPreference(pub i64);

impl BackendPreference {
    /// Decode the stored integer, defaulting to the session backend.
    #[must_use]
    pub fn kind(self) -> BackendKind {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_preference() == self.0)
            .unwrap_or(BackendKind::Session)
    }
}

impl Default for BackendPreference {
    fn default() -> Self {
        Self(BackendKind::Session.as_preference())
    }
}

impl From<BackendKind> for BackendPreference {
    fn from(kind: BackendKind) -> Self {
        Self(kind.as_preference())
    }
}

/// Ephemeral capability descriptor for one backend.
///
/// Recomputed on demand, never persisted. Availability is evaluated
/// separately by the selector; a descriptor only says the backend's
/// prerequisites are structurally present on this platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub display_label: String,
}

impl BackendDescriptor {
    #[must_use]
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            display_label: kind.display_label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_round_trips() {
        for kind in BackendKind::ALL {
            assert_eq!(BackendPreference::from(kind).kind(), kind);
        }
    }

    #[test]
    fn unknown_preference_falls_back_to_session() {
        assert_eq!(BackendPreference(99).kind(), BackendKind::Session);
        assert_eq!(BackendPreference(-1).kind(), BackendKind::Session);
    }

    #[test]
    fn backend_string_round_trips() {
        for kind in BackendKind::ALL {
            assert_eq!(BackendKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(BackendKind::parse("unknown"), None);
    }
}
