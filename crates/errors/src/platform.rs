//! Platform session broker error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("session open failed for {package}: {message}")]
    SessionOpenFailed { package: String, message: String },

    #[error("session {session_id} not found")]
    SessionNotFound { session_id: i32 },

    #[error("session abandon failed for {session_id}: {message}")]
    SessionAbandonFailed { session_id: i32, message: String },

    #[error("package query failed for {package}: {message}")]
    PackageQueryFailed { package: String, message: String },
}
