//! Installation system error types

use std::borrow::Cow;

use thiserror::Error;

use crate::UserFacingError;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstallError {
    #[error("installation failed: {message}")]
    Failed { message: String },

    #[error("backend dispatch failed for {package}: {message}")]
    DispatchFailed { package: String, message: String },

    #[error("backend unavailable: {backend}")]
    BackendUnavailable { backend: String },

    #[error("record not found: {package}")]
    RecordNotFound { package: String },

    #[error("record not ready for install: {package} is {status}")]
    NotReadyForInstall { package: String, status: String },

    #[error("uninstall request failed for {package}: {message}")]
    UninstallFailed { package: String, message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BackendUnavailable { .. } => {
                Some("Pick a different install backend or install its prerequisites.")
            }
            Self::NotReadyForInstall { .. } => {
                Some("Only fully retrieved artifacts can be queued for install.")
            }
            _ => None,
        }
    }
}
