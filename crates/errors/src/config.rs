//! Configuration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to write config file {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}
