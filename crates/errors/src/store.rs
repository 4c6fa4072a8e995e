//! Pending-operation store error types
//!
//! Store-write failures are fatal configuration errors and propagate to
//! the caller of the operation in progress.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoreError {
    #[error("database error: {message}")]
    DatabaseError { message: String },

    #[error("migration failed: {message}")]
    MigrationFailed { message: String },

    #[error("record not found: {package}")]
    RecordNotFound { package: String },

    #[error("corrupt record for {package}: {message}")]
    CorruptRecord { package: String, message: String },
}
