#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the stagehand install orchestrator
//!
//! This crate provides the fundamental types shared across the system:
//! artifact records, install statuses, backend identities, and the
//! platform SDK-level policy tables.

pub mod artifact;
pub mod backend;
pub mod sdk;

pub use artifact::{ArtifactRecord, ArtifactStatus, SharedLib};
pub use backend::{BackendDescriptor, BackendKind, BackendPreference};
pub use sdk::{
    silent_update_target_sdk, SDK_BROKER_MIN, SDK_OWNERLESS_SILENT_MIN,
};
