#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Install orchestration for stagehand
//!
//! This crate is the core of the system: it probes which privileged
//! install mechanisms the running environment permits, resolves the
//! user's backend preference against those probes, dispatches queued
//! artifacts to the selected backend, and reconciles asynchronous
//! session events against the pending-operation store.
//!
//! The orchestrator is a single event loop over two inputs: the store's
//! full-snapshot change stream and the platform's session events. All
//! writes go through the store, which is the single source of truth;
//! transitions are idempotent or last-write-safe, so no extra locking
//! is needed.

pub mod backends;
pub mod identity;
pub mod orchestrator;
pub mod probe;
pub mod selector;
mod session;

pub use backends::{BackendSet, InstallBackend};
pub use orchestrator::Orchestrator;
pub use probe::{CapabilityProber, ProbeState};
pub use selector::Selector;
