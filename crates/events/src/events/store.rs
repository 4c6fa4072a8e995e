use serde::{Deserialize, Serialize};
use stagehand_types::ArtifactStatus;

/// Pending-operation store events (observability only; the store's
/// watch stream, not these events, drives orchestration)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// A record's status field changed
    StatusChanged {
        package: String,
        status: ArtifactStatus,
    },

    /// A record was inserted or replaced
    Upserted { package: String },

    /// A record was removed
    Deleted { package: String },
}
