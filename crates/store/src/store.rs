//! Pending-operation store implementation

use std::path::Path;

use sqlx::{Pool, Sqlite};
use stagehand_errors::Error;
use stagehand_events::{AppEvent, EventEmitter, EventSender, StoreEvent};
use stagehand_types::{ArtifactRecord, ArtifactStatus, BackendKind, SharedLib};
use tokio::sync::watch;

use crate::queries;

/// A full-snapshot view of the queue at some point in time.
pub type Snapshot = Vec<ArtifactRecord>;

/// Receiver half of the store's change stream. Each emission carries the
/// complete current record list.
pub type SnapshotReceiver = watch::Receiver<Snapshot>;

/// Persisted, continuously observable collection of artifact records.
#[derive(Clone)]
pub struct PendingStore {
    pool: Pool<Sqlite>,
    snapshots: watch::Sender<Snapshot>,
    tx: Option<EventSender>,
}

impl EventEmitter for PendingStore {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl PendingStore {
    /// Open (creating if necessary) the store at the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn open(state_dir: &Path, tx: Option<EventSender>) -> Result<Self, Error> {
        tokio::fs::create_dir_all(state_dir).await?;
        let db_path = state_dir.join("pending.sqlite");
        let pool = crate::create_pool(&db_path).await?;
        crate::run_migrations(&pool).await?;
        Self::with_pool(pool, tx).await
    }

    /// Build a store over an existing pool (migrations must have run).
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot query fails.
    pub async fn with_pool(pool: Pool<Sqlite>, tx: Option<EventSender>) -> Result<Self, Error> {
        let initial = queries::all_records(&pool).await?;
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            pool,
            snapshots,
            tx,
        })
    }

    /// Subscribe to the live change stream. The receiver immediately
    /// holds the current snapshot and observes every later mutation.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.snapshots.subscribe()
    }

    /// One-shot read of the full current record list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn snapshot(&self) -> Result<Snapshot, Error> {
        queries::all_records(&self.pool).await
    }

    /// Fetch a single record by package identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, package_id: &str) -> Result<Option<ArtifactRecord>, Error> {
        queries::get_record(&self.pool, package_id).await
    }

    /// Insert or replace a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn upsert(&self, record: &ArtifactRecord) -> Result<(), Error> {
        queries::upsert_record(&self.pool, record).await?;
        self.emit(AppEvent::Store(StoreEvent::Upserted {
            package: record.package_id.clone(),
        }));
        self.publish().await
    }

    /// Update only the status field of a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn update_status(
        &self,
        package_id: &str,
        status: ArtifactStatus,
    ) -> Result<(), Error> {
        queries::update_status(&self.pool, package_id, status).await?;
        self.emit(AppEvent::Store(StoreEvent::StatusChanged {
            package: package_id.to_string(),
            status,
        }));
        self.publish().await
    }

    /// Replace a record's shared library list.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn update_shared_libs(
        &self,
        package_id: &str,
        shared_libs: &[SharedLib],
    ) -> Result<(), Error> {
        queries::update_shared_libs(&self.pool, package_id, shared_libs).await?;
        self.publish().await
    }

    /// Update a record's install bookkeeping fields. Values are written
    /// as given; preserve-once-set merging is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn update_install_details(
        &self,
        package_id: &str,
        backend: Option<BackendKind>,
        session_id: Option<i32>,
        install_progress: Option<i32>,
        installed_at: Option<i64>,
    ) -> Result<(), Error> {
        queries::update_install_details(
            &self.pool,
            package_id,
            backend,
            session_id,
            install_progress,
            installed_at,
        )
        .await?;
        self.publish().await
    }

    /// Remove a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn delete(&self, package_id: &str) -> Result<(), Error> {
        queries::delete_record(&self.pool, package_id).await?;
        self.emit(AppEvent::Store(StoreEvent::Deleted {
            package: package_id.to_string(),
        }));
        self.publish().await
    }

    /// Remove every record (explicit user sweep).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn delete_all(&self) -> Result<(), Error> {
        queries::delete_all(&self.pool).await?;
        self.publish().await
    }

    /// Re-read the table and push the full snapshot to all observers.
    async fn publish(&self) -> Result<(), Error> {
        let records = queries::all_records(&self.pool).await?;
        // send_replace never fails even with zero receivers.
        self.snapshots.send_replace(records);
        Ok(())
    }
}
