//! The install orchestrator
//!
//! One event loop over two inputs: the store's snapshot stream (every
//! mutation re-delivers the full record list) and the platform's
//! session events. Dispatch is driven purely by observed state, so a
//! record enqueued before the loop starts is dispatched exactly like
//! one enqueued while it runs. An in-flight guard keyed by package id
//! keeps snapshot re-deliveries from dispatching the same artifact
//! twice while its status is still `AwaitingInstall`.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use stagehand_errors::{Error, InstallError};
use stagehand_events::{
    AppEvent, EventEmitter, EventSender, InstallEvent, SessionEvent, SessionEventReceiver,
};
use stagehand_platform::Platform;
use stagehand_store::PendingStore;
use stagehand_types::{ArtifactRecord, ArtifactStatus, BackendDescriptor, BackendKind};
use tracing::debug;

use crate::backends::BackendSet;
use crate::identity::is_known_installer;
use crate::selector::Selector;
use crate::session::{merge_install_details, merge_shared_lib, progress_percent, resolve_record};

pub struct Orchestrator {
    store: PendingStore,
    platform: Arc<Platform>,
    backends: BackendSet,
    selector: Selector,
    tx: Option<EventSender>,
    /// Packages dispatched but not yet finished. Entries are cleared on
    /// terminal session events and on dispatch failure.
    in_flight: DashMap<String, ()>,
}

impl EventEmitter for Orchestrator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        store: PendingStore,
        platform: Arc<Platform>,
        selector: Selector,
        tx: Option<EventSender>,
    ) -> Self {
        let backends = BackendSet::new(platform.clone());
        Self {
            store,
            platform,
            backends,
            selector,
            tx,
            in_flight: DashMap::new(),
        }
    }

    /// Mark a completed artifact as awaiting install.
    ///
    /// Idempotent for records already in the install pipeline. Records
    /// the download pipeline still owns are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::RecordNotFound`] for an unknown package,
    /// [`InstallError::NotReadyForInstall`] while the download is still
    /// running, or a store error if the status write fails.
    pub async fn enqueue_install(&self, package_id: &str) -> Result<(), Error> {
        let record = self
            .store
            .get(package_id)
            .await?
            .ok_or_else(|| InstallError::RecordNotFound {
                package: package_id.to_string(),
            })?;

        if record.is_installing() {
            debug!(package = package_id, "already enqueued, nothing to do");
            return Ok(());
        }
        if record.is_running() {
            return Err(InstallError::NotReadyForInstall {
                package: package_id.to_string(),
                status: record.status.to_string(),
            }
            .into());
        }

        // A re-enqueue after failure must be dispatchable again.
        self.in_flight.remove(package_id);
        self.store
            .update_status(package_id, ArtifactStatus::AwaitingInstall)
            .await?;
        self.emit(AppEvent::Install(InstallEvent::Enqueued {
            package: package_id.to_string(),
        }));
        Ok(())
    }

    /// Abandon every session recorded before this process started.
    ///
    /// Sessions in the store are orphans at startup: whatever was
    /// driving them died with the previous process. Each distinct
    /// session id is abandoned once; a failure to abandon means the
    /// session is already gone and is logged, never propagated.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    pub async fn reconcile(&self) -> Result<(), Error> {
        let records = self.store.snapshot().await?;
        let mut seen = HashSet::new();
        for record in &records {
            let Some(session_id) = record.session_id else {
                continue;
            };
            if !seen.insert(session_id) {
                continue;
            }
            match self.platform.sessions().abandon(session_id).await {
                Ok(()) => {
                    self.emit(AppEvent::Install(InstallEvent::SessionAbandoned {
                        session_id,
                    }));
                }
                Err(error) => {
                    self.emit(AppEvent::Install(InstallEvent::SessionAbandonFailed {
                        session_id,
                        error: error.to_string(),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Run the orchestration loop until the session channel closes.
    ///
    /// Startup order is fixed: reconcile orphaned sessions, then start
    /// observing the store so the initial snapshot dispatches anything
    /// already awaiting install.
    ///
    /// # Errors
    ///
    /// Returns the first store read/write failure; dispatch and session
    /// handling errors short of that are reported as events.
    pub async fn run(&self, mut sessions: SessionEventReceiver) -> Result<(), Error> {
        self.reconcile().await?;

        let mut snapshots = self.store.subscribe();
        let initial = snapshots.borrow_and_update().clone();
        self.dispatch_awaiting(&initial).await?;

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let records = snapshots.borrow_and_update().clone();
                    self.dispatch_awaiting(&records).await?;
                }
                event = sessions.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    self.handle_session_event(event).await?;
                }
            }
        }
        Ok(())
    }

    /// Request removal of a package through the resolved backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot present the prompt.
    pub async fn uninstall(&self, package_id: &str) -> Result<(), Error> {
        let kind = self.selector.resolve().await;
        self.backends.get(kind).uninstall(package_id).await?;
        self.emit(AppEvent::Install(InstallEvent::UninstallRequested {
            package: package_id.to_string(),
        }));
        Ok(())
    }

    /// Whether the next dispatch for this package would need no user
    /// interaction.
    pub async fn can_install_silently(&self, package_id: &str, target_sdk: i32) -> bool {
        self.selector.can_install_silently(package_id, target_sdk).await
    }

    /// Capability listing for the currently available backends.
    pub async fn available_backends(&self) -> Vec<BackendDescriptor> {
        self.selector.available_backends().await
    }

    /// The backend the next dispatch would use.
    pub async fn resolved_backend(&self) -> BackendKind {
        self.selector.resolve().await
    }

    /// Hand every awaiting record to its resolved backend. The backend
    /// is resolved fresh per dispatch so a preference change between two
    /// enqueues takes effect. A failed dispatch leaves the record's
    /// status untouched; only a finished session event drives `Failed`.
    async fn dispatch_awaiting(&self, records: &[ArtifactRecord]) -> Result<(), Error> {
        for record in records {
            if record.status != ArtifactStatus::AwaitingInstall {
                continue;
            }
            if self.in_flight.insert(record.package_id.clone(), ()).is_some() {
                continue;
            }

            let kind = self.selector.resolve().await;
            match self.backends.get(kind).install(record).await {
                Ok(()) => {
                    self.emit(AppEvent::Install(InstallEvent::Dispatched {
                        package: record.package_id.clone(),
                        backend: kind,
                    }));
                }
                Err(error) => {
                    self.in_flight.remove(&record.package_id);
                    self.emit(AppEvent::Install(InstallEvent::DispatchFailed {
                        package: record.package_id.clone(),
                        backend: kind,
                        error: error.to_string(),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Apply one session event to the store.
    ///
    /// Events for sessions the platform no longer knows, for owners
    /// outside our identity set, or for packages with no record are
    /// ignored; the store is the only thing these handlers mutate.
    async fn handle_session_event(&self, event: SessionEvent) -> Result<(), Error> {
        let session_id = event.session_id();
        let Some(info) = self.platform.sessions().session_info(session_id).await else {
            self.emit(AppEvent::Install(InstallEvent::SessionIgnored {
                session_id,
                owner: None,
            }));
            return Ok(());
        };
        if !is_known_installer(&info.owner_package) {
            self.emit(AppEvent::Install(InstallEvent::SessionIgnored {
                session_id,
                owner: Some(info.owner_package),
            }));
            return Ok(());
        }

        let records = self.store.snapshot().await?;
        let Some(record) = resolve_record(&records, &info.target_package).cloned() else {
            self.emit(AppEvent::Install(InstallEvent::SessionIgnored {
                session_id,
                owner: Some(info.owner_package),
            }));
            return Ok(());
        };

        let backend = self.selector.resolve().await;
        let progress = match event {
            SessionEvent::Created { .. } => progress_percent(info.progress),
            SessionEvent::Progress { fraction, .. } => progress_percent(fraction),
            SessionEvent::Finished { success, .. } => {
                if success {
                    100
                } else {
                    record.install_progress.unwrap_or(0)
                }
            }
        };

        let is_primary = record.package_id == info.target_package;
        if is_primary {
            match event {
                SessionEvent::Created { .. } | SessionEvent::Progress { .. } => {
                    self.store
                        .update_status(&record.package_id, ArtifactStatus::Installing)
                        .await?;
                }
                SessionEvent::Finished { success, .. } => {
                    let status = if success {
                        ArtifactStatus::Installed
                    } else {
                        ArtifactStatus::Failed
                    };
                    self.store.update_status(&record.package_id, status).await?;
                }
            }
            let details = merge_install_details(&record, backend, session_id, progress);
            self.store
                .update_install_details(
                    &record.package_id,
                    details.backend,
                    details.session_id,
                    details.install_progress,
                    details.installed_at,
                )
                .await?;
        } else {
            // A dependent library's session only touches that library's
            // entry; the carrying record's own fields stay as they are.
            let libs = merge_shared_lib(&record, &info.target_package, backend, session_id, progress);
            self.store.update_shared_libs(&record.package_id, &libs).await?;
        }

        // Library sessions finishing do not end the dispatch; only the
        // primary session's terminal event does.
        if is_primary {
            if let SessionEvent::Finished { success, .. } = event {
                self.in_flight.remove(&record.package_id);
                self.emit(AppEvent::Install(InstallEvent::Finished {
                    package: record.package_id,
                    success,
                }));
            }
        }
        Ok(())
    }
}
