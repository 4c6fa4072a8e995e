//! End-to-end orchestration tests over the simulated platform.

use std::sync::Arc;
use std::time::Duration;

use stagehand_config::PreferenceStore;
use stagehand_errors::{Error, InstallError};
use stagehand_events::{AppEvent, EventReceiver, InstallEvent, SessionEventReceiver};
use stagehand_install::identity::{APP_DEBUG_PACKAGE, APP_PACKAGE};
use stagehand_install::{Orchestrator, Selector};
use stagehand_platform::PackageQueries;
use stagehand_platform::sim::SimPlatformBuilder;
use stagehand_platform::{SessionBroker, SessionSpec, SimPlatform};
use stagehand_store::PendingStore;
use stagehand_types::{ArtifactRecord, ArtifactStatus, BackendKind, SharedLib};
use tempfile::TempDir;
use tokio::time::sleep;

struct Harness {
    _dir: TempDir,
    sim: SimPlatform,
    store: PendingStore,
    orchestrator: Arc<Orchestrator>,
    app_events: EventReceiver,
    sessions: Option<SessionEventReceiver>,
}

impl Harness {
    fn spawn_loop(&mut self) {
        let orchestrator = self.orchestrator.clone();
        let sessions = self.sessions.take().unwrap();
        tokio::spawn(async move {
            orchestrator.run(sessions).await.unwrap();
        });
    }

    fn drain_install_events(&mut self) -> Vec<InstallEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.app_events.try_recv() {
            if let AppEvent::Install(event) = message.event {
                events.push(event);
            }
        }
        events
    }
}

async fn harness<F>(preference: BackendKind, configure: F) -> Harness
where
    F: FnOnce(SimPlatformBuilder) -> SimPlatformBuilder,
{
    let dir = tempfile::tempdir().unwrap();
    let (app_tx, app_rx) = stagehand_events::channel();
    let (session_tx, session_rx) = stagehand_events::session_channel();

    let sim = configure(SimPlatform::builder(session_tx)).build();
    let platform = Arc::new(sim.clone().into_platform());

    let store = PendingStore::open(dir.path(), Some(app_tx.clone()))
        .await
        .unwrap();
    let preferences = PreferenceStore::new(dir.path().join("config.toml"));
    preferences
        .set_preferred_backend(preference.into())
        .await
        .unwrap();

    let selector = Selector::new(platform.clone(), preferences);
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        platform,
        selector,
        Some(app_tx),
    ));

    Harness {
        _dir: dir,
        sim,
        store,
        orchestrator,
        app_events: app_rx,
        sessions: Some(session_rx),
    }
}

fn completed(package: &str) -> ArtifactRecord {
    let mut record = ArtifactRecord::new_queued(package, 7, "Test App", 4096, 31);
    record.status = ArtifactStatus::Completed;
    record
}

async fn wait_for_status(store: &PendingStore, package: &str, status: ArtifactStatus) {
    for _ in 0..100 {
        if let Some(record) = store.get(package).await.unwrap() {
            if record.status == status {
                return;
            }
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {package} to reach {status}");
}

async fn wait_for_sessions(sim: &SimPlatform, count: usize) {
    for _ in 0..100 {
        if sim.live_sessions() == count {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {count} live sessions");
}

#[tokio::test]
async fn root_preference_without_shell_falls_back_to_session() {
    let dir = tempfile::tempdir().unwrap();
    let (session_tx, _session_rx) = stagehand_events::session_channel();
    let sim = SimPlatform::builder(session_tx).build();
    let platform = Arc::new(sim.into_platform());

    let preferences = PreferenceStore::new(dir.path().join("config.toml"));
    preferences
        .set_preferred_backend(BackendKind::Root.into())
        .await
        .unwrap();

    let selector = Selector::new(platform, preferences);
    assert_eq!(selector.resolve().await, BackendKind::Session);
    assert!(!selector.can_install_silently("com.example.app", 30).await);
}

#[tokio::test]
async fn silent_update_requires_ownership_and_exact_target() {
    let dir = tempfile::tempdir().unwrap();
    let (session_tx, _session_rx) = stagehand_events::session_channel();
    let sim = SimPlatform::builder(session_tx)
        .sdk_version(34)
        .installed_package("com.example.app", 5)
        .installed_package("com.example.foreign", 5)
        .update_owner("com.example.app", APP_PACKAGE)
        .update_owner("com.example.foreign", "com.example.storefront")
        .build();
    let platform = Arc::new(sim.into_platform());
    let preferences = PreferenceStore::new(dir.path().join("config.toml"));
    let selector = Selector::new(platform, preferences);

    // SDK 34 mandates target SDK 31 for silent updates.
    assert!(selector.can_install_silently("com.example.app", 31).await);
    assert!(!selector.can_install_silently("com.example.app", 30).await);
    assert!(!selector.can_install_silently("com.example.foreign", 31).await);
    assert!(!selector.can_install_silently("com.example.absent", 31).await);
}

#[tokio::test]
async fn broker_backend_installs_silently_when_granted() {
    let dir = tempfile::tempdir().unwrap();
    let (session_tx, _session_rx) = stagehand_events::session_channel();
    let sim = SimPlatform::builder(session_tx).broker(true, true).build();
    let platform = Arc::new(sim.into_platform());
    let preferences = PreferenceStore::new(dir.path().join("config.toml"));
    preferences
        .set_preferred_backend(BackendKind::Broker.into())
        .await
        .unwrap();
    let selector = Selector::new(platform, preferences);

    assert_eq!(selector.resolve().await, BackendKind::Broker);
    assert!(selector.can_install_silently("com.example.app", 30).await);
}

#[tokio::test]
async fn enqueue_rejects_unknown_and_still_downloading() {
    let harness = harness(BackendKind::Session, |b| b).await;

    let err = harness
        .orchestrator
        .enqueue_install("com.example.absent")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Install(InstallError::RecordNotFound { .. })
    ));

    let mut downloading = completed("com.example.app");
    downloading.status = ArtifactStatus::Downloading;
    harness.store.upsert(&downloading).await.unwrap();
    let err = harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Install(InstallError::NotReadyForInstall { .. })
    ));
}

#[tokio::test]
async fn enqueue_is_idempotent_for_awaiting_records() {
    let harness = harness(BackendKind::Session, |b| b).await;
    harness
        .store
        .upsert(&completed("com.example.app"))
        .await
        .unwrap();

    harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap();
    // A second enqueue is a no-op, not an error.
    harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap();

    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(record.status, ArtifactStatus::AwaitingInstall);
}

#[tokio::test]
async fn awaiting_record_is_dispatched_exactly_once() {
    let mut harness = harness(BackendKind::Session, |b| b).await;
    harness
        .store
        .upsert(&completed("com.example.app"))
        .await
        .unwrap();
    harness.spawn_loop();

    harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap();
    wait_for_sessions(&harness.sim, 1).await;

    // An unrelated store write re-delivers the full snapshot with the
    // first record still awaiting; the in-flight guard must hold.
    harness
        .store
        .upsert(&completed("com.example.other"))
        .await
        .unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(harness.sim.live_sessions(), 1);
}

#[tokio::test]
async fn auto_driven_install_reaches_installed() {
    let mut harness = harness(BackendKind::Session, |b| b.auto_drive(true)).await;
    harness
        .store
        .upsert(&completed("com.example.app"))
        .await
        .unwrap();
    harness.spawn_loop();

    harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap();
    wait_for_status(&harness.store, "com.example.app", ArtifactStatus::Installed).await;

    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(record.backend, Some(BackendKind::Session));
    assert_eq!(record.install_progress, Some(100));
    assert!(record.session_id.is_some());
    assert!(record.installed_at.is_some());
    assert!(harness.sim.is_installed("com.example.app").await);
}

#[tokio::test]
async fn failing_install_reaches_failed_without_losing_session_fields() {
    let mut harness = harness(BackendKind::Session, |b| {
        b.auto_drive(true).failing_package("com.example.app")
    })
    .await;
    harness
        .store
        .upsert(&completed("com.example.app"))
        .await
        .unwrap();
    harness.spawn_loop();

    harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap();
    wait_for_status(&harness.store, "com.example.app", ArtifactStatus::Failed).await;

    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert!(record.session_id.is_some());
    assert_eq!(record.installed_at, None);
    assert!(!harness.sim.is_installed("com.example.app").await);
}

#[tokio::test]
async fn finished_session_from_debug_identity_updates_record() {
    let mut harness = harness(BackendKind::Session, |b| b).await;
    harness
        .store
        .upsert(&completed("com.example.app"))
        .await
        .unwrap();
    harness.spawn_loop();

    let session_id = harness
        .sim
        .open_session(SessionSpec::new("com.example.app", APP_DEBUG_PACKAGE, 7))
        .await
        .unwrap();
    harness.sim.announce_created(session_id);
    harness.sim.finish(session_id, true);

    wait_for_status(&harness.store, "com.example.app", ArtifactStatus::Installed).await;
    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(record.session_id, Some(session_id));
    assert!(record.installed_at.is_some());
}

#[tokio::test]
async fn foreign_session_leaves_store_untouched() {
    let mut harness = harness(BackendKind::Session, |b| b).await;
    harness
        .store
        .upsert(&completed("com.example.app"))
        .await
        .unwrap();
    harness.spawn_loop();

    harness
        .sim
        .inject_foreign_session(77, "com.example.storefront", "com.example.app");
    harness.sim.announce_created(77);
    harness.sim.finish(77, true);
    sleep(Duration::from_millis(150)).await;

    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(record.status, ArtifactStatus::Completed);
    assert_eq!(record.session_id, None);

    let ignored = harness
        .drain_install_events()
        .into_iter()
        .filter(|event| matches!(event, InstallEvent::SessionIgnored { .. }))
        .count();
    assert!(ignored >= 1);
}

#[tokio::test]
async fn reconcile_abandons_each_session_once() {
    let mut harness = harness(BackendKind::Session, |b| b).await;

    // Two records share session 5; a third holds session 9; a fourth
    // holds a session the platform no longer knows.
    for (package, session_id) in [
        ("com.example.one", Some(5)),
        ("com.example.two", Some(5)),
        ("com.example.three", Some(9)),
        ("com.example.four", Some(12)),
        ("com.example.five", None),
    ] {
        let mut record = completed(package);
        record.session_id = session_id;
        harness.store.upsert(&record).await.unwrap();
    }
    harness.sim.inject_foreign_session(5, APP_PACKAGE, "com.example.one");
    harness.sim.inject_foreign_session(9, APP_PACKAGE, "com.example.three");

    harness.orchestrator.reconcile().await.unwrap();
    assert_eq!(harness.sim.live_sessions(), 0);

    let events = harness.drain_install_events();
    let mut abandoned: Vec<i32> = events
        .iter()
        .filter_map(|event| match event {
            InstallEvent::SessionAbandoned { session_id } => Some(*session_id),
            _ => None,
        })
        .collect();
    abandoned.sort_unstable();
    assert_eq!(abandoned, vec![5, 9]);

    let failed: Vec<i32> = events
        .iter()
        .filter_map(|event| match event {
            InstallEvent::SessionAbandonFailed { session_id, .. } => Some(*session_id),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![12]);
}

#[tokio::test]
async fn shared_lib_session_updates_only_the_lib_entry() {
    let mut harness = harness(BackendKind::Session, |b| b).await;
    let record = completed("com.example.app")
        .with_shared_libs(vec![SharedLib::new("com.example.lib", 3)]);
    harness.store.upsert(&record).await.unwrap();
    harness.spawn_loop();

    harness
        .orchestrator
        .enqueue_install("com.example.app")
        .await
        .unwrap();
    // The lib session opens before the primary one.
    wait_for_sessions(&harness.sim, 2).await;
    let lib_session = 1;
    let primary_session = 2;

    harness.sim.announce_created(lib_session);
    harness.sim.drive_progress(lib_session, 0.5);
    sleep(Duration::from_millis(150)).await;

    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(record.status, ArtifactStatus::AwaitingInstall);
    assert_eq!(record.session_id, None);
    assert_eq!(record.shared_libs[0].package_id, "com.example.lib");
    assert_eq!(record.shared_libs[0].session_id, Some(lib_session));
    assert_eq!(record.shared_libs[0].install_progress, Some(50));

    harness.sim.finish(lib_session, true);
    harness.sim.announce_created(primary_session);
    wait_for_status(&harness.store, "com.example.app", ArtifactStatus::Installing).await;
    harness.sim.finish(primary_session, true);
    wait_for_status(&harness.store, "com.example.app", ArtifactStatus::Installed).await;

    let record = harness.store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(record.session_id, Some(primary_session));
    assert!(record.shared_libs[0].installed_at.is_some());
}

#[tokio::test]
async fn uninstall_hands_prompt_to_platform() {
    let mut harness = harness(BackendKind::Session, |b| {
        b.installed_package("com.example.app", 3)
    })
    .await;

    harness.orchestrator.uninstall("com.example.app").await.unwrap();
    assert!(!harness.sim.is_installed("com.example.app").await);

    let requested = harness
        .drain_install_events()
        .into_iter()
        .any(|event| matches!(event, InstallEvent::UninstallRequested { .. }));
    assert!(requested);
}
