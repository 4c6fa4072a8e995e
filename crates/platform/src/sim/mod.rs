//! In-process simulated platform
//!
//! Stands in for a real device binding: sessions live in a shared table,
//! lifecycle notifications are emitted onto the session channel, and
//! package state mutates when a session finishes successfully. The CLI's
//! `run` command drives installs end-to-end against this implementation,
//! and integration tests use it in manual mode to control event ordering
//! precisely.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use stagehand_errors::{Error, PlatformError};
use stagehand_events::{SessionEvent, SessionEventSender};
use tracing::debug;

use crate::packages::PackageQueries;
use crate::sessions::{BrokerAccess, SessionBroker, ShellAccess};
use crate::types::{PackageInfo, SessionInfo, SessionSpec};
use crate::Platform;

struct SimInner {
    sdk_version: i32,
    elevated_shell: bool,
    broker_reachable: bool,
    broker_permission: bool,
    auto_drive: bool,
    /// Targets whose sessions finish unsuccessfully.
    failing: HashSet<String>,
    installed: DashMap<String, PackageInfo>,
    update_owners: DashMap<String, String>,
    sessions: DashMap<i32, SessionInfo>,
    next_session: AtomicI32,
    events: SessionEventSender,
}

/// Simulated platform handle. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct SimPlatform {
    inner: Arc<SimInner>,
}

impl SimPlatform {
    #[must_use]
    pub fn builder(events: SessionEventSender) -> SimPlatformBuilder {
        SimPlatformBuilder {
            sdk_version: 34,
            elevated_shell: false,
            broker_reachable: false,
            broker_permission: false,
            auto_drive: false,
            failing: HashSet::new(),
            installed: Vec::new(),
            update_owners: Vec::new(),
            events,
        }
    }

    /// Package the handle into the aggregate `Platform` seam.
    #[must_use]
    pub fn into_platform(self) -> Platform {
        Platform::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self),
        )
    }

    /// Register a session owned by an arbitrary installer, bypassing
    /// `open_session`. Used to model unrelated installer activity.
    pub fn inject_foreign_session(
        &self,
        session_id: i32,
        owner_package: &str,
        target_package: &str,
    ) {
        self.inner.sessions.insert(
            session_id,
            SessionInfo {
                session_id,
                owner_package: owner_package.to_string(),
                target_package: target_package.to_string(),
                version_code: 0,
                progress: 0.0,
            },
        );
    }

    /// Advance a session's progress and emit the matching event.
    pub fn drive_progress(&self, session_id: i32, fraction: f32) {
        if let Some(mut info) = self.inner.sessions.get_mut(&session_id) {
            info.progress = fraction;
        }
        let _ = self
            .inner
            .events
            .send(SessionEvent::Progress {
                session_id,
                fraction,
            });
    }

    /// Finish a session, mutating package state on success.
    pub fn finish(&self, session_id: i32, success: bool) {
        if let Some(mut info) = self.inner.sessions.get_mut(&session_id) {
            if success {
                info.progress = 1.0;
            }
            let target = info.target_package.clone();
            let owner = info.owner_package.clone();
            let version_code = info.version_code;
            drop(info);
            if success {
                self.inner.installed.insert(
                    target.clone(),
                    PackageInfo {
                        package_id: target.clone(),
                        version_code,
                        enabled: true,
                    },
                );
                self.inner.update_owners.insert(target, owner);
            }
        }
        let _ = self
            .inner
            .events
            .send(SessionEvent::Finished {
                session_id,
                success,
            });
    }

    /// Emit the created notification for a session.
    pub fn announce_created(&self, session_id: i32) {
        let _ = self.inner.events.send(SessionEvent::Created { session_id });
    }

    /// Number of live (not abandoned) sessions.
    #[must_use]
    pub fn live_sessions(&self) -> usize {
        self.inner.sessions.len()
    }

    fn spawn_auto_drive(&self, session_id: i32, target: String) {
        let sim = self.clone();
        let success = !sim.inner.failing.contains(&target);
        tokio::spawn(async move {
            sim.announce_created(session_id);
            for fraction in [0.25, 0.5, 0.75] {
                tokio::time::sleep(Duration::from_millis(30)).await;
                sim.drive_progress(session_id, fraction);
            }
            tokio::time::sleep(Duration::from_millis(30)).await;
            sim.finish(session_id, success);
        });
    }
}

/// Builder for the simulated platform profile.
pub struct SimPlatformBuilder {
    sdk_version: i32,
    elevated_shell: bool,
    broker_reachable: bool,
    broker_permission: bool,
    auto_drive: bool,
    failing: HashSet<String>,
    installed: Vec<PackageInfo>,
    update_owners: Vec<(String, String)>,
    events: SessionEventSender,
}

impl SimPlatformBuilder {
    #[must_use]
    pub fn sdk_version(mut self, sdk_version: i32) -> Self {
        self.sdk_version = sdk_version;
        self
    }

    #[must_use]
    pub fn elevated_shell(mut self, granted: bool) -> Self {
        self.elevated_shell = granted;
        self
    }

    #[must_use]
    pub fn broker(mut self, reachable: bool, permission_granted: bool) -> Self {
        self.broker_reachable = reachable;
        self.broker_permission = permission_granted;
        self
    }

    /// Drive opened sessions to completion automatically.
    #[must_use]
    pub fn auto_drive(mut self, enabled: bool) -> Self {
        self.auto_drive = enabled;
        self
    }

    /// Make sessions targeting this package finish unsuccessfully.
    #[must_use]
    pub fn failing_package(mut self, package_id: impl Into<String>) -> Self {
        self.failing.insert(package_id.into());
        self
    }

    #[must_use]
    pub fn installed_package(mut self, package_id: impl Into<String>, version_code: i64) -> Self {
        let package_id = package_id.into();
        self.installed.push(PackageInfo {
            package_id,
            version_code,
            enabled: true,
        });
        self
    }

    /// Install a package in disabled state (a disabled companion
    /// service must probe as unavailable).
    #[must_use]
    pub fn disabled_package(mut self, package_id: impl Into<String>, version_code: i64) -> Self {
        let package_id = package_id.into();
        self.installed.push(PackageInfo {
            package_id,
            version_code,
            enabled: false,
        });
        self
    }

    #[must_use]
    pub fn update_owner(
        mut self,
        package_id: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        self.update_owners.push((package_id.into(), owner.into()));
        self
    }

    #[must_use]
    pub fn build(self) -> SimPlatform {
        let installed = DashMap::new();
        for info in self.installed {
            installed.insert(info.package_id.clone(), info);
        }
        let update_owners = DashMap::new();
        for (package, owner) in self.update_owners {
            update_owners.insert(package, owner);
        }

        SimPlatform {
            inner: Arc::new(SimInner {
                sdk_version: self.sdk_version,
                elevated_shell: self.elevated_shell,
                broker_reachable: self.broker_reachable,
                broker_permission: self.broker_permission,
                auto_drive: self.auto_drive,
                failing: self.failing,
                installed,
                update_owners,
                sessions: DashMap::new(),
                next_session: AtomicI32::new(1),
                events: self.events,
            }),
        }
    }
}

#[async_trait]
impl PackageQueries for SimPlatform {
    async fn is_installed(&self, package_id: &str) -> bool {
        self.inner.installed.contains_key(package_id)
    }

    async fn package_info(&self, package_id: &str) -> Result<Option<PackageInfo>, Error> {
        Ok(self.inner.installed.get(package_id).map(|info| info.clone()))
    }

    async fn update_owner(&self, package_id: &str) -> Option<String> {
        self.inner
            .update_owners
            .get(package_id)
            .map(|owner| owner.clone())
    }

    fn sdk_version(&self) -> i32 {
        self.inner.sdk_version
    }
}

#[async_trait]
impl SessionBroker for SimPlatform {
    async fn open_session(&self, spec: SessionSpec) -> Result<i32, Error> {
        let session_id = self.inner.next_session.fetch_add(1, Ordering::SeqCst);
        self.inner.sessions.insert(
            session_id,
            SessionInfo {
                session_id,
                owner_package: spec.owner_package,
                target_package: spec.target_package.clone(),
                version_code: spec.version_code,
                progress: 0.0,
            },
        );
        debug!(session_id, target = %spec.target_package, "opened install session");

        if self.inner.auto_drive {
            self.spawn_auto_drive(session_id, spec.target_package);
        }
        Ok(session_id)
    }

    async fn session_info(&self, session_id: i32) -> Option<SessionInfo> {
        self.inner.sessions.get(&session_id).map(|info| info.clone())
    }

    async fn abandon(&self, session_id: i32) -> Result<(), Error> {
        match self.inner.sessions.remove(&session_id) {
            Some(_) => Ok(()),
            None => Err(PlatformError::SessionNotFound { session_id }.into()),
        }
    }

    async fn request_uninstall(&self, package_id: &str) -> Result<(), Error> {
        // Models the user accepting the confirmation prompt.
        debug!(package = package_id, "uninstall prompt presented");
        self.inner.installed.remove(package_id);
        self.inner.update_owners.remove(package_id);
        Ok(())
    }
}

impl ShellAccess for SimPlatform {
    fn has_elevated_shell(&self) -> bool {
        self.inner.elevated_shell
    }
}

impl BrokerAccess for SimPlatform {
    fn is_reachable(&self) -> bool {
        self.inner.broker_reachable
    }

    fn permission_granted(&self) -> bool {
        self.inner.broker_permission
    }
}
