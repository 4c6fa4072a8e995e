//! Capability probes
//!
//! Each probe is a point-in-time check against the platform. A probe
//! that fails (package missing, query error) answers `false`; probe
//! failures are never surfaced as errors. Nothing is cached here; the
//! only caching allowed is inside mechanisms that are process-global by
//! nature (the elevated-shell grant is cached by its own subsystem).

use std::sync::Arc;

use stagehand_platform::Platform;
use stagehand_types::SDK_BROKER_MIN;

use crate::identity::{
    COMPANION_SERVICE_MIN_VERSION, COMPANION_SERVICE_PACKAGE, HELPER_DEBUG_PACKAGE, HELPER_PACKAGE,
};

/// Snapshot of every probe at one point in time.
///
/// Selection logic is a pure function of this struct, so tests can
/// construct arbitrary capability states without a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeState {
    pub sdk_version: i32,
    pub elevated_shell: bool,
    pub companion_service: bool,
    pub helper_app: bool,
    pub broker_present: bool,
    pub broker_permission: bool,
}

/// Availability/version queries for each privilege mechanism.
#[derive(Clone)]
pub struct CapabilityProber {
    platform: Arc<Platform>,
}

impl CapabilityProber {
    #[must_use]
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }

    /// Whether the elevated shell grant is currently held.
    #[must_use]
    pub fn has_elevated_shell(&self) -> bool {
        self.platform.shell().has_elevated_shell()
    }

    /// Whether the companion privileged service is installed, enabled,
    /// and new enough to talk to.
    pub async fn has_companion_service(&self) -> bool {
        match self
            .platform
            .packages()
            .package_info(COMPANION_SERVICE_PACKAGE)
            .await
        {
            Ok(Some(info)) => info.enabled && info.version_code >= COMPANION_SERVICE_MIN_VERSION,
            // Absent or query failure both mean unavailable.
            Ok(None) | Err(_) => false,
        }
    }

    /// Whether the helper app is present under any of its identities.
    pub async fn has_helper_app(&self) -> bool {
        self.platform.packages().is_installed(HELPER_PACKAGE).await
            || self
                .platform
                .packages()
                .is_installed(HELPER_DEBUG_PACKAGE)
                .await
    }

    /// Whether a privilege broker endpoint is reachable.
    #[must_use]
    pub fn has_privilege_broker(&self) -> bool {
        self.platform.broker().is_reachable()
    }

    /// Whether this process holds the broker permission.
    #[must_use]
    pub fn broker_permission_granted(&self) -> bool {
        self.platform.broker().permission_granted()
    }

    /// SDK level of the running platform.
    #[must_use]
    pub fn sdk_version(&self) -> i32 {
        self.platform.packages().sdk_version()
    }

    /// Whether the platform version predates the broker mechanism.
    #[must_use]
    pub fn broker_supported(&self) -> bool {
        self.sdk_version() >= SDK_BROKER_MIN
    }

    /// Gather every probe into one state snapshot.
    pub async fn state(&self) -> ProbeState {
        ProbeState {
            sdk_version: self.sdk_version(),
            elevated_shell: self.has_elevated_shell(),
            companion_service: self.has_companion_service().await,
            helper_app: self.has_helper_app().await,
            broker_present: self.has_privilege_broker(),
            broker_permission: self.broker_permission_granted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_platform::SimPlatform;

    fn platform(sim: &SimPlatform) -> Arc<Platform> {
        Arc::new(sim.clone().into_platform())
    }

    #[tokio::test]
    async fn companion_service_requires_enabled_and_min_version() {
        let (tx, _rx) = stagehand_events::session_channel();
        let sim = SimPlatform::builder(tx.clone())
            .installed_package(COMPANION_SERVICE_PACKAGE, COMPANION_SERVICE_MIN_VERSION)
            .build();
        let prober = CapabilityProber::new(platform(&sim));
        assert!(prober.has_companion_service().await);

        let old = SimPlatform::builder(tx.clone())
            .installed_package(COMPANION_SERVICE_PACKAGE, COMPANION_SERVICE_MIN_VERSION - 1)
            .build();
        let prober = CapabilityProber::new(platform(&old));
        assert!(!prober.has_companion_service().await);

        let disabled = SimPlatform::builder(tx)
            .disabled_package(COMPANION_SERVICE_PACKAGE, COMPANION_SERVICE_MIN_VERSION)
            .build();
        let prober = CapabilityProber::new(platform(&disabled));
        assert!(!prober.has_companion_service().await);
    }

    #[tokio::test]
    async fn helper_app_matches_either_identity() {
        let (tx, _rx) = stagehand_events::session_channel();
        let sim = SimPlatform::builder(tx.clone())
            .installed_package(HELPER_DEBUG_PACKAGE, 1)
            .build();
        let prober = CapabilityProber::new(platform(&sim));
        assert!(prober.has_helper_app().await);

        let none = SimPlatform::builder(tx).build();
        let prober = CapabilityProber::new(platform(&none));
        assert!(!prober.has_helper_app().await);
    }

    #[tokio::test]
    async fn absent_mechanisms_probe_false_not_error() {
        let (tx, _rx) = stagehand_events::session_channel();
        let sim = SimPlatform::builder(tx).build();
        let prober = CapabilityProber::new(platform(&sim));

        let state = prober.state().await;
        assert!(!state.elevated_shell);
        assert!(!state.companion_service);
        assert!(!state.helper_app);
        assert!(!state.broker_present);
        assert!(!state.broker_permission);
    }
}
