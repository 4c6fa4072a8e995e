//! Backend resolution
//!
//! Resolution maps the stored preference plus a probe snapshot to the
//! backend that will actually perform a dispatch. The rule is uniform:
//! a preferred backend whose mechanism is unavailable falls back to the
//! default session backend, never to a third choice.

use std::sync::Arc;

use stagehand_config::PreferenceStore;
use stagehand_platform::Platform;
use stagehand_types::{
    silent_update_target_sdk, BackendDescriptor, BackendKind, SDK_BROKER_MIN,
    SDK_OWNERLESS_SILENT_MIN,
};

use crate::identity::APP_PACKAGE;
use crate::probe::{CapabilityProber, ProbeState};

/// Pure resolution over an explicit probe snapshot.
#[must_use]
pub fn resolve(preference: BackendKind, probes: &ProbeState) -> BackendKind {
    match preference {
        BackendKind::Session => BackendKind::Session,
        BackendKind::Native => BackendKind::Native,
        BackendKind::Root if probes.elevated_shell => BackendKind::Root,
        BackendKind::Service if probes.companion_service => BackendKind::Service,
        BackendKind::Helper if probes.helper_app => BackendKind::Helper,
        BackendKind::Broker
            if probes.sdk_version >= SDK_BROKER_MIN
                && probes.broker_present
                && probes.broker_permission =>
        {
            BackendKind::Broker
        }
        _ => BackendKind::Session,
    }
}

/// Resolves dispatches against live preference and probe state.
#[derive(Clone)]
pub struct Selector {
    platform: Arc<Platform>,
    prober: CapabilityProber,
    preferences: PreferenceStore,
}

impl Selector {
    #[must_use]
    pub fn new(platform: Arc<Platform>, preferences: PreferenceStore) -> Self {
        let prober = CapabilityProber::new(platform.clone());
        Self {
            platform,
            prober,
            preferences,
        }
    }

    /// Resolve the backend for the next dispatch. The preference is
    /// re-read and every mechanism re-probed on each call; a preference
    /// change between two dispatches takes effect on the second.
    pub async fn resolve(&self) -> BackendKind {
        let preference = self.preferences.preferred_backend().await.kind();
        let probes = self.prober.state().await;
        resolve(preference, &probes)
    }

    /// Descriptors for every backend whose prerequisites are present.
    ///
    /// The broker is listed whenever its endpoint exists on a supporting
    /// platform; the missing permission only blocks resolution, since
    /// the user can still grant it.
    pub async fn available_backends(&self) -> Vec<BackendDescriptor> {
        let probes = self.prober.state().await;
        let mut backends = vec![
            BackendDescriptor::new(BackendKind::Session),
            BackendDescriptor::new(BackendKind::Native),
        ];
        if probes.elevated_shell {
            backends.push(BackendDescriptor::new(BackendKind::Root));
        }
        if probes.companion_service {
            backends.push(BackendDescriptor::new(BackendKind::Service));
        }
        if probes.helper_app {
            backends.push(BackendDescriptor::new(BackendKind::Helper));
        }
        if probes.sdk_version >= SDK_BROKER_MIN && probes.broker_present {
            backends.push(BackendDescriptor::new(BackendKind::Broker));
        }
        backends
    }

    /// Whether the currently resolved backend would update the given
    /// package without user interaction.
    pub async fn can_install_silently(&self, package_id: &str, target_sdk: i32) -> bool {
        let probes = self.prober.state().await;
        let preference = self.preferences.preferred_backend().await.kind();
        match resolve(preference, &probes) {
            BackendKind::Session => {
                self.session_updates_silently(package_id, target_sdk, &probes)
                    .await
            }
            BackendKind::Root => probes.elevated_shell,
            BackendKind::Broker => {
                probes.sdk_version >= SDK_BROKER_MIN
                    && probes.broker_present
                    && probes.broker_permission
            }
            // Native never installs silently; the service and helper
            // mechanisms give no usable signal either way.
            BackendKind::Native | BackendKind::Service | BackendKind::Helper => false,
        }
    }

    /// The session backend updates silently only for a package we
    /// already own, on a platform that permits ownerless updates, and
    /// only when the artifact targets the exact SDK the platform
    /// mandates.
    async fn session_updates_silently(
        &self,
        package_id: &str,
        target_sdk: i32,
        probes: &ProbeState,
    ) -> bool {
        if probes.sdk_version < SDK_OWNERLESS_SILENT_MIN {
            return false;
        }
        if !self.platform.packages().is_installed(package_id).await {
            return false;
        }
        let owned = self
            .platform
            .packages()
            .update_owner(package_id)
            .await
            .is_some_and(|owner| owner == APP_PACKAGE);
        owned && silent_update_target_sdk(probes.sdk_version) == Some(target_sdk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probes() -> ProbeState {
        ProbeState {
            sdk_version: 34,
            elevated_shell: false,
            companion_service: false,
            helper_app: false,
            broker_present: false,
            broker_permission: false,
        }
    }

    #[test]
    fn session_and_native_resolve_unconditionally() {
        assert_eq!(
            resolve(BackendKind::Session, &probes()),
            BackendKind::Session
        );
        assert_eq!(resolve(BackendKind::Native, &probes()), BackendKind::Native);
    }

    #[test]
    fn root_requires_elevated_shell() {
        assert_eq!(resolve(BackendKind::Root, &probes()), BackendKind::Session);
        let granted = ProbeState {
            elevated_shell: true,
            ..probes()
        };
        assert_eq!(resolve(BackendKind::Root, &granted), BackendKind::Root);
    }

    #[test]
    fn service_requires_companion() {
        assert_eq!(
            resolve(BackendKind::Service, &probes()),
            BackendKind::Session
        );
        let present = ProbeState {
            companion_service: true,
            ..probes()
        };
        assert_eq!(
            resolve(BackendKind::Service, &present),
            BackendKind::Service
        );
    }

    #[test]
    fn helper_requires_helper_app() {
        assert_eq!(
            resolve(BackendKind::Helper, &probes()),
            BackendKind::Session
        );
        let present = ProbeState {
            helper_app: true,
            ..probes()
        };
        assert_eq!(resolve(BackendKind::Helper, &present), BackendKind::Helper);
    }

    #[test]
    fn broker_requires_sdk_endpoint_and_permission() {
        let mut state = ProbeState {
            broker_present: true,
            broker_permission: true,
            ..probes()
        };
        assert_eq!(resolve(BackendKind::Broker, &state), BackendKind::Broker);

        state.sdk_version = SDK_BROKER_MIN - 1;
        assert_eq!(resolve(BackendKind::Broker, &state), BackendKind::Session);

        state.sdk_version = 34;
        state.broker_permission = false;
        assert_eq!(resolve(BackendKind::Broker, &state), BackendKind::Session);

        state.broker_permission = true;
        state.broker_present = false;
        assert_eq!(resolve(BackendKind::Broker, &state), BackendKind::Session);
    }
}
