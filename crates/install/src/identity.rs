//! Known installer identities
//!
//! Session callbacks are hard-filtered to sessions owned by one of
//! these identities; anything else belongs to an unrelated installer
//! and must never mutate the store.

/// Our release build identity; also the identity checked against the
/// platform's recorded update owner for silent updates.
pub const APP_PACKAGE: &str = "dev.stagehand.client";
pub const APP_DEBUG_PACKAGE: &str = "dev.stagehand.client.debug";
pub const APP_NIGHTLY_PACKAGE: &str = "dev.stagehand.client.nightly";

/// Companion privileged service.
pub const COMPANION_SERVICE_PACKAGE: &str = "dev.stagehand.companion";

/// Minimum companion service version the service backend can talk to.
pub const COMPANION_SERVICE_MIN_VERSION: i64 = 9;

/// Third-party privileged helper app, under both of its known identities.
pub const HELPER_PACKAGE: &str = "io.mdroid.manager";
pub const HELPER_DEBUG_PACKAGE: &str = "io.mdroid.manager.debug";

/// Privilege broker endpoint package.
pub const BROKER_PACKAGE: &str = "moe.kanhu.broker";

/// Every identity whose sessions this process reacts to.
pub const KNOWN_INSTALLER_IDENTITIES: [&str; 6] = [
    APP_PACKAGE,
    APP_DEBUG_PACKAGE,
    APP_NIGHTLY_PACKAGE,
    COMPANION_SERVICE_PACKAGE,
    HELPER_PACKAGE,
    HELPER_DEBUG_PACKAGE,
];

/// Whether a session owner is one of our known identities.
#[must_use]
pub fn is_known_installer(owner: &str) -> bool {
    KNOWN_INSTALLER_IDENTITIES.contains(&owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_owners_are_rejected() {
        assert!(is_known_installer(APP_PACKAGE));
        assert!(is_known_installer(HELPER_DEBUG_PACKAGE));
        assert!(!is_known_installer("com.example.storefront"));
        assert!(!is_known_installer(""));
    }
}
