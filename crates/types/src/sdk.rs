//! Platform SDK-level policy tables
//!
//! Silent (no-confirmation) updates through the default session backend
//! are only permitted when the artifact's declared target SDK matches the
//! exact value the running platform mandates. The mapping is a fixed
//! one-version-back table, not a range; platform versions without an
//! entry never install silently.

/// Minimum SDK level at which the privilege broker mechanism exists.
pub const SDK_BROKER_MIN: i32 = 26;

/// Minimum SDK level supporting ownerless silent updates through the
/// default session backend.
pub const SDK_OWNERLESS_SILENT_MIN: i32 = 31;

/// Target SDK the platform requires of a package for a silent update,
/// keyed by the running platform's SDK level.
#[must_use]
pub fn silent_update_target_sdk(platform_sdk: i32) -> Option<i32> {
    match platform_sdk {
        35 => Some(33),
        34 => Some(31),
        33 => Some(30),
        31 => Some(29),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_exact_not_a_range() {
        assert_eq!(silent_update_target_sdk(35), Some(33));
        assert_eq!(silent_update_target_sdk(34), Some(31));
        assert_eq!(silent_update_target_sdk(33), Some(30));
        assert_eq!(silent_update_target_sdk(31), Some(29));
        // SDK 32 has no defined entry even though it sits inside the range.
        assert_eq!(silent_update_target_sdk(32), None);
        assert_eq!(silent_update_target_sdk(30), None);
        assert_eq!(silent_update_target_sdk(36), None);
    }
}
