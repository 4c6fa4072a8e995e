//! Session-to-record resolution and merge rules
//!
//! A platform session event carries only a session id; these helpers
//! map it back to a stored record and compute the field updates. Merge
//! semantics are preserve-once-set: a backend or session id already on
//! the record wins over the one arriving with the event, so a late or
//! replayed callback can never clobber what an earlier one wrote.

use chrono::Utc;
use stagehand_types::{ArtifactRecord, BackendKind, SharedLib};

/// Resolved install-detail fields ready to be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InstallDetails {
    pub backend: Option<BackendKind>,
    pub session_id: Option<i32>,
    pub install_progress: Option<i32>,
    pub installed_at: Option<i64>,
}

/// Find the record a session's target package belongs to. An exact
/// primary-package match wins; otherwise the first record carrying the
/// package as a shared lib.
pub(crate) fn resolve_record<'a>(
    records: &'a [ArtifactRecord],
    target_package: &str,
) -> Option<&'a ArtifactRecord> {
    records
        .iter()
        .find(|record| record.package_id == target_package)
        .or_else(|| {
            records
                .iter()
                .find(|record| record.covers_package(target_package))
        })
}

/// Convert the platform's progress fraction to the stored 0-100 scale.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn progress_percent(fraction: f32) -> i32 {
    (fraction * 100.0) as i32
}

/// Merge incoming session details into a record's existing fields.
/// `installed_at` is stamped exactly once, when progress first reaches
/// 100 on a record that has no completion time yet.
pub(crate) fn merge_install_details(
    record: &ArtifactRecord,
    backend: BackendKind,
    session_id: i32,
    progress: i32,
) -> InstallDetails {
    InstallDetails {
        backend: Some(record.backend.unwrap_or(backend)),
        session_id: Some(record.session_id.unwrap_or(session_id)),
        install_progress: Some(progress),
        installed_at: record
            .installed_at
            .or_else(|| (progress >= 100).then(|| Utc::now().timestamp_millis())),
    }
}

/// Rebuild a record's shared-lib list with one lib's session details
/// updated. The updated lib moves to the front; any duplicate entries
/// for the same package collapse into it.
pub(crate) fn merge_shared_lib(
    record: &ArtifactRecord,
    lib_package: &str,
    backend: BackendKind,
    session_id: i32,
    progress: i32,
) -> Vec<SharedLib> {
    let existing = record
        .shared_libs
        .iter()
        .find(|lib| lib.package_id == lib_package);
    let version_code = existing.map_or(0, |lib| lib.version_code);

    let mut updated = existing
        .cloned()
        .unwrap_or_else(|| SharedLib::new(lib_package, version_code));
    updated.backend = Some(updated.backend.unwrap_or(backend));
    updated.session_id = Some(updated.session_id.unwrap_or(session_id));
    updated.install_progress = Some(progress);
    updated.installed_at = updated
        .installed_at
        .or_else(|| (progress >= 100).then(|| Utc::now().timestamp_millis()));

    let mut libs = vec![updated];
    for lib in &record.shared_libs {
        if libs.iter().all(|seen| seen.package_id != lib.package_id) {
            libs.push(lib.clone());
        }
    }
    libs
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_types::ArtifactStatus;

    fn record_with_lib() -> ArtifactRecord {
        ArtifactRecord::new_queued("com.example.app", 10, "Example", 2048, 31)
            .with_shared_libs(vec![SharedLib::new("com.example.lib", 3)])
    }

    #[test]
    fn primary_match_beats_lib_match() {
        // One record carries "com.example.app" as a lib, another as its
        // primary package; resolution must pick the primary.
        let lib_carrier = ArtifactRecord::new_queued("com.example.host", 1, "Host", 512, 31)
            .with_shared_libs(vec![SharedLib::new("com.example.app", 2)]);
        let records = vec![lib_carrier, record_with_lib()];

        let found = resolve_record(&records, "com.example.app").unwrap();
        assert_eq!(found.package_id, "com.example.app");
    }

    #[test]
    fn lib_match_resolves_when_no_primary_exists() {
        let records = vec![record_with_lib()];
        let found = resolve_record(&records, "com.example.lib").unwrap();
        assert_eq!(found.package_id, "com.example.app");
        assert!(resolve_record(&records, "com.example.other").is_none());
    }

    #[test]
    fn merge_preserves_existing_backend_and_session() {
        let mut record = record_with_lib();
        record.backend = Some(BackendKind::Root);
        record.session_id = Some(41);

        let details = merge_install_details(&record, BackendKind::Session, 99, 50);
        assert_eq!(details.backend, Some(BackendKind::Root));
        assert_eq!(details.session_id, Some(41));
        assert_eq!(details.install_progress, Some(50));
        assert_eq!(details.installed_at, None);
    }

    #[test]
    fn merge_adopts_incoming_when_fields_are_unset() {
        let record = record_with_lib();
        let details = merge_install_details(&record, BackendKind::Broker, 7, 100);
        assert_eq!(details.backend, Some(BackendKind::Broker));
        assert_eq!(details.session_id, Some(7));
        assert!(details.installed_at.is_some());
    }

    #[test]
    fn installed_at_is_stamped_once() {
        let mut record = record_with_lib();
        record.installed_at = Some(1_700_000_000_000);
        let details = merge_install_details(&record, BackendKind::Session, 7, 100);
        assert_eq!(details.installed_at, Some(1_700_000_000_000));
    }

    #[test]
    fn shared_lib_update_moves_to_front_and_dedups() {
        let mut record = record_with_lib();
        record.shared_libs.push(SharedLib::new("com.example.extra", 1));
        record
            .shared_libs
            .push(SharedLib::new("com.example.lib", 3));

        let libs = merge_shared_lib(&record, "com.example.lib", BackendKind::Session, 12, 75);
        assert_eq!(libs.len(), 2);
        assert_eq!(libs[0].package_id, "com.example.lib");
        assert_eq!(libs[0].session_id, Some(12));
        assert_eq!(libs[0].install_progress, Some(75));
        assert_eq!(libs[1].package_id, "com.example.extra");
    }

    #[test]
    fn progress_fraction_scales_to_percent() {
        assert_eq!(progress_percent(0.0), 0);
        assert_eq!(progress_percent(0.25), 25);
        assert_eq!(progress_percent(1.0), 100);
    }

    #[test]
    fn parent_status_is_not_part_of_lib_merge() {
        let record = record_with_lib();
        let _libs = merge_shared_lib(&record, "com.example.lib", BackendKind::Session, 12, 100);
        // The merge only produces a lib list; the record's own status
        // field stays whatever it was.
        assert_eq!(record.status, ArtifactStatus::Queued);
    }
}
