//! Runtime SQL queries for the pending-operation queue

use sqlx::sqlite::SqliteRow;
use sqlx::{query, Pool, Row, Sqlite};
use stagehand_errors::{Error, StoreError};
use stagehand_types::{ArtifactRecord, ArtifactStatus, BackendKind, SharedLib};

fn record_from_row(row: &SqliteRow) -> Result<ArtifactRecord, Error> {
    let package_id: String = row.get("package_id");

    let status_str: String = row.get("status");
    let status = ArtifactStatus::parse(&status_str).ok_or_else(|| StoreError::CorruptRecord {
        package: package_id.clone(),
        message: format!("unknown status {status_str:?}"),
    })?;

    let libs_json: String = row.get("shared_libs");
    let shared_libs: Vec<SharedLib> =
        serde_json::from_str(&libs_json).map_err(|e| StoreError::CorruptRecord {
            package: package_id.clone(),
            message: format!("shared_libs: {e}"),
        })?;

    let backend: Option<String> = row.get("backend");
    let backend = match backend {
        Some(value) => Some(BackendKind::parse(&value).ok_or_else(|| {
            StoreError::CorruptRecord {
                package: package_id.clone(),
                message: format!("unknown backend {value:?}"),
            }
        })?),
        None => None,
    };

    let size: i64 = row.get("size");

    Ok(ArtifactRecord {
        package_id,
        version_code: row.get("version_code"),
        display_name: row.get("display_name"),
        size: size.unsigned_abs(),
        target_sdk: row.get("target_sdk"),
        status,
        shared_libs,
        backend,
        session_id: row.get("session_id"),
        install_progress: row.get("install_progress"),
        installed_at: row.get("installed_at"),
    })
}

pub async fn all_records(pool: &Pool<Sqlite>) -> Result<Vec<ArtifactRecord>, Error> {
    let rows = query("SELECT * FROM artifacts ORDER BY package_id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(record_from_row).collect()
}

pub async fn get_record(
    pool: &Pool<Sqlite>,
    package_id: &str,
) -> Result<Option<ArtifactRecord>, Error> {
    let row = query("SELECT * FROM artifacts WHERE package_id = ?1")
        .bind(package_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(record_from_row).transpose()
}

pub async fn upsert_record(pool: &Pool<Sqlite>, record: &ArtifactRecord) -> Result<(), Error> {
    let libs_json = serde_json::to_string(&record.shared_libs)?;
    let size: i64 = i64::try_from(record.size).unwrap_or(i64::MAX);

    query(
        "INSERT OR REPLACE INTO artifacts
         (package_id, version_code, display_name, size, target_sdk, status,
          shared_libs, backend, session_id, install_progress, installed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&record.package_id)
    .bind(record.version_code)
    .bind(&record.display_name)
    .bind(size)
    .bind(record.target_sdk)
    .bind(record.status.as_str())
    .bind(libs_json)
    .bind(record.backend.map(BackendKind::as_str))
    .bind(record.session_id)
    .bind(record.install_progress)
    .bind(record.installed_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_status(
    pool: &Pool<Sqlite>,
    package_id: &str,
    status: ArtifactStatus,
) -> Result<(), Error> {
    query("UPDATE artifacts SET status = ?2 WHERE package_id = ?1")
        .bind(package_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_shared_libs(
    pool: &Pool<Sqlite>,
    package_id: &str,
    shared_libs: &[SharedLib],
) -> Result<(), Error> {
    let libs_json = serde_json::to_string(shared_libs)?;
    query("UPDATE artifacts SET shared_libs = ?2 WHERE package_id = ?1")
        .bind(package_id)
        .bind(libs_json)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_install_details(
    pool: &Pool<Sqlite>,
    package_id: &str,
    backend: Option<BackendKind>,
    session_id: Option<i32>,
    install_progress: Option<i32>,
    installed_at: Option<i64>,
) -> Result<(), Error> {
    query(
        "UPDATE artifacts
         SET backend = ?2, session_id = ?3, install_progress = ?4, installed_at = ?5
         WHERE package_id = ?1",
    )
    .bind(package_id)
    .bind(backend.map(BackendKind::as_str))
    .bind(session_id)
    .bind(install_progress)
    .bind(installed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_record(pool: &Pool<Sqlite>, package_id: &str) -> Result<(), Error> {
    query("DELETE FROM artifacts WHERE package_id = ?1")
        .bind(package_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_all(pool: &Pool<Sqlite>) -> Result<(), Error> {
    query("DELETE FROM artifacts").execute(pool).await?;
    Ok(())
}
