// crates/govgate-store/src/backup.rs
// ============================================================================
// Module: Event Log Backup Manifest
// Description: Produces and verifies the fixed backup manifest shape from
//              spec §6; the archiving transport itself is out of scope.
// Purpose: Let an external caller snapshot a tenant's event log directory and
//          later verify a restored copy matches, byte for byte, entry by
//          entry.
// Dependencies: govgate_core::{entities::{event_log, identifiers, time},
//                hashing, interfaces}, crate::event_log
// ============================================================================

//! ## Overview
//! A backup is, per spec §6, "a tar-gzip containing all segment files and
//! the snapshot, paired with a JSON manifest". This module only produces and
//! verifies the manifest: which files belong to the backup, their size and
//! sha256, a summary of the event log's extent, and whether the chain was
//! valid at backup time. Building the tar.gz and deciding where it lands is
//! an external archiving concern (spec §1 Out of scope).

use std::fs;
use std::path::Path;

use govgate_core::StoreError;
use govgate_core::entities::identifiers::EventId;
use govgate_core::entities::time::Timestamp;
use govgate_core::hashing::DEFAULT_HASH_ALGORITHM;
use govgate_core::hashing::hash_bytes;
use govgate_core::interfaces::EventLogSink;
use govgate_core::interfaces::ExportRangeQuery;
use serde::Deserialize;
use serde::Serialize;

use crate::event_log::SNAPSHOT_FILE_NAME;

/// One file captured in a backup, with its size and content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupFileEntry {
    /// Filename relative to the event log directory.
    pub path: String,
    /// File size in bytes at backup time.
    pub size_bytes: u64,
    /// Lowercase hex-encoded SHA-256 digest of the file's bytes.
    pub sha256: String,
}

/// Summary of the event log's extent captured alongside a backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogSummary {
    /// Total number of entries in the log at backup time.
    pub total_events: u64,
    /// Number of segment files captured.
    pub total_segments: u32,
    /// Id of the first entry, if any exist.
    pub first_event_id: Option<EventId>,
    /// Id of the last entry, if any exist.
    pub last_event_id: Option<EventId>,
    /// `current_hash` of the last entry (genesis if the log is empty).
    pub last_current_hash: String,
    /// Whether a snapshot file was present at backup time.
    pub snapshot_exists: bool,
}

/// The fixed backup manifest shape from spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Manifest schema version.
    pub version: u32,
    /// When the backup was taken.
    pub created_at: Timestamp,
    /// The directory the backup was taken from, as supplied by the caller.
    pub source_dir: String,
    /// Every file captured in the backup.
    pub files: Vec<BackupFileEntry>,
    /// Summary of the event log's extent.
    pub event_log_summary: EventLogSummary,
    /// Whether `verify_chain` succeeded at backup time.
    pub chain_valid_at_backup: bool,
}

/// Lists every segment file plus the snapshot file (if present) in `dir`,
/// sorted by filename so segment order is preserved.
fn collect_backup_files(dir: &Path) -> Result<Vec<BackupFileEntry>, StoreError> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map_err(|err| StoreError::Fatal(format!("{}: {err}", dir.display())))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("segment-") || name == SNAPSHOT_FILE_NAME)
        .collect();
    names.sort();

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(&name);
        let bytes = fs::read(&path).map_err(|err| StoreError::Fatal(format!("{}: {err}", path.display())))?;
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
        files.push(BackupFileEntry {
            path: name,
            size_bytes: bytes.len() as u64,
            sha256: digest.value,
        });
    }
    Ok(files)
}

/// Produces a [`BackupManifest`] for the event log directory `dir`, whose
/// extent is read from `sink`.
///
/// # Errors
///
/// Returns [`StoreError::Fatal`] if `dir` cannot be listed or a file in it
/// cannot be read.
pub fn create_manifest(
    dir: &Path,
    sink: &dyn EventLogSink,
    at: Timestamp,
) -> Result<BackupManifest, StoreError> {
    let files = collect_backup_files(dir)?;
    let total_segments =
        u32::try_from(files.iter().filter(|file| file.path.starts_with("segment-")).count()).unwrap_or(u32::MAX);
    let snapshot_exists = files.iter().any(|file| file.path == SNAPSHOT_FILE_NAME);

    let status = sink.status()?;
    let first_event_id = if status.entry_count > 0 {
        sink.export_range(ExportRangeQuery {
            from_segment: Some(0),
            to_segment: Some(0),
            ..ExportRangeQuery::default()
        })
        .ok()
        .and_then(|(entries, _manifest)| entries.first().map(|entry| entry.id.clone()))
    } else {
        None
    };
    let chain_valid_at_backup = sink.verify_chain().map(|report| report.valid).unwrap_or(false);

    Ok(BackupManifest {
        version: 1,
        created_at: at,
        source_dir: dir.display().to_string(),
        files,
        event_log_summary: EventLogSummary {
            total_events: status.entry_count,
            total_segments,
            first_event_id,
            last_event_id: status.tip_id,
            last_current_hash: status.tip_hash.to_string(),
            snapshot_exists,
        },
        chain_valid_at_backup,
    })
}

/// Verifies a restored directory against its backup manifest: every listed
/// file's size and sha256 must match, and the restored chain must verify.
///
/// # Errors
///
/// Returns [`StoreError::Integrity`] if any file's size or hash mismatches,
/// or if `verify_chain` fails on the restored directory.
pub fn verify_restored(
    dir: &Path,
    manifest: &BackupManifest,
    sink: &dyn EventLogSink,
) -> Result<(), StoreError> {
    for file in &manifest.files {
        let path = dir.join(&file.path);
        let bytes = fs::read(&path).map_err(|err| StoreError::Fatal(format!("{}: {err}", path.display())))?;
        if bytes.len() as u64 != file.size_bytes {
            return Err(StoreError::Integrity(format!(
                "{}: expected {} bytes, found {}",
                file.path,
                file.size_bytes,
                bytes.len()
            )));
        }
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
        if digest.value != file.sha256 {
            return Err(StoreError::Integrity(format!("{}: sha256 mismatch", file.path)));
        }
    }
    let report = sink.verify_chain()?;
    if !report.valid {
        return Err(StoreError::Integrity(
            report.reason.unwrap_or_else(|| "chain verification failed".to_string()),
        ));
    }
    Ok(())
}
