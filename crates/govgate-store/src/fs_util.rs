// crates/govgate-store/src/fs_util.rs
// ============================================================================
// Module: Atomic File Persistence Helpers
// Description: Write-temp-then-rename primitives shared by every repository
//              and the event log.
// Purpose: Guarantee that a reader never observes a torn file (spec §4.1).
// Dependencies: serde, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Every persisted file in this crate (entity tables, segments, snapshots,
//! the tenant registry) is written by serializing into a `NamedTempFile`
//! created alongside the target path and then persisting it over the target,
//! which on POSIX filesystems is an atomic rename. A reader opening the
//! target path therefore always sees either the old complete contents or the
//! new complete contents, never a partial write.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::StoreError;

/// Reads and deserializes a JSON file, returning `default` if it does not
/// exist yet.
///
/// # Errors
///
/// Returns [`StoreError::Fatal`] if the file exists but cannot be read, or
/// [`StoreError::Integrity`] if its contents are not valid JSON for `T`.
pub fn read_json_or_default<T: DeserializeOwned>(path: &Path, default: T) -> Result<T, StoreError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::Integrity(format!("{}: {err}", path.display()))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(default),
        Err(err) => Err(StoreError::Fatal(format!("{}: {err}", path.display()))),
    }
}

/// Serializes `value` as pretty JSON and atomically replaces `path`.
///
/// # Errors
///
/// Returns [`StoreError::Fatal`] on any I/O failure, including failure to
/// create the parent directory.
pub fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Fatal(format!("{}: has no parent directory", path.display())))?;
    fs::create_dir_all(parent).map_err(|err| StoreError::Fatal(format!("{}: {err}", parent.display())))?;

    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| StoreError::Fatal(format!("serializing {}: {err}", path.display())))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|err| StoreError::Fatal(format!("creating temp file in {}: {err}", parent.display())))?;
    temp.write_all(&bytes)
        .map_err(|err| StoreError::Fatal(format!("writing temp file: {err}")))?;
    temp.flush()
        .map_err(|err| StoreError::Fatal(format!("flushing temp file: {err}")))?;
    temp.persist(path)
        .map_err(|err| StoreError::Fatal(format!("persisting {}: {err}", path.display())))?;
    Ok(())
}

/// Appends `bytes` to `path`, creating it (and its parent directory) if
/// absent.
///
/// # Errors
///
/// Returns [`StoreError::Fatal`] on any I/O failure.
pub fn append_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Fatal(format!("{}: has no parent directory", path.display())))?;
    fs::create_dir_all(parent).map_err(|err| StoreError::Fatal(format!("{}: {err}", parent.display())))?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| StoreError::Fatal(format!("{}: {err}", path.display())))?;
    file.write_all(bytes)
        .map_err(|err| StoreError::Fatal(format!("{}: {err}", path.display())))
}
