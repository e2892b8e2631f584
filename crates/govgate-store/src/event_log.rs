// crates/govgate-store/src/event_log.rs
// ============================================================================
// Module: Hash-Chained Segmented Event Log
// Description: File-based implementation of `EventLogSink` (spec §4.2/§6).
// Purpose: Append, verify, export, and replay the tamper-evident audit trail.
// Dependencies: govgate_core::{entities::event_log, hashing, interfaces},
//               crate::fs_util
// ============================================================================

//! ## Overview
//! Entries live in numbered segment files (`segment-NNNNNN.json`, a JSON
//! array of [`EventLogEntry`]) of at most [`EventLogConfig::segment_size`]
//! entries each. A snapshot file (`event-log-snapshot.json`) periodically
//! records the verified tail so [`FileEventLogSink::verify_from_snapshot`]
//! can skip the segments it already covers. [`FileEventLogSink::append`]
//! serializes writers through a single in-process mutex, matching spec §5's
//! "single-writer lock" for the event log.
//!
//! Retention removes the oldest *closed* segments once more than
//! [`EventLogConfig::retention_segments`] accumulate. Once early segments
//! are removed, [`FileEventLogSink::verify_chain`] can only walk from the
//! oldest segment still on disk rather than true genesis — the snapshot is
//! what carries forward the guarantee that this truncated walk is still
//! anchored to a previously verified hash (spec §4.2 "Retention").

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use govgate_core::StoreError;
use govgate_core::entities::event_log::EventLogEntry;
use govgate_core::entities::identifiers::EventId;
use govgate_core::entities::time::Timestamp;
use govgate_core::hashing::DEFAULT_HASH_ALGORITHM;
use govgate_core::hashing::HashDigest;
use govgate_core::hashing::hash_canonical_json;
use govgate_core::interfaces::ChainVerificationReport;
use govgate_core::interfaces::EventLogSink;
use govgate_core::interfaces::EventLogStatus;
use govgate_core::interfaces::ExportManifest;
use govgate_core::interfaces::ExportRangeQuery;
use govgate_core::interfaces::ReplaySummary;
use serde::Deserialize;
use serde::Serialize;

use crate::fs_util;

/// Filename of the snapshot file within an event log directory, shared with
/// `crate::backup` so it knows which file is the snapshot without
/// re-deriving the name.
pub const SNAPSHOT_FILE_NAME: &str = "event-log-snapshot.json";

/// Tunable limits governing segment rotation, snapshotting, retention, and
/// the hard export/replay ceilings (spec §6 "Configuration").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Entries per segment before rotation.
    pub segment_size: u32,
    /// Appends between snapshot rewrites.
    pub snapshot_every: u32,
    /// Maximum retained closed segments.
    pub retention_segments: u32,
    /// Hard ceiling on a single `export_range` call.
    pub max_events_export: usize,
    /// Hard ceiling on a single `replay` call.
    pub max_events_replay: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            segment_size: 1000,
            snapshot_every: 500,
            retention_segments: 30,
            max_events_export: 10_000,
            max_events_replay: 50_000,
        }
    }
}

/// The persisted shape of `event-log-snapshot.json` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotFile {
    schema_version: u32,
    verified_count: u64,
    last_verified_id: Option<EventId>,
    last_verified_ts: Option<Timestamp>,
    current_hash: HashDigest,
    current_segment_number: u32,
}

impl SnapshotFile {
    fn genesis() -> Self {
        Self {
            schema_version: 1,
            verified_count: 0,
            last_verified_id: None,
            last_verified_ts: None,
            current_hash: HashDigest::genesis(),
            current_segment_number: 0,
        }
    }
}

/// In-memory chain tip, rebuilt by scanning segment files at construction
/// and kept current under `FileEventLogSink::write_lock` thereafter.
struct LogState {
    next_index: u64,
    tip_hash: HashDigest,
    tip_id: Option<EventId>,
    current_segment_number: u32,
    current_segment_len: u32,
    appends_since_snapshot: u32,
}

/// File-backed, hash-chained, segmented event log.
pub struct FileEventLogSink {
    dir: PathBuf,
    config: EventLogConfig,
    write_lock: Mutex<LogState>,
}

impl FileEventLogSink {
    /// Opens (or creates) the event log rooted at `dir`, rebuilding the
    /// in-memory chain tip by scanning existing segment files.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] if `dir` cannot be read or created, or
    /// [`StoreError::Integrity`] if an existing segment is not valid JSON.
    pub fn open(dir: &Path, config: EventLogConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|err| StoreError::Fatal(format!("{}: {err}", dir.display())))?;
        let snapshot = fs_util::read_json_or_default(&Self::snapshot_path_for(dir), SnapshotFile::genesis())?;
        let state = Self::rebuild_tip(dir, &snapshot)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            write_lock: Mutex::new(state),
        })
    }

    fn snapshot_path_for(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE_NAME)
    }

    fn snapshot_path(&self) -> PathBuf {
        Self::snapshot_path_for(&self.dir)
    }

    fn segment_path(&self, number: u32) -> PathBuf {
        self.dir.join(format!("segment-{number:06}.json"))
    }

    fn read_segment(&self, number: u32) -> Result<Vec<EventLogEntry>, StoreError> {
        fs_util::read_json_or_default(&self.segment_path(number), Vec::new())
    }

    /// Scans every segment file from 0 up to the first gap, counting
    /// entries and recording the last one as the chain tip.
    fn rebuild_tip(dir: &Path, snapshot: &SnapshotFile) -> Result<LogState, StoreError> {
        let mut next_index = 0u64;
        let mut tip_hash = HashDigest::genesis();
        let mut tip_id = None;
        let mut current_segment_number = 0u32;
        let mut current_segment_len = 0u32;

        loop {
            let path = dir.join(format!("segment-{current_segment_number:06}.json"));
            if !path.exists() {
                break;
            }
            let entries: Vec<EventLogEntry> = fs_util::read_json_or_default(&path, Vec::new())?;
            current_segment_len = u32::try_from(entries.len()).unwrap_or(u32::MAX);
            next_index += entries.len() as u64;
            if let Some(last) = entries.last() {
                tip_hash = last.current_hash.clone();
                tip_id = Some(last.id.clone());
            }
            current_segment_number += 1;
        }
        // `current_segment_number` overshot by one past the last existing
        // segment (or is 0 if none exist); step back to the real tip segment.
        let current_segment_number = current_segment_number.saturating_sub(1);

        let appends_since_snapshot = next_index.saturating_sub(snapshot.verified_count);
        Ok(LogState {
            next_index,
            tip_hash,
            tip_id,
            current_segment_number,
            current_segment_len,
            appends_since_snapshot: u32::try_from(appends_since_snapshot).unwrap_or(u32::MAX),
        })
    }

    /// Formats an append index as the zero-padded decimal [`EventId`] this
    /// log uses: lexical order matches numeric order, which lets
    /// verification compare ids as strings.
    fn make_id(index: u64) -> EventId {
        EventId::new(format!("{index:012}"))
    }

    /// Parses an [`EventId`] minted by [`Self::make_id`] back to its index.
    fn parse_index(id: &EventId) -> Result<u64, StoreError> {
        id.as_str()
            .parse::<u64>()
            .map_err(|_| StoreError::Integrity(format!("malformed event id: {id}")))
    }

    /// Deletes closed segments older than `retention_segments`, never
    /// touching the currently open segment.
    fn enforce_retention(&self, state: &LogState) -> Result<(), StoreError> {
        let closed_segment_count = state.current_segment_number; // segments 0..current are closed
        let retention = self.config.retention_segments;
        if u64::from(closed_segment_count) <= u64::from(retention) {
            return Ok(());
        }
        let evict_up_to = closed_segment_count - retention;
        for number in 0..evict_up_to {
            let path = self.segment_path(number);
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|err| StoreError::Fatal(format!("{}: {err}", path.display())))?;
            }
        }
        Ok(())
    }

    /// Recomputes `current_hash` for an entry given its other fields and
    /// `previous_hash`, the same way `verify_chain` re-derives it.
    fn compute_hash(entry: &EventLogEntry) -> Result<HashDigest, StoreError> {
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, &entry.hashed_fields())
            .map_err(|err| StoreError::Fatal(format!("hashing event log entry: {err}")))
    }

    /// Walks every entry from `start_segment` (with `start_hash` trusted as
    /// the previous hash of its first entry) through the tip, checking hash
    /// continuity and id/timestamp monotonicity. Stops and reports at the
    /// first break rather than raising, so callers can build a
    /// [`ChainVerificationReport`] without losing which entry failed.
    fn walk_verify(
        &self,
        start_segment: u32,
        mut previous_hash: HashDigest,
        mut previous_index: Option<u64>,
        mut previous_ts: Option<Timestamp>,
    ) -> Result<WalkOutcome, StoreError> {
        let mut total_verified = 0u64;
        let mut segment_number = start_segment;
        loop {
            let path = self.segment_path(segment_number);
            if !path.exists() {
                break;
            }
            let entries = self.read_segment(segment_number)?;
            for entry in &entries {
                let index = Self::parse_index(&entry.id)?;
                if let Some(prev) = previous_index
                    && index < prev
                {
                    return Ok(WalkOutcome::broken(
                        total_verified,
                        index,
                        format!("event id {} is out of order after {prev}", entry.id),
                    ));
                }
                if let Some(prev_ts) = previous_ts
                    && entry.timestamp < prev_ts
                {
                    return Ok(WalkOutcome::broken(
                        total_verified,
                        index,
                        format!("event {} has a timestamp earlier than its predecessor", entry.id),
                    ));
                }
                if entry.previous_hash != previous_hash {
                    return Ok(WalkOutcome::broken(
                        total_verified,
                        index,
                        format!("event {} previous_hash does not match the preceding entry", entry.id),
                    ));
                }
                let recomputed = Self::compute_hash(entry)?;
                if recomputed != entry.current_hash {
                    return Ok(WalkOutcome::broken(total_verified, index, "hash mismatch".to_string()));
                }
                total_verified += 1;
                previous_hash = entry.current_hash.clone();
                previous_index = Some(index);
                previous_ts = Some(entry.timestamp);
            }
            segment_number += 1;
        }
        Ok(WalkOutcome {
            total_verified,
            first_invalid_index: None,
            reason: None,
        })
    }

    /// Checks whether `entries` form a valid hash chain among themselves:
    /// each entry's own hash recomputes correctly and its `previous_hash`
    /// matches its predecessor's `current_hash`. Does not consult anything
    /// outside the slice, so a slice that does not start at genesis is
    /// judged only on its own internal continuity.
    fn verify_exported_slice(entries: &[EventLogEntry]) -> bool {
        let mut previous: Option<&EventLogEntry> = None;
        for entry in entries {
            match Self::compute_hash(entry) {
                Ok(recomputed) if recomputed == entry.current_hash => {}
                _ => return false,
            }
            if let Some(prev) = previous
                && entry.previous_hash != prev.current_hash
            {
                return false;
            }
            previous = Some(entry);
        }
        true
    }
}

/// Result of [`FileEventLogSink::walk_verify`].
struct WalkOutcome {
    total_verified: u64,
    first_invalid_index: Option<u64>,
    reason: Option<String>,
}

impl WalkOutcome {
    const fn broken(total_verified: u64, first_invalid_index: u64, reason: String) -> Self {
        Self {
            total_verified,
            first_invalid_index: Some(first_invalid_index),
            reason: Some(reason),
        }
    }
}

impl EventLogSink for FileEventLogSink {
    fn append(
        &self,
        actor: &str,
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        payload: serde_json::Value,
        at: Timestamp,
    ) -> Result<EventLogEntry, StoreError> {
        let mut state = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Fatal("event log write lock poisoned".to_string()))?;

        if state.current_segment_len >= self.config.segment_size {
            state.current_segment_number += 1;
            state.current_segment_len = 0;
        }

        let id = Self::make_id(state.next_index);
        let mut entry = EventLogEntry {
            id,
            timestamp: at,
            actor: actor.to_string(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            payload,
            previous_hash: state.tip_hash.clone(),
            current_hash: HashDigest::genesis(),
        };
        entry.current_hash = Self::compute_hash(&entry)?;

        let segment_path = self.segment_path(state.current_segment_number);
        let mut entries: Vec<EventLogEntry> = fs_util::read_json_or_default(&segment_path, Vec::new())?;
        entries.push(entry.clone());
        fs_util::write_json_atomically(&segment_path, &entries)?;

        state.next_index += 1;
        state.current_segment_len += 1;
        state.tip_hash = entry.current_hash.clone();
        state.tip_id = Some(entry.id.clone());
        state.appends_since_snapshot += 1;

        if state.appends_since_snapshot >= self.config.snapshot_every {
            let snapshot = SnapshotFile {
                schema_version: 1,
                verified_count: state.next_index,
                last_verified_id: state.tip_id.clone(),
                last_verified_ts: Some(entry.timestamp),
                current_hash: state.tip_hash.clone(),
                current_segment_number: state.current_segment_number,
            };
            fs_util::write_json_atomically(&self.snapshot_path(), &snapshot)?;
            state.appends_since_snapshot = 0;
        }

        self.enforce_retention(&state)?;

        Ok(entry)
    }

    fn verify_chain(&self) -> Result<ChainVerificationReport, StoreError> {
        let outcome = self.walk_verify(0, HashDigest::genesis(), None, None)?;
        Ok(ChainVerificationReport {
            valid: outcome.first_invalid_index.is_none(),
            total_verified: outcome.total_verified,
            first_invalid_index: outcome.first_invalid_index,
            reason: outcome.reason,
        })
    }

    fn verify_from_snapshot(&self) -> Result<ChainVerificationReport, StoreError> {
        let snapshot_result: Result<SnapshotFile, StoreError> =
            fs_util::read_json_or_default(&self.snapshot_path(), SnapshotFile::genesis());
        let snapshot = match snapshot_result {
            Ok(snapshot) => snapshot,
            Err(_) => return self.verify_chain(),
        };
        if snapshot.verified_count == 0 {
            return self.verify_chain();
        }
        let previous_index = snapshot.verified_count.checked_sub(1);
        let outcome = self.walk_verify(
            snapshot.current_segment_number,
            snapshot.current_hash,
            previous_index,
            snapshot.last_verified_ts,
        )?;
        Ok(ChainVerificationReport {
            valid: outcome.first_invalid_index.is_none(),
            total_verified: snapshot.verified_count + outcome.total_verified,
            first_invalid_index: outcome.first_invalid_index,
            reason: outcome.reason,
        })
    }

    fn export_range(&self, query: ExportRangeQuery) -> Result<(Vec<EventLogEntry>, ExportManifest), StoreError> {
        let mut out = Vec::new();
        let mut first_segment = None;
        let mut last_segment = None;
        let mut segment_number = query.from_segment.unwrap_or(0);
        let to_segment = query.to_segment;
        loop {
            if let Some(to_segment) = to_segment
                && segment_number > to_segment
            {
                break;
            }
            let path = self.segment_path(segment_number);
            if !path.exists() {
                break;
            }
            let entries = self.read_segment(segment_number)?;
            for entry in entries {
                let in_range = query.from_ts.is_none_or(|from_ts| entry.timestamp >= from_ts)
                    && query.to_ts.is_none_or(|to_ts| entry.timestamp <= to_ts);
                if in_range {
                    if out.len() >= self.config.max_events_export {
                        return Err(StoreError::Capacity(format!(
                            "export matched more than the configured maximum of {} entries",
                            self.config.max_events_export
                        )));
                    }
                    first_segment.get_or_insert(segment_number);
                    last_segment = Some(segment_number);
                    out.push(entry);
                }
            }
            segment_number += 1;
        }

        let manifest = ExportManifest {
            first_id: out.first().map(|entry| entry.id.clone()),
            last_id: out.last().map(|entry| entry.id.clone()),
            first_ts: out.first().map(|entry| entry.timestamp),
            last_ts: out.last().map(|entry| entry.timestamp),
            count: out.len() as u64,
            first_segment,
            last_segment,
            chain_valid_within_export: Self::verify_exported_slice(&out),
        };
        Ok((out, manifest))
    }

    fn replay(&self) -> Result<ReplaySummary, StoreError> {
        let mut total = 0u64;
        let mut truncated = false;
        let mut first_ts = None;
        let mut last_ts = None;
        let mut counts_by_event_type = BTreeMap::new();
        let mut counts_by_entity_type = BTreeMap::new();
        let mut counts_by_actor = BTreeMap::new();
        let mut inconsistencies = Vec::new();

        let mut previous_hash = HashDigest::genesis();
        let mut previous_index: Option<u64> = None;
        let mut previous_entry_ts: Option<Timestamp> = None;
        let mut segment_number = 0u32;
        'outer: loop {
            let path = self.segment_path(segment_number);
            if !path.exists() {
                break;
            }
            let entries = self.read_segment(segment_number)?;
            for entry in &entries {
                if total >= self.config.max_events_replay as u64 {
                    truncated = true;
                    break 'outer;
                }

                if let Ok(index) = Self::parse_index(&entry.id) {
                    if let Some(prev) = previous_index
                        && index < prev
                    {
                        inconsistencies.push(format!("event id {} is out of order after {prev}", entry.id));
                    }
                    previous_index = Some(index);
                }
                if let Some(prev_ts) = previous_entry_ts
                    && entry.timestamp < prev_ts
                {
                    inconsistencies.push(format!("event {} has a timestamp earlier than its predecessor", entry.id));
                }
                if entry.previous_hash != previous_hash {
                    inconsistencies.push(format!("event {} previous_hash does not match the preceding entry", entry.id));
                }
                match Self::compute_hash(entry) {
                    Ok(recomputed) if recomputed == entry.current_hash => {}
                    _ => inconsistencies.push(format!("event {} current_hash does not match its recomputed hash", entry.id)),
                }
                previous_hash = entry.current_hash.clone();
                previous_entry_ts = Some(entry.timestamp);

                total += 1;
                first_ts.get_or_insert(entry.timestamp);
                last_ts = Some(entry.timestamp);
                *counts_by_event_type.entry(entry.event_type.clone()).or_insert(0u64) += 1;
                *counts_by_entity_type.entry(entry.entity_type.clone()).or_insert(0u64) += 1;
                *counts_by_actor.entry(entry.actor.clone()).or_insert(0u64) += 1;
            }
            segment_number += 1;
        }

        Ok(ReplaySummary {
            total,
            truncated,
            first_ts,
            last_ts,
            counts_by_event_type,
            counts_by_entity_type,
            counts_by_actor,
            inconsistencies,
        })
    }

    fn status(&self) -> Result<EventLogStatus, StoreError> {
        let state = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Fatal("event log write lock poisoned".to_string()))?;
        Ok(EventLogStatus {
            entry_count: state.next_index,
            tip_hash: state.tip_hash.clone(),
            tip_id: state.tip_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EventLogConfig {
        EventLogConfig {
            segment_size: 3,
            snapshot_every: 2,
            retention_segments: 30,
            max_events_export: 100,
            max_events_replay: 100,
        }
    }

    fn ts(text: &str) -> Timestamp {
        Timestamp::parse(text).expect("parse")
    }

    #[test]
    fn append_chains_hashes_and_is_valid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(dir.path(), small_config()).expect("open");
        for n in 0..5 {
            sink.append(
                "tester",
                "SITUATION_CREATED",
                "situation",
                &format!("sit-{n}"),
                serde_json::json!({"n": n}),
                ts("2026-01-01T00:00:00Z"),
            )
            .expect("append");
        }
        let report = sink.verify_chain().expect("verify");
        assert!(report.valid);
        assert_eq!(report.total_verified, 5);
        let status = sink.status().expect("status");
        assert_eq!(status.entry_count, 5);
    }

    #[test]
    fn segment_rotates_at_size_plus_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(dir.path(), small_config()).expect("open");
        for n in 0..4 {
            sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                .expect("append");
        }
        assert!(dir.path().join("segment-000000.json").exists());
        assert!(dir.path().join("segment-000001.json").exists());
        let first = sink.read_segment(0).expect("segment 0");
        let second = sink.read_segment(1).expect("segment 1");
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn verify_from_snapshot_matches_verify_chain_when_uncorrupted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(dir.path(), small_config()).expect("open");
        for n in 0..7 {
            sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                .expect("append");
        }
        let full = sink.verify_chain().expect("verify_chain");
        let fast = sink.verify_from_snapshot().expect("verify_from_snapshot");
        assert_eq!(full.valid, fast.valid);
        assert_eq!(full.total_verified, fast.total_verified);
    }

    #[test]
    fn tampering_with_a_hash_is_detected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(dir.path(), small_config()).expect("open");
        for n in 0..4 {
            sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                .expect("append");
        }
        let mut entries = sink.read_segment(0).expect("segment 0");
        entries[0].current_hash = HashDigest::new(DEFAULT_HASH_ALGORITHM, b"tampered");
        fs_util::write_json_atomically(&sink.segment_path(0), &entries).expect("rewrite");

        let report = sink.verify_chain().expect("verify_chain runs over a tampered log");
        assert!(!report.valid);
        assert_eq!(report.first_invalid_index, Some(0));
        assert_eq!(report.reason.as_deref(), Some("hash mismatch"));
    }

    #[test]
    fn export_rejects_a_matched_range_above_the_configured_maximum() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(
            dir.path(),
            EventLogConfig {
                max_events_export: 2,
                ..small_config()
            },
        )
        .expect("open");
        for n in 0..4 {
            sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                .expect("append");
        }
        let err = sink.export_range(ExportRangeQuery::default()).expect_err("limit exceeded");
        assert!(matches!(err, StoreError::Capacity(_)));
    }

    #[test]
    fn export_range_reports_a_manifest_for_the_matched_slice() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(dir.path(), small_config()).expect("open");
        for n in 0..4 {
            sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                .expect("append");
        }
        let (entries, manifest) = sink.export_range(ExportRangeQuery::default()).expect("export");
        assert_eq!(entries.len(), 4);
        assert_eq!(manifest.count, 4);
        assert_eq!(manifest.first_id, entries.first().map(|entry| entry.id.clone()));
        assert_eq!(manifest.last_id, entries.last().map(|entry| entry.id.clone()));
        assert!(manifest.chain_valid_within_export);
    }

    #[test]
    fn replay_aggregates_counts_and_truncates_past_the_configured_maximum() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileEventLogSink::open(
            dir.path(),
            EventLogConfig {
                max_events_replay: 3,
                ..small_config()
            },
        )
        .expect("open");
        for n in 0..5 {
            sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                .expect("append");
        }
        let summary = sink.replay().expect("replay");
        assert!(summary.truncated);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.counts_by_event_type.get("EVT"), Some(&3));
        assert_eq!(summary.counts_by_actor.get("tester"), Some(&3));
        assert!(summary.inconsistencies.is_empty());
    }

    #[test]
    fn reopening_resumes_from_the_correct_tip() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let sink = FileEventLogSink::open(dir.path(), small_config()).expect("open");
            for n in 0..4 {
                sink.append("tester", "EVT", "situation", &format!("sit-{n}"), serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
                    .expect("append");
            }
        }
        let sink = FileEventLogSink::open(dir.path(), small_config()).expect("reopen");
        let status = sink.status().expect("status");
        assert_eq!(status.entry_count, 4);
        sink.append("tester", "EVT", "situation", "sit-4", serde_json::json!({}), ts("2026-01-01T00:00:00Z"))
            .expect("append after reopen");
        let report = sink.verify_chain().expect("verify after reopen");
        assert!(report.valid);
    }
}
