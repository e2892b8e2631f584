// crates/govgate-core/src/entities/event_log.rs
// ============================================================================
// Module: Event Log Entry
// Description: The wire shape of a single hash-chained audit entry.
// Purpose: Model §3/§6 "EventLog Entry" exactly, independent of storage.
// Dependencies: crate::{entities::{identifiers, time}, hashing}, serde
// ============================================================================

//! ## Overview
//! This module only defines the *shape* of an entry. Appending, chaining,
//! segmentation, snapshotting, verification, export, and replay all live in
//! `govgate-store::event_log`, which implements
//! [`crate::interfaces::EventLogSink`] against this type.

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::EventId;
use crate::entities::time::Timestamp;
use crate::hashing::HashDigest;

/// An append-only, hash-chained audit record.
///
/// # Invariants
/// - `current_hash = H(id || timestamp || actor || event_type ||
///   entity_type || entity_id || canonical(payload) || previous_hash)`.
/// - `previous_hash` of entry N equals `current_hash` of entry N-1, with
///   [`crate::hashing::HashDigest::genesis`] for entry 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Entry identifier, monotonically non-decreasing.
    pub id: EventId,
    /// Entry timestamp, monotonically non-decreasing.
    pub timestamp: Timestamp,
    /// Actor responsible for the transition this entry records.
    pub actor: String,
    /// Stable event-type string (the operation's name, per spec §4.6).
    pub event_type: String,
    /// Kind of entity this entry concerns (e.g. `"situation"`, `"mandate"`).
    pub entity_type: String,
    /// Identifier of the entity this entry concerns.
    pub entity_id: String,
    /// Opaque event payload.
    pub payload: serde_json::Value,
    /// Hash of the preceding entry (genesis value for entry 0).
    pub previous_hash: HashDigest,
    /// Hash of this entry's own immutable fields.
    pub current_hash: HashDigest,
}

/// The subset of [`EventLogEntry`] fields hashed to produce `current_hash`.
/// Kept as a canonically field-ordered struct, public so `govgate-store`
/// (and any other `EventLogSink` implementor) hashes from the exact same
/// field set and order `EventLogEntry` does, rather than re-deriving its own.
#[derive(Serialize)]
pub struct HashedEventFields<'a> {
    /// See [`EventLogEntry::id`].
    pub id: &'a EventId,
    /// See [`EventLogEntry::timestamp`].
    pub timestamp: &'a Timestamp,
    /// See [`EventLogEntry::actor`].
    pub actor: &'a str,
    /// See [`EventLogEntry::event_type`].
    pub event_type: &'a str,
    /// See [`EventLogEntry::entity_type`].
    pub entity_type: &'a str,
    /// See [`EventLogEntry::entity_id`].
    pub entity_id: &'a str,
    /// See [`EventLogEntry::payload`].
    pub payload: &'a serde_json::Value,
    /// See [`EventLogEntry::previous_hash`].
    pub previous_hash: &'a HashDigest,
}

impl EventLogEntry {
    /// Returns the canonical field view used to compute `current_hash`.
    #[must_use]
    pub fn hashed_fields(&self) -> HashedEventFields<'_> {
        HashedEventFields {
            id: &self.id,
            timestamp: &self.timestamp,
            actor: &self.actor,
            event_type: &self.event_type,
            entity_type: &self.entity_type,
            entity_id: &self.entity_id,
            payload: &self.payload,
            previous_hash: &self.previous_hash,
        }
    }
}
