// crates/govgate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Repository and Event Log Interfaces
// Description: Storage-agnostic contracts every concrete backend must honor.
// Purpose: Model C2 (repositories) and C3 (event log sink) as traits so
//          `govgate-store` can implement them without `govgate-core` knowing
//          anything about files, locks, or atomic renames.
// Dependencies: crate::entities::*, crate::hashing, thiserror
// ============================================================================

//! ## Overview
//! Every repository trait exposes `create`/`get`/`list` plus the narrow,
//! explicitly whitelisted mutators named in the data model (spec §3/§4.1).
//! There is no generic `update`: an entity either has no mutator at all
//! (situations' core fields, episodes' core fields, decisions, contracts,
//! consequence observations) or a small named set of state-transition calls.
//!
//! All fallible operations return [`StoreError`], the single error taxonomy
//! shared by every repository and the event log sink (spec §7).

use std::collections::BTreeMap;

use thiserror::Error;

use crate::entities::consequence::ConsequenceObservation;
use crate::entities::contract::Contract;
use crate::entities::decision::Decision;
use crate::entities::episode::Episode;
use crate::entities::episode::EpisodeState;
use crate::entities::event_log::EventLogEntry;
use crate::entities::identifiers::AttachmentId;
use crate::entities::identifiers::ContractId;
use crate::entities::identifiers::DecisionId;
use crate::entities::identifiers::EpisodeId;
use crate::entities::identifiers::EventId;
use crate::entities::identifiers::MandateId;
use crate::entities::identifiers::ObservationId;
use crate::entities::identifiers::ProtocolId;
use crate::entities::identifiers::SituationId;
use crate::entities::mandate::AutonomyMandate;
use crate::entities::mandate::ExpireReason;
use crate::entities::protocol::Protocol;
use crate::entities::situation::AnalysisAttachment;
use crate::entities::situation::Situation;
use crate::entities::situation::SituationStatus;
use crate::entities::time::Timestamp;
use crate::hashing::HashDigest;

/// The error taxonomy shared by every repository and the event log sink
/// (spec §7): seven kinds, each mapped to a distinct caller-facing remedy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller supplied data that fails a structural or business rule.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The requested transition is illegal given the entity's current state.
    #[error("illegal state transition: {0}")]
    State(String),
    /// No entity exists for the given identifier.
    #[error("not found: {0}")]
    NotFound(String),
    /// Persisted data failed an integrity check (hash mismatch, corrupt
    /// segment, non-monotonic id/timestamp).
    #[error("integrity violation: {0}")]
    Integrity(String),
    /// A concurrent writer invalidated this operation's precondition.
    #[error("concurrent modification: {0}")]
    Concurrency(String),
    /// A configured capacity (export/replay/retention bound) was exceeded.
    #[error("capacity exceeded: {0}")]
    Capacity(String),
    /// A tenant-scoping rule was violated (unknown, suspended, or
    /// cross-tenant access).
    #[error("tenant error: {0}")]
    Tenant(String),
    /// An unrecoverable I/O or environment failure.
    #[error("fatal storage error: {0}")]
    Fatal(String),
}

/// Persists and retrieves [`Situation`] records.
///
/// Core fields are immutable after creation; only attachment append and
/// forward status advance are permitted.
pub trait SituationRepository {
    /// Creates a new situation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `situation` is structurally
    /// invalid, or [`StoreError::Fatal`] on an I/O failure.
    fn create(&self, situation: Situation) -> Result<Situation, StoreError>;

    /// Fetches a situation by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such situation exists.
    fn get(&self, id: &SituationId) -> Result<Situation, StoreError>;

    /// Lists every known situation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn list(&self) -> Result<Vec<Situation>, StoreError>;

    /// Appends an analysis attachment to an existing situation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` is unknown, or
    /// [`StoreError::Fatal`] on an I/O failure.
    fn append_attachment(
        &self,
        id: &SituationId,
        attachment: AnalysisAttachment,
    ) -> Result<Situation, StoreError>;

    /// Advances a situation's status forward.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if `to` does not strictly follow the
    /// situation's current status (per
    /// [`crate::entities::situation::SituationStatus::allows_transition_to`]),
    /// or [`StoreError::NotFound`] if `id` is unknown.
    fn advance_status(
        &self,
        id: &SituationId,
        to: SituationStatus,
    ) -> Result<Situation, StoreError>;
}

/// Persists and retrieves [`Episode`] records.
pub trait EpisodeRepository {
    /// Creates a new episode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] or [`StoreError::Fatal`].
    fn create(&self, episode: Episode) -> Result<Episode, StoreError>;

    /// Fetches an episode by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such episode exists.
    fn get(&self, id: &EpisodeId) -> Result<Episode, StoreError>;

    /// Fetches the episode for a given situation, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no episode references
    /// `situation_id`.
    fn get_by_situation(&self, situation_id: &SituationId) -> Result<Episode, StoreError>;

    /// Lists every known episode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn list(&self) -> Result<Vec<Episode>, StoreError>;

    /// Advances an episode's state forward, stamping the matching timestamp
    /// field (`decided_at`/`observation_started_at`/`closed_at`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if `to` does not strictly follow the
    /// episode's current state, or [`StoreError::NotFound`] if `id` is
    /// unknown.
    fn advance_state(
        &self,
        id: &EpisodeId,
        to: EpisodeState,
        at: Timestamp,
    ) -> Result<Episode, StoreError>;
}

/// Persists and retrieves [`Protocol`] records. Immutable after creation.
pub trait ProtocolRepository {
    /// Creates a new protocol.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if a protocol already exists for
    /// the episode, or [`StoreError::Fatal`] on an I/O failure.
    fn create(&self, protocol: Protocol) -> Result<Protocol, StoreError>;

    /// Fetches a protocol by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such protocol exists.
    fn get(&self, id: &ProtocolId) -> Result<Protocol, StoreError>;

    /// Fetches the protocol for a given episode, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no protocol references
    /// `episode_id`.
    fn get_by_episode(&self, episode_id: &EpisodeId) -> Result<Protocol, StoreError>;
}

/// Persists and retrieves [`Decision`] records. Immutable after creation.
pub trait DecisionRepository {
    /// Creates a new decision.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] or [`StoreError::Fatal`].
    fn create(&self, decision: Decision) -> Result<Decision, StoreError>;

    /// Fetches a decision by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such decision exists.
    fn get(&self, id: &DecisionId) -> Result<Decision, StoreError>;

    /// Fetches the decision for a given episode, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no decision references
    /// `episode_id`.
    fn get_by_episode(&self, episode_id: &EpisodeId) -> Result<Decision, StoreError>;
}

/// Persists and retrieves [`Contract`] records. Immutable after issuance.
pub trait ContractRepository {
    /// Creates a new contract.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] or [`StoreError::Fatal`].
    fn create(&self, contract: Contract) -> Result<Contract, StoreError>;

    /// Fetches a contract by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such contract exists.
    fn get(&self, id: &ContractId) -> Result<Contract, StoreError>;

    /// Fetches the contract issued from a given decision, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no contract references
    /// `decision_id`.
    fn get_by_decision(&self, decision_id: &DecisionId) -> Result<Contract, StoreError>;

    /// Lists every known contract. Backs
    /// `crate::dashboards::TenantDashboard`'s pending-observation count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn list(&self) -> Result<Vec<Contract>, StoreError>;
}

/// Persists and retrieves [`ConsequenceObservation`] records. Append-only.
pub trait ConsequenceRepository {
    /// Records a new consequence observation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the observation fails the
    /// minimum-evidences superset check, or [`StoreError::Fatal`].
    fn create(
        &self,
        observation: ConsequenceObservation,
    ) -> Result<ConsequenceObservation, StoreError>;

    /// Fetches an observation by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such observation exists.
    fn get(&self, id: &ObservationId) -> Result<ConsequenceObservation, StoreError>;

    /// Lists every observation bound to a given contract, in registration
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn list_by_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<ConsequenceObservation>, StoreError>;
}

/// Persists and retrieves [`AutonomyMandate`] records with their narrow set
/// of status mutators.
pub trait MandateRepository {
    /// Creates (grants) a new mandate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] or [`StoreError::Fatal`].
    fn create(&self, mandate: AutonomyMandate) -> Result<AutonomyMandate, StoreError>;

    /// Fetches a mandate by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such mandate exists.
    fn get(&self, id: &MandateId) -> Result<AutonomyMandate, StoreError>;

    /// Lists every mandate granted to a given agent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn list_by_agent(
        &self,
        agent_id: &crate::entities::identifiers::AgentId,
    ) -> Result<Vec<AutonomyMandate>, StoreError>;

    /// Atomically increments `uses`, stamps `last_used_at`, and flips status
    /// to `expired(Uses)` if `max_uses` is now reached.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if the mandate is not `active`, or
    /// [`StoreError::Concurrency`] if a racing use already exhausted the
    /// budget.
    fn consume_use(&self, id: &MandateId, at: Timestamp) -> Result<AutonomyMandate, StoreError>;

    /// Records a revocation, moving status to `revoked`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if the mandate is already terminal.
    fn record_revocation(
        &self,
        id: &MandateId,
        revoked_by: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<AutonomyMandate, StoreError>;

    /// Records expiration, moving status to `expired`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if the mandate is already terminal.
    fn record_expiration(
        &self,
        id: &MandateId,
        reason: ExpireReason,
        at: Timestamp,
    ) -> Result<AutonomyMandate, StoreError>;

    /// Records a suspension, moving status to `suspended`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if the mandate is terminal.
    fn record_suspension(
        &self,
        id: &MandateId,
        reason: &str,
        triggered_by_observation_id: Option<ObservationId>,
        at: Timestamp,
    ) -> Result<AutonomyMandate, StoreError>;

    /// Records a resumption, moving status from `suspended` back to
    /// `active`. `reason` is required (and validated non-empty) when the
    /// mandate carries a `triggered_by_observation_id`; whether the acting
    /// identity is permitted to resume at all is validated by the caller
    /// before this mutator runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] if the mandate is not `suspended`, or
    /// [`StoreError::Validation`] if it was suspended by a triggering
    /// observation and no reason is supplied.
    fn record_resumption(&self, id: &MandateId, reason: Option<&str>) -> Result<AutonomyMandate, StoreError>;

    /// Degrades a mandate's mode by one level
    /// ([`crate::entities::mandate::AutonomyMode::degrade`]).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` is unknown.
    fn record_mode_degradation(
        &self,
        id: &MandateId,
    ) -> Result<AutonomyMandate, StoreError>;

    /// Lists every mandate known to this tenant, regardless of agent.
    /// Backs `crate::dashboards::TenantDashboard`'s counts; no other
    /// component needs tenant-wide enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn list_all(&self) -> Result<Vec<AutonomyMandate>, StoreError>;
}

/// The append-only, hash-chained audit substrate (spec §4.2).
pub trait EventLogSink {
    /// Appends a new entry, computing `previous_hash`/`current_hash` from
    /// the current chain tip.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Concurrency`] if a racing writer already
    /// advanced the chain tip, or [`StoreError::Fatal`] on an I/O failure.
    fn append(
        &self,
        actor: &str,
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        payload: serde_json::Value,
        at: Timestamp,
    ) -> Result<EventLogEntry, StoreError>;

    /// Verifies the full chain from genesis: recomputed hash matches
    /// stored `current_hash`, `previous_hash` matches the preceding
    /// entry's `current_hash`, and ids/timestamps are non-decreasing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure reading a segment.
    /// A broken chain is not an `Err`: it is reported as
    /// `ChainVerificationReport { valid: false, .. }`.
    fn verify_chain(&self) -> Result<ChainVerificationReport, StoreError>;

    /// Verifies the chain starting from the most recent snapshot rather
    /// than genesis, falling back to [`Self::verify_chain`] when the
    /// snapshot is absent or corrupt.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure reading a segment.
    fn verify_from_snapshot(&self) -> Result<ChainVerificationReport, StoreError>;

    /// Exports entries matching `query`'s timestamp/segment bounds,
    /// returning a contiguous slice plus a manifest describing it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Capacity`] if the matching slice exceeds the
    /// configured maximum export size.
    fn export_range(&self, query: ExportRangeQuery) -> Result<(Vec<EventLogEntry>, ExportManifest), StoreError>;

    /// Replays the chain from genesis, aggregating counts by event type,
    /// entity type, and actor and listing any inconsistencies found. If the
    /// chain exceeds the configured maximum replay size, stops early and
    /// returns a summary with `truncated = true` rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure reading a segment.
    fn replay(&self) -> Result<ReplaySummary, StoreError>;

    /// Returns the current chain length and tip hash without reading every
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    fn status(&self) -> Result<EventLogStatus, StoreError>;
}

/// A lightweight snapshot of the event log's current extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogStatus {
    /// Number of entries appended so far.
    pub entry_count: u64,
    /// Hash of the most recently appended entry (genesis if empty).
    pub tip_hash: HashDigest,
    /// Id of the most recently appended entry, if any.
    pub tip_id: Option<EventId>,
}

/// Outcome of [`EventLogSink::verify_chain`]/[`EventLogSink::verify_from_snapshot`]
/// (spec §4.2 "Verification").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainVerificationReport {
    /// Whether the walked portion of the chain is intact.
    pub valid: bool,
    /// Number of entries whose hash and ordering checked out before the
    /// first break, or all of them if `valid`.
    pub total_verified: u64,
    /// Absolute index of the first entry that failed verification.
    pub first_invalid_index: Option<u64>,
    /// Human-readable reason for the first failure.
    pub reason: Option<String>,
}

/// Filter bounds for [`EventLogSink::export_range`] (spec §4.2 "Export").
/// All bounds are inclusive; an absent bound is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportRangeQuery {
    /// Only include entries timestamped at or after this instant.
    pub from_ts: Option<Timestamp>,
    /// Only include entries timestamped at or before this instant.
    pub to_ts: Option<Timestamp>,
    /// Only include entries from this segment number onward.
    pub from_segment: Option<u32>,
    /// Only include entries up to and including this segment number.
    pub to_segment: Option<u32>,
}

/// Manifest describing an [`EventLogSink::export_range`] result (spec §4.2
/// "Export").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportManifest {
    /// Id of the first exported entry, if any.
    pub first_id: Option<EventId>,
    /// Id of the last exported entry, if any.
    pub last_id: Option<EventId>,
    /// Timestamp of the first exported entry, if any.
    pub first_ts: Option<Timestamp>,
    /// Timestamp of the last exported entry, if any.
    pub last_ts: Option<Timestamp>,
    /// Number of entries exported.
    pub count: u64,
    /// Lowest segment number an exported entry came from.
    pub first_segment: Option<u32>,
    /// Highest segment number an exported entry came from.
    pub last_segment: Option<u32>,
    /// Whether the exported entries themselves form a valid hash chain
    /// (each entry's `previous_hash` matches its predecessor's
    /// `current_hash`, within the exported slice only).
    pub chain_valid_within_export: bool,
}

/// Summary produced by [`EventLogSink::replay`] (spec §4.2 "Replay").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    /// Number of entries actually visited.
    pub total: u64,
    /// Whether replay stopped early because the chain exceeded the
    /// configured maximum replay size.
    pub truncated: bool,
    /// Timestamp of the first entry visited, if any.
    pub first_ts: Option<Timestamp>,
    /// Timestamp of the last entry visited, if any.
    pub last_ts: Option<Timestamp>,
    /// Entry counts keyed by `event_type`.
    pub counts_by_event_type: BTreeMap<String, u64>,
    /// Entry counts keyed by `entity_type`.
    pub counts_by_entity_type: BTreeMap<String, u64>,
    /// Entry counts keyed by `actor`.
    pub counts_by_actor: BTreeMap<String, u64>,
    /// Human-readable descriptions of every hash or ordering break found.
    pub inconsistencies: Vec<String>,
}
