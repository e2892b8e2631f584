// crates/govgate-core/src/entities/protocol.rs
// ============================================================================
// Module: Decision Protocol Entity
// Description: The formal pre-commitment a Decision must respect.
// Purpose: Model §3 "Decision Protocol" with its validation outcome.
// Dependencies: crate::entities::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Exactly one [`Protocol`] exists per
//! [`crate::entities::episode::Episode`] and is immutable after creation.
//! A `REJECTED` protocol blocks the episode from progressing.

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::EpisodeId;
use crate::entities::identifiers::ProtocolId;
use crate::entities::time::Timestamp;

/// Risk appetite declared by a protocol.
///
/// # Invariants
/// - Ordered `Conservative < Moderate < Aggressive`; this ordering is load
///   bearing for the autonomy evaluator's risk-profile gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    /// Lowest risk appetite.
    Conservative,
    /// Middle risk appetite.
    Moderate,
    /// Highest risk appetite.
    Aggressive,
}

/// A declared operational limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Limit kind (opaque, caller-defined taxonomy, e.g. `"time"`).
    pub kind: String,
    /// Human-readable description of the limit.
    pub description: String,
    /// Limit value, as an opaque string (units are kind-specific).
    pub value: String,
}

/// Validation state of a [`Protocol`].
///
/// # Invariants
/// - Terminal once set; a protocol is never re-validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolState {
    /// The protocol passed the Closed Layer and may back a decision.
    Validated,
    /// The protocol was rejected and blocks its episode.
    Rejected,
}

/// The formal pre-commitment a decision must respect.
///
/// # Invariants
/// - Exactly one protocol exists per episode.
/// - Immutable after creation.
/// - `chosen_alternative` must be an element of `evaluated_alternatives`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol identifier.
    pub id: ProtocolId,
    /// Episode this protocol belongs to.
    pub episode_id: EpisodeId,
    /// Minimum criteria the decision must satisfy.
    pub minimum_criteria: Vec<String>,
    /// Risks explicitly considered when drafting the protocol.
    pub considered_risks: Vec<String>,
    /// Declared operational limits.
    pub defined_limits: Vec<Limit>,
    /// Declared risk appetite.
    pub risk_profile: RiskProfile,
    /// Alternatives evaluated while drafting the protocol.
    pub evaluated_alternatives: Vec<String>,
    /// The alternative chosen; must be a member of `evaluated_alternatives`.
    pub chosen_alternative: String,
    /// Ids of memory-query attachments consulted while drafting.
    pub consulted_memory_ids: Vec<String>,
    /// Ids of analysis attachments used while drafting.
    pub used_attachment_ids: Vec<String>,
    /// Validation state.
    pub state: ProtocolState,
    /// Validation time.
    pub validated_at: Timestamp,
    /// Actor that validated (or rejected) the protocol.
    pub validated_by: String,
    /// Reason for rejection, present only when `state` is `Rejected`.
    pub rejection_reason: Option<String>,
}

impl Protocol {
    /// Returns whether `chosen_alternative` is a member of
    /// `evaluated_alternatives`.
    #[must_use]
    pub fn chosen_alternative_is_evaluated(&self) -> bool {
        self.evaluated_alternatives
            .iter()
            .any(|alternative| alternative == &self.chosen_alternative)
    }
}
