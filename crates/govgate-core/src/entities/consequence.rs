// crates/govgate-core/src/entities/consequence.rs
// ============================================================================
// Module: Consequence Observation Entity
// Description: The post-hoc factual and perceptual record bound to a Contract.
// Purpose: Model §3 "ConsequenceObservation" and its anti-fraud check.
// Dependencies: crate::entities::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A [`ConsequenceObservation`] is append-only and must reference an
//! existing [`crate::entities::contract::Contract`] whose episode is in
//! `DECIDED`/`UNDER_OBSERVATION`/`CLOSED`. Its `minimum_evidences` must be a
//! superset of the contract's `minimum_required_observations` — see
//! [`ConsequenceObservation::satisfies_minimum_evidences`].

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::ContractId;
use crate::entities::identifiers::EpisodeId;
use crate::entities::identifiers::ObservationId;
use crate::entities::time::Timestamp;

/// Factual record of what actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedFacts {
    /// Description of what was observed.
    pub description: String,
    /// Measured indicators.
    pub indicators: Vec<String>,
    /// Attachment references (opaque ids or uris).
    pub attachments: Vec<String>,
    /// Whether the contract's execution limits were respected.
    pub limits_respected: bool,
    /// Whether the contract's mandatory conditions were met.
    pub conditions_met: bool,
}

/// Perceptual record of how the outcome was judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceivedOutcome {
    /// Description of the perceived outcome.
    pub description: String,
    /// Signal classification (opaque, caller-defined taxonomy).
    pub signal: String,
    /// Perceived risk classification (opaque, caller-defined taxonomy).
    pub perceived_risk: String,
    /// Lessons drawn from the observation.
    pub lessons: Vec<String>,
    /// Additional free-form context.
    pub extra_context: Option<String>,
}

/// A post-hoc factual and perceptual record bound to a contract.
///
/// # Invariants
/// - Append-only.
/// - Must reference an existing contract whose episode is in
///   `DECIDED`/`UNDER_OBSERVATION`/`CLOSED`.
/// - `minimum_evidences` must be a superset of the contract's
///   `minimum_required_observations` (anti-fraud check).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsequenceObservation {
    /// Observation identifier.
    pub id: ObservationId,
    /// Contract this observation is bound to.
    pub contract_id: ContractId,
    /// Episode the contract belongs to.
    pub episode_id: EpisodeId,
    /// Observed facts.
    pub observed: ObservedFacts,
    /// Perceived outcome.
    pub perceived: PerceivedOutcome,
    /// Evidence strings supplied by the registering actor.
    pub minimum_evidences: Vec<String>,
    /// Actor that registered the observation.
    pub registered_by: String,
    /// Registration time.
    pub registered_at: Timestamp,
    /// Prior observation this one follows up on, if any.
    pub prior_observation_id: Option<ObservationId>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl ConsequenceObservation {
    /// Returns whether `minimum_evidences` is a superset of the contract's
    /// required observation strings.
    #[must_use]
    pub fn satisfies_minimum_evidences(&self, required: &[String]) -> bool {
        required
            .iter()
            .all(|requirement| self.minimum_evidences.iter().any(|ev| ev == requirement))
    }
}
