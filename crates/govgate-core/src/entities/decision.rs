// crates/govgate-core/src/entities/decision.rs
// ============================================================================
// Module: Decision Entity
// Description: The institutional record of which alternative was chosen.
// Purpose: Model §3 "Decision", immutable and protocol-consistent.
// Dependencies: crate::entities::{identifiers, protocol, time}, serde
// ============================================================================

//! ## Overview
//! A [`Decision`] requires a `VALIDATED`
//! [`crate::entities::protocol::Protocol`] for the same episode; its
//! `chosen_alternative` and `risk_profile` must equal the protocol's.

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::DecisionId;
use crate::entities::identifiers::EpisodeId;
use crate::entities::protocol::Limit;
use crate::entities::protocol::RiskProfile;
use crate::entities::time::Timestamp;

/// The institutional record of which alternative was chosen.
///
/// # Invariants
/// - Requires a `VALIDATED` protocol for the same episode.
/// - `chosen_alternative` and `risk_profile` must equal the protocol's.
/// - Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Decision identifier.
    pub id: DecisionId,
    /// Episode this decision belongs to.
    pub episode_id: EpisodeId,
    /// The alternative chosen; must equal the backing protocol's.
    pub chosen_alternative: String,
    /// Criteria copied from the backing protocol.
    pub criteria: Vec<String>,
    /// Limits copied from the backing protocol.
    pub limits: Vec<Limit>,
    /// Conditions attached to the decision.
    pub conditions: Vec<String>,
    /// Risk profile; must equal the backing protocol's.
    pub risk_profile: RiskProfile,
    /// Decision time.
    pub decided_at: Timestamp,
}
