// crates/govgate-core/src/entities/contract.rs
// ============================================================================
// Module: Contract Entity
// Description: The sole artifact returned across the system boundary.
// Purpose: Model §3 "Contract" exactly as the external-facing record.
// Dependencies: crate::entities::{identifiers, protocol, time}, serde
// ============================================================================

//! ## Overview
//! A [`Contract`] is issued once per
//! [`crate::entities::decision::Decision`] and is immutable. No repository
//! object, event log entry, or internal identifier beyond the fields
//! declared here may appear in an outbound response (spec §6).

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::ContractId;
use crate::entities::identifiers::DecisionId;
use crate::entities::identifiers::EpisodeId;
use crate::entities::protocol::Limit;
use crate::entities::time::Timestamp;

/// The sole artifact ever returned across the system boundary.
///
/// # Invariants
/// - One contract per decision.
/// - Immutable after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract identifier.
    pub id: ContractId,
    /// Episode this contract belongs to.
    pub episode_id: EpisodeId,
    /// Decision this contract was issued from.
    pub decision_id: DecisionId,
    /// The alternative authorized for execution.
    pub authorized_alternative: String,
    /// Execution limits copied from the decision.
    pub execution_limits: Vec<Limit>,
    /// Conditions that must hold for the contract to remain valid.
    pub mandatory_conditions: Vec<String>,
    /// Fixed list of observation fields a [`crate::entities::consequence::ConsequenceObservation`]
    /// must evidence (the anti-fraud superset check, spec §3).
    pub minimum_required_observations: Vec<String>,
    /// Issuance time.
    pub issued_at: Timestamp,
    /// Opaque caller-supplied identifier for who the contract was issued to.
    /// Ownership of this value (who may set it) is an external-interface
    /// policy not fixed by this core (spec §9 Design Notes).
    pub issued_to: String,
}
