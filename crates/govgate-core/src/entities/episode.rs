// crates/govgate-core/src/entities/episode.rs
// ============================================================================
// Module: Episode Entity
// Description: The life-cycle instance of a single Situation's handling.
// Purpose: Model §3 "Episode" with monotonic state transitions.
// Dependencies: crate::entities::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Exactly one [`Episode`] exists per [`crate::entities::situation::Situation`]
//! that reaches analysis. Its `state` advances monotonically and mirrors
//! (without duplicating the rules of) the owning situation's status.

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::EpisodeId;
use crate::entities::identifiers::SituationId;
use crate::entities::time::Timestamp;

/// Lifecycle state of an [`Episode`].
///
/// # Invariants
/// - Transitions are monotonic through this declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeState {
    /// Episode created; awaiting a validated protocol and decision.
    Created,
    /// A decision has been registered and a contract issued.
    Decided,
    /// Post-decision observation is under way.
    UnderObservation,
    /// Terminal: the episode is closed.
    Closed,
}

impl EpisodeState {
    /// Fixed forward order of episode states.
    const ORDER: [Self; 4] = [
        Self::Created,
        Self::Decided,
        Self::UnderObservation,
        Self::Closed,
    ];

    /// Returns this state's position in the fixed forward order.
    fn rank(self) -> usize {
        Self::ORDER
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(0)
    }

    /// Returns whether moving from `self` to `to` is a legal monotonic
    /// advance.
    #[must_use]
    pub fn allows_transition_to(self, to: Self) -> bool {
        to.rank() > self.rank()
    }
}

/// The life-cycle instance of a single situation's handling.
///
/// # Invariants
/// - Exactly one episode exists per situation reaching analysis.
/// - `state` transitions are monotonic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode identifier.
    pub id: EpisodeId,
    /// Caller-declared use case identifier, copied from the situation.
    pub use_case: i64,
    /// Domain, copied from the situation.
    pub domain: String,
    /// Lifecycle state.
    pub state: EpisodeState,
    /// Situation this episode handles.
    pub referenced_situation_id: SituationId,
    /// Creation time.
    pub created_at: Timestamp,
    /// Time the episode was decided, once reached.
    pub decided_at: Option<Timestamp>,
    /// Time observation started, once reached.
    pub observation_started_at: Option<Timestamp>,
    /// Time the episode closed, once reached.
    pub closed_at: Option<Timestamp>,
}
