// crates/govgate-core/src/entities/situation.rs
// ============================================================================
// Module: Situation Entity
// Description: The externally submitted decision request and its lifecycle.
// Purpose: Model §3 "Situation" exactly, including its append-only attachments.
// Dependencies: crate::entities::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A [`Situation`] is the root of the decision pipeline
//! (Situation → Episode → Protocol → Decision → Contract). Its `status`
//! moves forward only through the named sequence and its
//! `analysis_attachments` log is append-only.

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::AttachmentId;
use crate::entities::identifiers::SituationId;
use crate::entities::time::Timestamp;

/// Urgency of a situation, as declared by the caller.
///
/// # Invariants
/// - Variants are stable for serialization and rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// No time pressure.
    Low,
    /// Some time pressure.
    Medium,
    /// Immediate action expected.
    High,
    /// Action is expected before the next tick of any kind.
    Critical,
}

/// How much capacity the organization has to absorb a wrong call.
///
/// # Invariants
/// - Variants are stable for serialization and rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorptionCapacity {
    /// Low tolerance for a wrong call.
    Low,
    /// Moderate tolerance.
    Medium,
    /// High tolerance.
    High,
}

/// Lifecycle status of a [`Situation`].
///
/// # Invariants
/// - Transitions only move forward through this declared order; see
///   [`SituationStatus::allows_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationStatus {
    /// Drafted but not yet opened for handling.
    Draft,
    /// Open and awaiting episode creation.
    Open,
    /// Accepted into the pipeline.
    Accepted,
    /// Under analysis; attachments may be appended.
    UnderAnalysis,
    /// A decision has been registered.
    Decided,
    /// Post-decision consequences are being observed.
    UnderObservation,
    /// Terminal: the situation's episode is closed.
    Closed,
}

impl SituationStatus {
    /// Returns the fixed forward order of statuses.
    const ORDER: [Self; 7] = [
        Self::Draft,
        Self::Open,
        Self::Accepted,
        Self::UnderAnalysis,
        Self::Decided,
        Self::UnderObservation,
        Self::Closed,
    ];

    /// Returns this status's position in the fixed forward order.
    fn rank(self) -> usize {
        Self::ORDER
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(0)
    }

    /// Returns whether moving from `self` to `to` is a legal forward
    /// transition (strictly later in the fixed order).
    #[must_use]
    pub fn allows_transition_to(self, to: Self) -> bool {
        to.rank() > self.rank()
    }
}

/// An alternative course of action under consideration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Human-readable description of the alternative.
    pub description: String,
    /// Risks specifically associated with choosing this alternative.
    pub associated_risks: Vec<String>,
}

/// Reversibility of a named risk.
///
/// # Invariants
/// - Variants are stable for serialization and rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reversibility {
    /// The consequence can be fully undone.
    Reversible,
    /// The consequence can be partially undone.
    PartiallyReversible,
    /// The consequence cannot be undone.
    Irreversible,
}

/// A named risk attached to a situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    /// Human-readable description of the risk.
    pub description: String,
    /// Risk category/kind (opaque, caller-defined taxonomy).
    pub kind: String,
    /// Reversibility of the risk's consequence.
    pub reversibility: Reversibility,
}

/// Kind of analysis attachment appended to a situation.
///
/// # Invariants
/// - Variants are stable for serialization; `MemoryQuery` is the only kind
///   emitted by `Orchestrator::consult_memory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// A raw memory-query shape and the ids it returned; no ranking or
    /// recommendation is recorded.
    MemoryQuery,
    /// A free-form analysis note.
    Note,
}

/// An append-only analysis attachment on a [`Situation`].
///
/// # Invariants
/// - Never removed or edited in place once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisAttachment {
    /// Attachment identifier.
    pub id: AttachmentId,
    /// Attachment kind.
    pub kind: AttachmentKind,
    /// Opaque attachment body (query shape, note text, or similar).
    pub body: serde_json::Value,
    /// Time the attachment was appended.
    pub time: Timestamp,
}

/// A decision request submitted by an external caller.
///
/// # Invariants
/// - `status` transitions only forward through [`SituationStatus`]'s fixed
///   order.
/// - `analysis_attachments` is append-only: no removal, no in-place edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    /// Situation identifier.
    pub id: SituationId,
    /// Declaring domain (opaque, caller-defined taxonomy).
    pub domain: String,
    /// Free-form context describing the situation.
    pub context: String,
    /// The objective the decision should serve.
    pub objective: String,
    /// Open uncertainties bearing on the decision.
    pub uncertainties: Vec<String>,
    /// Alternatives under consideration.
    pub alternatives: Vec<Alternative>,
    /// Named risks.
    pub risks: Vec<Risk>,
    /// Declared urgency.
    pub urgency: Urgency,
    /// Declared absorption capacity.
    pub absorption_capacity: AbsorptionCapacity,
    /// The consequence relevant to this decision; must be non-empty for the
    /// Closed Layer's `CONSEQUENCE_REQUIRED` rule to pass.
    pub relevant_consequence: String,
    /// Whether this situation offers a learning opportunity.
    pub learning_possibility: bool,
    /// Caller-declared use case identifier.
    pub declared_use_case: i64,
    /// Lifecycle status.
    pub status: SituationStatus,
    /// Creation time.
    pub creation_time: Timestamp,
    /// Append-only analysis attachment log.
    pub analysis_attachments: Vec<AnalysisAttachment>,
}

impl Situation {
    /// Returns whether `risks` and `uncertainties` are jointly empty, the
    /// condition the Closed Layer's `RISK_REQUIRED` rule blocks on.
    #[must_use]
    pub fn has_no_declared_risk(&self) -> bool {
        self.risks.is_empty() && self.uncertainties.is_empty()
    }

    /// Returns whether `relevant_consequence` is empty or all whitespace.
    #[must_use]
    pub fn relevant_consequence_is_blank(&self) -> bool {
        self.relevant_consequence.trim().is_empty()
    }
}
