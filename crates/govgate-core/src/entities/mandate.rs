// crates/govgate-core/src/entities/mandate.rs
// ============================================================================
// Module: Autonomy Mandate Entity
// Description: An explicit, revocable grant of autonomy to an agent.
// Purpose: Model §3 "AutonomyMandate" with its full status lifecycle.
// Dependencies: crate::entities::{identifiers, protocol, time}, serde
// ============================================================================

//! ## Overview
//! A mandate's `status` is monotonic except `suspended <-> active`: only a
//! non-system actor may resume a suspended mandate, and only when a reason
//! is supplied if a triggering observation exists. Once `revoked` or
//! `expired`, a mandate is terminal. See `crate::autonomy` for the pure
//! functions that interpret this entity.

use serde::Deserialize;
use serde::Serialize;

use crate::entities::identifiers::AgentId;
use crate::entities::identifiers::MandateId;
use crate::entities::identifiers::ObservationId;
use crate::entities::protocol::Limit;
use crate::entities::protocol::RiskProfile;
use crate::entities::time::Timestamp;

/// Degree of autonomy granted by a mandate.
///
/// # Invariants
/// - Ordered from least to most autonomous: `Teaching < Assisted < Autonomous`.
///   This ordering is load bearing for [`AutonomyMode::degrade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomyMode {
    /// The agent may only propose; a human decides. Always blocks autonomy
    /// evaluation per spec §4.4 rule 5.
    Teaching,
    /// The agent may act, but every action requires explicit human approval.
    Assisted,
    /// The agent may act autonomously within the mandate's bounds.
    Autonomous,
}

impl AutonomyMode {
    /// Degrades the mode one level (`Autonomous -> Assisted -> Teaching`);
    /// `Teaching` is a fixed point.
    #[must_use]
    pub const fn degrade(self) -> Self {
        match self {
            Self::Autonomous => Self::Assisted,
            Self::Assisted | Self::Teaching => Self::Teaching,
        }
    }
}

/// Reason a mandate expired.
///
/// # Invariants
/// - Variants are stable for serialization and audit payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpireReason {
    /// Expired because `valid_until` was reached.
    Time,
    /// Expired because `uses` reached `max_uses`.
    Uses,
}

/// Status of a mandate.
///
/// # Invariants
/// - Monotonic except `Suspended <-> Active`.
/// - `Revoked` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandateStatus {
    /// The mandate may be evaluated for activity.
    Active,
    /// Terminal: the mandate's validity window or use budget was exhausted.
    Expired,
    /// Terminal: the mandate was explicitly revoked.
    Revoked,
    /// Paused pending human review; may return to `Active` via resumption.
    Suspended,
}

/// An explicit, revocable grant of autonomy to an agent with bounds.
///
/// # Invariants
/// - `status` is monotonic except `suspended <-> active`.
/// - Once `revoked` or `expired`, terminal.
/// - Consumption of a use increments `uses` atomically (see
///   `crate::interfaces::MandateRepository::consume_use`) and flips status to
///   `expired(Uses)` when reaching `max_uses`.
/// - `uses <= max_uses` whenever `max_uses` is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutonomyMandate {
    /// Mandate identifier.
    pub id: MandateId,
    /// Agent this mandate is granted to.
    pub agent_id: AgentId,
    /// Degree of autonomy granted.
    pub mode: AutonomyMode,
    /// Policies the agent may invoke under this mandate.
    pub allowed_policies: Vec<String>,
    /// Maximum risk profile the agent may request.
    pub max_risk_profile: RiskProfile,
    /// Operational limits bounding the agent's actions.
    pub limits: Vec<Limit>,
    /// Phrases that, found in context (case-insensitive), force human review.
    pub human_trigger_phrases: Vec<String>,
    /// Domains the agent is restricted to, if any (empty means unrestricted).
    pub allowed_domains: Vec<String>,
    /// Use cases the agent is restricted to, if any (empty means
    /// unrestricted).
    pub allowed_use_cases: Vec<i64>,
    /// Actor that granted the mandate.
    pub granted_by: String,
    /// Grant time.
    pub granted_at: Timestamp,
    /// Optional start of the validity window.
    pub valid_from: Option<Timestamp>,
    /// Optional end of the validity window.
    pub valid_until: Option<Timestamp>,
    /// Optional maximum number of uses.
    pub max_uses: Option<u64>,
    /// Number of uses consumed so far.
    pub uses: u64,
    /// Time of the most recent use, if any.
    pub last_used_at: Option<Timestamp>,
    /// Current status.
    pub status: MandateStatus,
    /// Time of revocation, if revoked.
    pub revoked_at: Option<Timestamp>,
    /// Actor that revoked the mandate, if revoked.
    pub revoked_by: Option<String>,
    /// Reason for revocation, if revoked.
    pub revocation_reason: Option<String>,
    /// Time of expiration, if expired.
    pub expired_at: Option<Timestamp>,
    /// Reason for expiration, if expired.
    pub expire_reason: Option<ExpireReason>,
    /// Time of suspension, if suspended.
    pub suspended_at: Option<Timestamp>,
    /// Reason for suspension, if suspended.
    pub suspend_reason: Option<String>,
    /// Observation that triggered the current suspension, if any.
    pub triggered_by_observation_id: Option<ObservationId>,
}

impl AutonomyMandate {
    /// Returns whether the mandate has exhausted its use budget.
    #[must_use]
    pub fn uses_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max_uses| self.uses >= max_uses)
    }

    /// Returns whether `policy` is among the mandate's allowed policies.
    #[must_use]
    pub fn allows_policy(&self, policy: &str) -> bool {
        self.allowed_policies.iter().any(|allowed| allowed == policy)
    }

    /// Returns whether `domain` satisfies the mandate's domain restriction
    /// (unrestricted when `allowed_domains` is empty).
    #[must_use]
    pub fn allows_domain(&self, domain: &str) -> bool {
        self.allowed_domains.is_empty()
            || self.allowed_domains.iter().any(|allowed| allowed == domain)
    }

    /// Returns whether `use_case` satisfies the mandate's use-case
    /// restriction (unrestricted when `allowed_use_cases` is empty).
    #[must_use]
    pub fn allows_use_case(&self, use_case: i64) -> bool {
        self.allowed_use_cases.is_empty() || self.allowed_use_cases.contains(&use_case)
    }

    /// Returns whether any human trigger phrase occurs in `context`,
    /// case-insensitively.
    #[must_use]
    pub fn matches_human_trigger(&self, context: &str) -> bool {
        let haystack = context.to_lowercase();
        self.human_trigger_phrases
            .iter()
            .any(|phrase| haystack.contains(&phrase.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrade_steps_down_one_level_at_a_time() {
        assert_eq!(AutonomyMode::Autonomous.degrade(), AutonomyMode::Assisted);
        assert_eq!(AutonomyMode::Assisted.degrade(), AutonomyMode::Teaching);
        assert_eq!(AutonomyMode::Teaching.degrade(), AutonomyMode::Teaching);
    }

    #[test]
    fn risk_profile_ordering_matches_spec() {
        assert!(RiskProfile::Conservative < RiskProfile::Moderate);
        assert!(RiskProfile::Moderate < RiskProfile::Aggressive);
    }

    #[test]
    fn human_trigger_matching_is_case_insensitive() {
        let mandate = AutonomyMandate {
            human_trigger_phrases: vec!["terminate contract".to_string()],
            ..sample_mandate()
        };
        assert!(mandate.matches_human_trigger("please TERMINATE CONTRACT now"));
        assert!(!mandate.matches_human_trigger("renew the agreement"));
    }

    fn sample_mandate() -> AutonomyMandate {
        AutonomyMandate {
            id: MandateId::new("mandate-1"),
            agent_id: AgentId::new("agent-1"),
            mode: AutonomyMode::Autonomous,
            allowed_policies: vec![],
            max_risk_profile: RiskProfile::Moderate,
            limits: vec![],
            human_trigger_phrases: vec![],
            allowed_domains: vec![],
            allowed_use_cases: vec![],
            granted_by: "admin".to_string(),
            granted_at: Timestamp::parse("2026-01-01T00:00:00Z").expect("parse"),
            valid_from: None,
            valid_until: None,
            max_uses: None,
            uses: 0,
            last_used_at: None,
            status: MandateStatus::Active,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            expired_at: None,
            expire_reason: None,
            suspended_at: None,
            suspend_reason: None,
            triggered_by_observation_id: None,
        }
    }
}
