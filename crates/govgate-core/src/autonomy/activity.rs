// crates/govgate-core/src/autonomy/activity.rs
// ============================================================================
// Module: Mandate Activity Check
// Description: Pure function deciding whether a mandate is currently usable.
// Purpose: Implement spec §4.4 "Mandate activity check" exactly.
// Dependencies: crate::entities::{mandate, time}
// ============================================================================

use crate::entities::mandate::AutonomyMandate;
use crate::entities::mandate::ExpireReason;
use crate::entities::mandate::MandateStatus;
use crate::entities::time::Timestamp;

/// The specific rule that made a mandate inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactiveRule {
    /// `status = expired`.
    StatusExpired,
    /// `status = revoked`.
    StatusRevoked,
    /// `status = suspended`.
    StatusSuspended,
    /// `now < valid_from`.
    NotYetActive,
    /// `now > valid_until`.
    TimeExpired,
    /// `uses >= max_uses`.
    UsesExhausted,
}

/// Result of checking whether a mandate is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityOutcome {
    /// Whether the mandate may currently be used.
    pub active: bool,
    /// The rule that made it inactive, if any.
    pub rule: Option<InactiveRule>,
    /// The expire reason the caller should record, if this check found the
    /// mandate freshly exhausted (as opposed to already-terminal).
    pub should_expire: Option<ExpireReason>,
}

impl ActivityOutcome {
    const fn active() -> Self {
        Self {
            active: true,
            rule: None,
            should_expire: None,
        }
    }

    const fn inactive(rule: InactiveRule, should_expire: Option<ExpireReason>) -> Self {
        Self {
            active: false,
            rule: Some(rule),
            should_expire,
        }
    }
}

/// Checks whether `mandate` is active at instant `now`.
///
/// Rule order matches spec §4.4: terminal/suspended status first, then the
/// validity window, then the use budget.
#[must_use]
pub fn check_activity(mandate: &AutonomyMandate, now: Timestamp) -> ActivityOutcome {
    match mandate.status {
        MandateStatus::Expired => return ActivityOutcome::inactive(InactiveRule::StatusExpired, None),
        MandateStatus::Revoked => return ActivityOutcome::inactive(InactiveRule::StatusRevoked, None),
        MandateStatus::Suspended => {
            return ActivityOutcome::inactive(InactiveRule::StatusSuspended, None);
        }
        MandateStatus::Active => {}
    }

    if let Some(valid_from) = mandate.valid_from
        && now < valid_from
    {
        return ActivityOutcome::inactive(InactiveRule::NotYetActive, None);
    }

    if let Some(valid_until) = mandate.valid_until
        && now > valid_until
    {
        return ActivityOutcome::inactive(InactiveRule::TimeExpired, Some(ExpireReason::Time));
    }

    if mandate.uses_exhausted() {
        return ActivityOutcome::inactive(InactiveRule::UsesExhausted, Some(ExpireReason::Uses));
    }

    ActivityOutcome::active()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::identifiers::AgentId;
    use crate::entities::identifiers::MandateId;
    use crate::entities::protocol::RiskProfile;

    fn sample_mandate() -> AutonomyMandate {
        AutonomyMandate {
            id: MandateId::new("mandate-1"),
            agent_id: AgentId::new("agent-1"),
            mode: crate::entities::mandate::AutonomyMode::Autonomous,
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

    #[test]
    fn active_mandate_within_bounds_is_active() {
        let outcome = check_activity(&sample_mandate(), Timestamp::parse("2026-06-01T00:00:00Z").expect("parse"));
        assert!(outcome.active);
    }

    #[test]
    fn terminal_status_wins_before_window_checks() {
        let mut mandate = sample_mandate();
        mandate.status = MandateStatus::Revoked;
        let outcome = check_activity(&mandate, Timestamp::parse("2026-06-01T00:00:00Z").expect("parse"));
        assert_eq!(outcome.rule, Some(InactiveRule::StatusRevoked));
        assert_eq!(outcome.should_expire, None);
    }

    #[test]
    fn before_valid_from_is_not_yet_active() {
        let mut mandate = sample_mandate();
        mandate.valid_from = Some(Timestamp::parse("2026-06-01T00:00:00Z").expect("parse"));
        let outcome = check_activity(&mandate, Timestamp::parse("2026-01-01T00:00:00Z").expect("parse"));
        assert_eq!(outcome.rule, Some(InactiveRule::NotYetActive));
    }

    #[test]
    fn past_valid_until_expires_with_time_reason() {
        let mut mandate = sample_mandate();
        mandate.valid_until = Some(Timestamp::parse("2026-01-01T00:00:00Z").expect("parse"));
        let outcome = check_activity(&mandate, Timestamp::parse("2026-06-01T00:00:00Z").expect("parse"));
        assert_eq!(outcome.rule, Some(InactiveRule::TimeExpired));
        assert_eq!(outcome.should_expire, Some(ExpireReason::Time));
    }

    #[test]
    fn exhausted_uses_expires_with_uses_reason() {
        let mut mandate = sample_mandate();
        mandate.max_uses = Some(3);
        mandate.uses = 3;
        let outcome = check_activity(&mandate, Timestamp::parse("2026-06-01T00:00:00Z").expect("parse"));
        assert_eq!(outcome.rule, Some(InactiveRule::UsesExhausted));
        assert_eq!(outcome.should_expire, Some(ExpireReason::Uses));
    }
}
