// crates/govgate-core/src/autonomy/evaluator.rs
// ============================================================================
// Module: Autonomy Evaluator
// Description: Pure function deciding whether an agent may act autonomously.
// Purpose: Implement spec §4.4 "Evaluator" rule chain exactly, first-failure
//          wins.
// Dependencies: crate::{autonomy::activity, closed_layer, entities::*}
// ============================================================================

//! ## Overview
//! [`evaluate`] takes an [`EvaluationInput`] built by the orchestrator from
//! already-loaded entities (it never reads storage itself) and returns an
//! [`EvaluationResult`]. The eleven rules run in the fixed order named by
//! spec §4.4; the first one that fails short-circuits the rest.

use crate::autonomy::activity::InactiveRule;
use crate::autonomy::activity::check_activity;
use crate::closed_layer::ClosedLayerOutcome;
use crate::entities::identifiers::AgentId;
use crate::entities::mandate::AutonomyMandate;
use crate::entities::mandate::AutonomyMode;
use crate::entities::mandate::ExpireReason;
use crate::entities::mandate::MandateStatus;
use crate::entities::protocol::RiskProfile;
use crate::entities::time::Timestamp;

/// Why the evaluator denied a requested autonomous action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Rule 1: the Closed Layer already blocked this situation/protocol.
    ClosedLayerBlocked,
    /// Rule 2: the caller explicitly requested a non-teaching mode the
    /// mandate does not authorize.
    RequestedModeNotAuthorized,
    /// Rules 2/3: the mandate is suspended pending human review.
    RequiresHumanReview,
    /// Rule 4: the mandate exists but fails the activity check.
    MandateInactive {
        /// The specific activity rule that failed.
        rule: InactiveRule,
        /// The expire reason to record, if the mandate should now be
        /// transitioned to `expired`.
        should_expire: Option<ExpireReason>,
    },
    /// Rule 5: the effective mode is `teaching`, which always blocks.
    TeachingAlwaysBlocks,
    /// Rule 6: no mandate was supplied and the effective mode is not
    /// `teaching`.
    MandateRequired,
    /// Rule 7: the requested policy is not in the mandate's allow list.
    PolicyNotAllowed,
    /// Rule 8: the requested risk profile exceeds the mandate's ceiling.
    RiskProfileExceedsMandate,
    /// Rule 9: the domain restriction is not satisfied.
    DomainNotAllowed,
    /// Rule 9: the use-case restriction is not satisfied.
    UseCaseNotAllowed,
    /// Rule 10: a human trigger phrase matched the supplied context.
    HumanTriggerMatched,
}

/// Outcome of evaluating a requested autonomous action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationResult {
    /// The action is allowed under `effective_mode`.
    Allow {
        /// The mode under which the action is authorized.
        effective_mode: AutonomyMode,
    },
    /// The action is denied.
    Deny {
        /// The reason for denial.
        reason: DenyReason,
    },
}

/// Input to [`evaluate`], assembled by the orchestrator from already-loaded
/// entities. Carries no references to storage.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// The agent requesting to act.
    pub agent_id: &'a AgentId,
    /// The policy the agent is requesting to invoke.
    pub requested_policy: &'a str,
    /// The risk profile the agent is requesting.
    pub requested_risk_profile: RiskProfile,
    /// The Closed Layer's outcome for the situation/protocol in play.
    pub closed_layer_result: &'a ClosedLayerOutcome,
    /// The agent's mandate, if one has been granted.
    pub mandate: Option<&'a AutonomyMandate>,
    /// The domain of the situation in play, if domain restrictions apply.
    pub domain: Option<&'a str>,
    /// The declared use case of the situation in play, if restrictions
    /// apply.
    pub use_case: Option<i64>,
    /// Free-form context to scan for human trigger phrases.
    pub context: Option<&'a str>,
    /// A mode the caller explicitly requested, if any.
    pub requested_mode: Option<AutonomyMode>,
    /// The current instant, used by the activity check.
    pub now: Timestamp,
}

/// Evaluates whether the action described by `input` is authorized.
#[must_use]
pub fn evaluate(input: &EvaluationInput<'_>) -> EvaluationResult {
    if input.closed_layer_result.blocked {
        return EvaluationResult::Deny {
            reason: DenyReason::ClosedLayerBlocked,
        };
    }

    if let Some(requested_mode) = input.requested_mode
        && requested_mode != AutonomyMode::Teaching
    {
        let authorized = input.mandate.is_some_and(|mandate| {
            matches!(mandate.status, MandateStatus::Active) && mandate.mode == requested_mode
        });
        if !authorized {
            return EvaluationResult::Deny {
                reason: DenyReason::RequestedModeNotAuthorized,
            };
        }
    }

    if let Some(mandate) = input.mandate
        && matches!(mandate.status, MandateStatus::Suspended)
    {
        return EvaluationResult::Deny {
            reason: DenyReason::RequiresHumanReview,
        };
    }

    if let Some(mandate) = input.mandate {
        let activity = check_activity(mandate, input.now);
        if !activity.active {
            return EvaluationResult::Deny {
                reason: DenyReason::MandateInactive {
                    rule: activity
                        .rule
                        .unwrap_or(crate::autonomy::activity::InactiveRule::StatusRevoked),
                    should_expire: activity.should_expire,
                },
            };
        }
    }

    let effective_mode = input.mandate.map_or(AutonomyMode::Teaching, |mandate| mandate.mode);
    if effective_mode == AutonomyMode::Teaching {
        return EvaluationResult::Deny {
            reason: DenyReason::TeachingAlwaysBlocks,
        };
    }

    let Some(mandate) = input.mandate else {
        return EvaluationResult::Deny {
            reason: DenyReason::MandateRequired,
        };
    };

    if !mandate.allows_policy(input.requested_policy) {
        return EvaluationResult::Deny {
            reason: DenyReason::PolicyNotAllowed,
        };
    }

    if input.requested_risk_profile > mandate.max_risk_profile {
        return EvaluationResult::Deny {
            reason: DenyReason::RiskProfileExceedsMandate,
        };
    }

    if let Some(domain) = input.domain
        && !mandate.allows_domain(domain)
    {
        return EvaluationResult::Deny {
            reason: DenyReason::DomainNotAllowed,
        };
    }

    if let Some(use_case) = input.use_case
        && !mandate.allows_use_case(use_case)
    {
        return EvaluationResult::Deny {
            reason: DenyReason::UseCaseNotAllowed,
        };
    }

    if let Some(context) = input.context
        && mandate.matches_human_trigger(context)
    {
        return EvaluationResult::Deny {
            reason: DenyReason::HumanTriggerMatched,
        };
    }

    EvaluationResult::Allow { effective_mode }
}
