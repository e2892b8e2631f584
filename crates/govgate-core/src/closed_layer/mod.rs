// crates/govgate-core/src/closed_layer/mod.rs
// ============================================================================
// Module: Closed Layer
// Description: Five fixed, non-bypassable validation rules applied in order.
// Purpose: Implement spec §4.3 exactly as a pure function over owned inputs.
// Dependencies: crate::entities::{protocol, situation}
// ============================================================================

//! ## Overview
//! [`validate`] runs five rules in strict order and returns the *first*
//! failure. Rules are pure, deterministic, take defensive defaults on
//! missing fields, and never mutate their inputs. Rule ids are stable
//! strings because they appear in audit payloads — reordering them is a
//! breaking change for auditors who index on `rule_id` (spec §9).

use crate::entities::protocol::Protocol;
use crate::entities::protocol::RiskProfile;
use crate::entities::situation::Situation;

/// Stable rule id: `risks ∪ uncertainties` is empty.
pub const RULE_RISK_REQUIRED: &str = "RISK_REQUIRED";
/// Stable rule id: fewer than 2 alternatives.
pub const RULE_ALTERNATIVES_REQUIRED: &str = "ALTERNATIVES_REQUIRED";
/// Stable rule id: the protocol declares no limits.
pub const RULE_LIMITS_REQUIRED: &str = "LIMITS_REQUIRED";
/// Stable rule id: a `CONSERVATIVE` protocol declares no minimum criteria.
pub const RULE_CONSERVATIVE_NEEDS_CRITERIA: &str = "CONSERVATIVE_NEEDS_CRITERIA";
/// Stable rule id: the situation's relevant consequence is blank.
pub const RULE_CONSEQUENCE_REQUIRED: &str = "CONSEQUENCE_REQUIRED";

/// Outcome of running the Closed Layer against a situation/protocol pair.
///
/// # Invariants
/// - `blocked` is `false` exactly when `rule_id`/`reason` are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedLayerOutcome {
    /// Whether the pair was blocked by any rule.
    pub blocked: bool,
    /// The stable id of the first rule that blocked, if any.
    pub rule_id: Option<&'static str>,
    /// A human-readable reason for the block, if any.
    pub reason: Option<String>,
}

impl ClosedLayerOutcome {
    /// Returns the "not blocked" outcome.
    #[must_use]
    const fn pass() -> Self {
        Self {
            blocked: false,
            rule_id: None,
            reason: None,
        }
    }

    /// Returns a blocked outcome for the given rule.
    #[must_use]
    fn block(rule_id: &'static str, reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            rule_id: Some(rule_id),
            reason: Some(reason.into()),
        }
    }
}

/// Runs the five Closed Layer rules, in order, against `situation` and
/// `protocol`, returning the first failure (or a passing outcome).
#[must_use]
pub fn validate(situation: &Situation, protocol: &Protocol) -> ClosedLayerOutcome {
    if situation.has_no_declared_risk() {
        return ClosedLayerOutcome::block(
            RULE_RISK_REQUIRED,
            "situation declares no risks or uncertainties",
        );
    }

    if situation.alternatives.len() < 2 {
        return ClosedLayerOutcome::block(
            RULE_ALTERNATIVES_REQUIRED,
            "situation declares fewer than two alternatives",
        );
    }

    if protocol.defined_limits.is_empty() {
        return ClosedLayerOutcome::block(
            RULE_LIMITS_REQUIRED,
            "protocol declares no operational limits",
        );
    }

    if protocol.risk_profile == RiskProfile::Conservative && protocol.minimum_criteria.is_empty() {
        return ClosedLayerOutcome::block(
            RULE_CONSERVATIVE_NEEDS_CRITERIA,
            "conservative protocol declares no minimum criteria",
        );
    }

    if situation.relevant_consequence_is_blank() {
        return ClosedLayerOutcome::block(
            RULE_CONSEQUENCE_REQUIRED,
            "situation's relevant consequence is empty or blank",
        );
    }

    ClosedLayerOutcome::pass()
}
