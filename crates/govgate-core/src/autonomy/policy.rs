// crates/govgate-core/src/autonomy/policy.rs
// ============================================================================
// Module: Consequence Policy
// Description: Pure function mapping an observed consequence to a mandate
//              action.
// Purpose: Implement spec §4.4 "Consequence policy" exactly, first match
//          wins.
// Dependencies: none beyond std
// ============================================================================

//! ## Overview
//! The policy never touches a mandate or repository; it only classifies a
//! [`ConsequenceTrigger`] into a [`ConsequenceAction`]. Applying that action
//! is [`crate::autonomy::application::apply_consequence`]'s job.

/// Severity of an observed consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Default severity when unspecified.
    Low,
    /// Elevated but not acute.
    Medium,
    /// Serious; triggers degrade/flag rules when combined with other
    /// conditions.
    High,
    /// Maximal; unconditionally revokes the mandate.
    Critical,
}

/// Category of an observed consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A legal exposure.
    Legal,
    /// An ethical exposure.
    Ethical,
    /// Default category when unspecified or outside the named taxonomy.
    Other,
}

/// The trigger fields the consequence policy reasons over.
///
/// All fields default per spec §4.4 when the caller leaves them unspecified:
/// `severity = Low`, `category = Other`, `violated_limits = false`,
/// `reversible = true`, `relevant_loss = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsequenceTrigger {
    /// Severity of the consequence.
    pub severity: Severity,
    /// Category of the consequence.
    pub category: Category,
    /// Whether the contract's execution limits were violated.
    pub violated_limits: bool,
    /// Whether the consequence is reversible. Not consumed by any current
    /// rule, but carried through because it is part of the trigger shape.
    pub reversible: bool,
    /// Whether the consequence represents a relevant loss.
    pub relevant_loss: bool,
}

impl Default for ConsequenceTrigger {
    fn default() -> Self {
        Self {
            severity: Severity::Low,
            category: Category::Other,
            violated_limits: false,
            reversible: true,
            relevant_loss: false,
        }
    }
}

/// The action the consequence policy recommends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsequenceAction {
    /// Revoke the mandate outright and require human review.
    Revoke {
        /// Human-readable reason recorded on the revocation event.
        reason: String,
    },
    /// Suspend the mandate pending human review.
    Suspend {
        /// Human-readable reason recorded on the suspension event.
        reason: String,
    },
    /// Degrade the mandate's mode by one level.
    Degrade,
    /// Leave the mandate untouched but flag it for human review.
    FlagHumanReview,
    /// No action is warranted.
    NoAction,
}

/// Classifies `trigger` into a [`ConsequenceAction`], applying spec §4.4's
/// four rules in priority order.
#[must_use]
pub fn evaluate(trigger: &ConsequenceTrigger) -> ConsequenceAction {
    if trigger.severity == Severity::Critical {
        return ConsequenceAction::Revoke {
            reason: "critical-severity consequence".to_string(),
        };
    }

    if trigger.violated_limits {
        return ConsequenceAction::Suspend {
            reason: "contract execution limits violated".to_string(),
        };
    }

    if trigger.relevant_loss && matches!(trigger.severity, Severity::High | Severity::Critical) {
        return ConsequenceAction::Degrade;
    }

    if matches!(trigger.category, Category::Legal | Category::Ethical)
        && matches!(trigger.severity, Severity::High | Severity::Critical)
    {
        return ConsequenceAction::FlagHumanReview;
    }

    ConsequenceAction::NoAction
}
