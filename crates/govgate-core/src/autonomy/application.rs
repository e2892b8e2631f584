// crates/govgate-core/src/autonomy/application.rs
// ============================================================================
// Module: Consequence Application Service
// Description: Applies a consequence-policy decision to a mandate, writing
//              matching event-log entries.
// Purpose: Implement spec §4.4 "Application service" exactly, including its
//          idempotence guarantee.
// Dependencies: crate::{autonomy::policy, entities::*, interfaces::*}
// ============================================================================

//! ## Overview
//! Unlike [`crate::autonomy::evaluator`] and [`crate::autonomy::policy`],
//! this module is effectful: it calls the mandate repository's narrow
//! mutators and appends event log entries. Re-applying the same
//! `observation_id` to a mandate already in a terminal state (`revoked` or
//! `expired`) is a no-op, which makes retried consequence registration safe.

use serde_json::json;

use crate::autonomy::policy::ConsequenceAction;
use crate::entities::identifiers::ObservationId;
use crate::entities::mandate::AutonomyMandate;
use crate::entities::mandate::AutonomyMode;
use crate::entities::mandate::MandateStatus;
use crate::entities::time::Timestamp;
use crate::interfaces::EventLogSink;
use crate::interfaces::MandateRepository;
use crate::interfaces::StoreError;

/// Event type recorded when a consequence revokes a mandate.
pub const EVENT_AUTONOMY_REVOKED_BY_CONSEQUENCE: &str = "AUTONOMY_REVOKED_BY_CONSEQUENCE";
/// Event type recorded when a consequence suspends a mandate.
pub const EVENT_AUTONOMY_SUSPENDED: &str = "AUTONOMY_SUSPENDED";
/// Event type recorded when a consequence degrades a mandate's mode.
pub const EVENT_AUTONOMY_DEGRADED: &str = "AUTONOMY_DEGRADED";
/// Event type recorded when a consequence flags a mandate for human review
/// without otherwise changing it.
pub const EVENT_AUTONOMY_HUMAN_REVIEW_FLAGGED: &str = "AUTONOMY_HUMAN_REVIEW_FLAGGED";

/// Applies `action` to `mandate` via `mandate_repo`, logging the effect to
/// `event_log`. Returns the mandate's state after the action (unchanged if
/// the call was a no-op).
///
/// # Errors
///
/// Returns [`StoreError`] if the underlying repository or event log call
/// fails. A mandate already in a terminal state is never an error: it
/// short-circuits to a no-op instead.
#[allow(clippy::too_many_arguments, reason = "application-service entry point mirrors the orchestrator's call shape")]
pub fn apply_consequence(
    mandate_repo: &dyn MandateRepository,
    event_log: &dyn EventLogSink,
    mandate: &AutonomyMandate,
    action: &ConsequenceAction,
    observation_id: &ObservationId,
    actor: &str,
    at: Timestamp,
) -> Result<AutonomyMandate, StoreError> {
    if matches!(mandate.status, MandateStatus::Revoked | MandateStatus::Expired) {
        return Ok(mandate.clone());
    }

    match action {
        ConsequenceAction::Revoke { reason } => {
            let updated = mandate_repo.record_revocation(&mandate.id, actor, reason, at)?;
            event_log.append(
                actor,
                EVENT_AUTONOMY_REVOKED_BY_CONSEQUENCE,
                "mandate",
                mandate.id.as_str(),
                json!({
                    "mandate_id": mandate.id.as_str(),
                    "agent_id": mandate.agent_id.as_str(),
                    "observation_id": observation_id.as_str(),
                    "reason": reason,
                }),
                at,
            )?;
            Ok(updated)
        }
        ConsequenceAction::Suspend { reason } => {
            if matches!(mandate.status, MandateStatus::Suspended)
                && mandate.triggered_by_observation_id.as_ref() == Some(observation_id)
            {
                return Ok(mandate.clone());
            }
            let updated = mandate_repo.record_suspension(
                &mandate.id,
                reason,
                Some(observation_id.clone()),
                at,
            )?;
            event_log.append(
                actor,
                EVENT_AUTONOMY_SUSPENDED,
                "mandate",
                mandate.id.as_str(),
                json!({
                    "mandate_id": mandate.id.as_str(),
                    "agent_id": mandate.agent_id.as_str(),
                    "observation_id": observation_id.as_str(),
                    "reason": reason,
                    "suspended_at": at.to_rfc3339().unwrap_or_default(),
                }),
                at,
            )?;
            Ok(updated)
        }
        ConsequenceAction::Degrade => {
            let new_mode = mandate.mode.degrade();
            if new_mode == mandate.mode {
                return Ok(mandate.clone());
            }
            event_log.append(
                actor,
                EVENT_AUTONOMY_DEGRADED,
                "mandate",
                mandate.id.as_str(),
                json!({
                    "mandate_id": mandate.id.as_str(),
                    "agent_id": mandate.agent_id.as_str(),
                    "observation_id": observation_id.as_str(),
                    "from_mode": mode_label(mandate.mode),
                    "to_mode": mode_label(new_mode),
                }),
                at,
            )?;
            mandate_repo.record_mode_degradation(&mandate.id)
        }
        ConsequenceAction::FlagHumanReview => {
            event_log.append(
                actor,
                EVENT_AUTONOMY_HUMAN_REVIEW_FLAGGED,
                "mandate",
                mandate.id.as_str(),
                json!({
                    "mandate_id": mandate.id.as_str(),
                    "agent_id": mandate.agent_id.as_str(),
                    "observation_id": observation_id.as_str(),
                }),
                at,
            )?;
            Ok(mandate.clone())
        }
        ConsequenceAction::NoAction => Ok(mandate.clone()),
    }
}

/// Stable label for the `from_mode`/`to_mode` event payload fields.
const fn mode_label(mode: AutonomyMode) -> &'static str {
    match mode {
        AutonomyMode::Teaching => "teaching",
        AutonomyMode::Assisted => "assisted",
        AutonomyMode::Autonomous => "autonomous",
    }
}
