// crates/govgate-core/src/orchestrator/mod.rs
// ============================================================================
// Module: Orchestrator
// Description: The single entry point driving Situation -> Episode ->
//              Protocol -> Decision -> Contract, plus the autonomy and audit
//              surfaces layered on top of it.
// Purpose: Implement C6 (multi-agent runner) and C7 (orchestrator) exactly.
// Dependencies: crate::{autonomy, closed_layer, entities::*, interfaces::*}
// ============================================================================

//! ## Overview
//! [`Orchestrator`] owns id generation, timestamping, and hash chaining
//! (spec §3 "Ownership"); repositories only own on-disk layout. Every
//! method that changes state emits a matching event log entry with a
//! stable `event_type` string; a failure to *write* that entry never aborts
//! the business operation — it is captured into
//! [`telemetry::DegradedRingBuffer`] instead (spec §7).

pub mod multi_agent;
pub mod telemetry;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_json::json;
use thiserror::Error;

use crate::autonomy::application;
use crate::autonomy::evaluator;
use crate::autonomy::evaluator::DenyReason;
use crate::autonomy::evaluator::EvaluationInput;
use crate::autonomy::evaluator::EvaluationResult;
use crate::autonomy::policy;
use crate::autonomy::policy::ConsequenceTrigger;
use crate::closed_layer;
use crate::entities::consequence::ConsequenceObservation;
use crate::entities::consequence::ObservedFacts;
use crate::entities::consequence::PerceivedOutcome;
use crate::entities::contract::Contract;
use crate::entities::decision::Decision;
use crate::entities::episode::Episode;
use crate::entities::episode::EpisodeState;
use crate::entities::event_log::EventLogEntry;
use crate::entities::identifiers::AgentId;
use crate::entities::identifiers::ContractId;
use crate::entities::identifiers::DecisionId;
use crate::entities::identifiers::EpisodeId;
use crate::entities::identifiers::MandateId;
use crate::entities::identifiers::ObservationId;
use crate::entities::identifiers::ProtocolId;
use crate::entities::identifiers::SituationId;
use crate::entities::mandate::AutonomyMandate;
use crate::entities::mandate::AutonomyMode;
use crate::entities::mandate::ExpireReason;
use crate::entities::mandate::MandateStatus;
use crate::entities::protocol::Limit;
use crate::entities::protocol::Protocol;
use crate::entities::protocol::ProtocolState;
use crate::entities::protocol::RiskProfile;
use crate::entities::situation::AnalysisAttachment;
use crate::entities::situation::AttachmentKind;
use crate::entities::situation::Situation;
use crate::entities::situation::SituationStatus;
use crate::entities::time::Timestamp;
use crate::interfaces::ChainVerificationReport;
use crate::interfaces::ConsequenceRepository;
use crate::interfaces::ContractRepository;
use crate::interfaces::DecisionRepository;
use crate::interfaces::EpisodeRepository;
use crate::interfaces::EventLogSink;
use crate::interfaces::EventLogStatus;
use crate::interfaces::ExportManifest;
use crate::interfaces::ExportRangeQuery;
use crate::interfaces::MandateRepository;
use crate::interfaces::ProtocolRepository;
use crate::interfaces::ReplaySummary;
use crate::interfaces::SituationRepository;
use crate::interfaces::StoreError;
use crate::orchestrator::multi_agent::AgentCandidate;
use crate::orchestrator::multi_agent::AgentProfile;
use crate::orchestrator::multi_agent::AggregationOutcome;
use crate::orchestrator::multi_agent::AggregationPolicy;
use crate::orchestrator::telemetry::DegradedRingBuffer;
use crate::orchestrator::telemetry::OrchestratorEvent;

/// Supplies wall-clock time to the orchestrator. Every other component in
/// this crate receives time as caller-supplied data, which keeps replay and
/// the pure validators deterministic; only this seam reads the clock.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(time::OffsetDateTime::now_utc())
    }
}

/// Errors the orchestrator can return, layered over [`StoreError`] with the
/// outcomes only the orchestrator itself can produce.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A repository or event log call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The Closed Layer blocked this operation.
    #[error("closed layer blocked: rule={rule_id} reason={reason}")]
    ClosedLayerBlocked {
        /// The stable rule id that blocked the operation.
        rule_id: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// The autonomy evaluator denied the requested action.
    #[error("autonomy denied: {reason:?}")]
    AutonomyDenied {
        /// The reason the evaluator denied the action.
        reason: DenyReason,
    },
    /// The caller-supplied decision input is inconsistent with its
    /// validated protocol.
    #[error("consistency check failed: {0}")]
    Consistency(String),
}

/// Draft fields for [`Orchestrator::build_protocol`].
#[derive(Debug, Clone)]
pub struct ProtocolDraft {
    /// Minimum criteria the decision must satisfy.
    pub minimum_criteria: Vec<String>,
    /// Risks explicitly considered when drafting.
    pub considered_risks: Vec<String>,
    /// Declared operational limits.
    pub defined_limits: Vec<Limit>,
    /// Declared risk appetite.
    pub risk_profile: RiskProfile,
    /// Alternatives evaluated while drafting.
    pub evaluated_alternatives: Vec<String>,
    /// The alternative chosen; must be a member of `evaluated_alternatives`.
    pub chosen_alternative: String,
    /// Ids of memory-query attachments consulted while drafting.
    pub consulted_memory_ids: Vec<String>,
    /// Ids of analysis attachments used while drafting.
    pub used_attachment_ids: Vec<String>,
}

/// Input fields for [`Orchestrator::register_decision`].
#[derive(Debug, Clone)]
pub struct DecisionInput {
    /// The alternative authorized; must equal the validated protocol's.
    pub chosen_alternative: String,
    /// The risk profile; must equal the validated protocol's.
    pub risk_profile: RiskProfile,
    /// Conditions attached to the decision.
    pub conditions: Vec<String>,
    /// Opaque caller-supplied recipient identifier for the contract.
    pub issued_to: String,
    /// The fixed observation fields a later `ConsequenceObservation` must
    /// evidence.
    pub minimum_required_observations: Vec<String>,
}

/// Input fields for [`Orchestrator::register_consequence`].
#[derive(Debug, Clone)]
pub struct ConsequenceInput {
    /// Observed facts.
    pub observed: ObservedFacts,
    /// Perceived outcome.
    pub perceived: PerceivedOutcome,
    /// Evidence strings supplied by the registering actor.
    pub minimum_evidences: Vec<String>,
    /// Prior observation this one follows up on, if any.
    pub prior_observation_id: Option<ObservationId>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// An autonomy trigger to run the consequence policy against, scoped to
    /// the agent whose active mandate should be affected.
    pub trigger: Option<(AgentId, ConsequenceTrigger)>,
}

/// Input fields for [`Orchestrator::grant_mandate`].
#[derive(Debug, Clone)]
pub struct MandateGrant {
    /// The agent this mandate is granted to.
    pub agent_id: AgentId,
    /// Degree of autonomy granted.
    pub mode: AutonomyMode,
    /// Policies the agent may invoke under this mandate.
    pub allowed_policies: Vec<String>,
    /// Maximum risk profile the agent may request.
    pub max_risk_profile: RiskProfile,
    /// Operational limits bounding the agent's actions.
    pub limits: Vec<Limit>,
    /// Phrases that, found in context (case-insensitive), force human
    /// review.
    pub human_trigger_phrases: Vec<String>,
    /// Domains the agent is restricted to, if any.
    pub allowed_domains: Vec<String>,
    /// Use cases the agent is restricted to, if any.
    pub allowed_use_cases: Vec<i64>,
    /// Optional start of the validity window.
    pub valid_from: Option<Timestamp>,
    /// Optional end of the validity window.
    pub valid_until: Option<Timestamp>,
    /// Optional maximum number of uses.
    pub max_uses: Option<u64>,
}

/// Input fields for [`Orchestrator::run_multi_agent_round`].
#[derive(Debug, Clone)]
pub struct MultiAgentRequest {
    /// The episode this round proposes candidates for.
    pub episode_id: EpisodeId,
    /// Participating agent profiles, in tie-break order.
    pub profiles: Vec<AgentProfile>,
    /// How to resolve disagreement among candidates.
    pub policy: AggregationPolicy,
    /// The shared alternative list every candidate picks from.
    pub evaluated_alternatives: Vec<String>,
    /// Minimum criteria shared by every candidate protocol.
    pub base_minimum_criteria: Vec<String>,
    /// Considered risks shared by every candidate protocol.
    pub base_considered_risks: Vec<String>,
    /// Operational limits shared by every candidate protocol.
    pub base_defined_limits: Vec<Limit>,
}

/// The single entry point driving the decision pipeline, the autonomy
/// subsystem, and the audit surface for one tenant's instance.
pub struct Orchestrator {
    situations: Arc<dyn SituationRepository + Send + Sync>,
    episodes: Arc<dyn EpisodeRepository + Send + Sync>,
    protocols: Arc<dyn ProtocolRepository + Send + Sync>,
    decisions: Arc<dyn DecisionRepository + Send + Sync>,
    contracts: Arc<dyn ContractRepository + Send + Sync>,
    consequences: Arc<dyn ConsequenceRepository + Send + Sync>,
    mandates: Arc<dyn MandateRepository + Send + Sync>,
    event_log: Arc<dyn EventLogSink + Send + Sync>,
    clock: Arc<dyn Clock>,
    degraded: AtomicBool,
    degraded_events: DegradedRingBuffer,
}

impl Orchestrator {
    /// Wires an orchestrator from its repositories, event log, and clock.
    #[allow(clippy::too_many_arguments, reason = "one field per repository mirrors the data model 1:1; a bundling struct would just move the same list")]
    #[must_use]
    pub fn new(
        situations: Arc<dyn SituationRepository + Send + Sync>,
        episodes: Arc<dyn EpisodeRepository + Send + Sync>,
        protocols: Arc<dyn ProtocolRepository + Send + Sync>,
        decisions: Arc<dyn DecisionRepository + Send + Sync>,
        contracts: Arc<dyn ContractRepository + Send + Sync>,
        consequences: Arc<dyn ConsequenceRepository + Send + Sync>,
        mandates: Arc<dyn MandateRepository + Send + Sync>,
        event_log: Arc<dyn EventLogSink + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            situations,
            episodes,
            protocols,
            decisions,
            contracts,
            consequences,
            mandates,
            event_log,
            clock,
            degraded: AtomicBool::new(false),
            degraded_events: DegradedRingBuffer::new(),
        }
    }

    /// Appends an event log entry; a write failure is captured into the
    /// degraded-status ring buffer rather than propagated.
    fn emit(&self, actor: &str, event_type: &str, entity_type: &str, entity_id: &str, payload: serde_json::Value) {
        let now = self.clock.now();
        if let Err(err) = self
            .event_log
            .append(actor, event_type, entity_type, entity_id, payload, now)
        {
            self.degraded_events.record(OrchestratorEvent {
                timestamp: now,
                event_type: event_type.to_string(),
                message: err.to_string(),
            });
        }
    }

    /// Runs boot-time chain verification from the most recent snapshot,
    /// marking the instance degraded (but still read-accessible) on
    /// failure rather than refusing to start.
    pub fn init(&self) {
        match self.event_log.verify_from_snapshot() {
            Ok(report) if !report.valid => {
                self.degraded.store(true, Ordering::SeqCst);
                self.degraded_events.record(OrchestratorEvent {
                    timestamp: self.clock.now(),
                    event_type: "EVENT_LOG_VERIFY".to_string(),
                    message: report.reason.unwrap_or_else(|| "chain verification failed".to_string()),
                });
            }
            Ok(_) => {}
            Err(err) => {
                self.degraded.store(true, Ordering::SeqCst);
                self.degraded_events.record(OrchestratorEvent {
                    timestamp: self.clock.now(),
                    event_type: "EVENT_LOG_VERIFY".to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    /// Returns whether boot-time verification found the event log corrupt.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Returns the current degraded-status ring buffer contents.
    #[must_use]
    pub fn degraded_entries(&self) -> Vec<OrchestratorEvent> {
        self.degraded_events.snapshot()
    }

    /// `ProcessRequest(situation)`: creates the situation, drives it
    /// `OPEN -> ACCEPTED -> UNDER_ANALYSIS`, and creates its episode.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] if the situation fails
    /// validation or a repository call fails.
    pub fn process_request(&self, actor: &str, situation: Situation) -> Result<Episode, OrchestratorError> {
        let created = self.situations.create(situation)?;
        self.emit(
            actor,
            "SITUATION_CREATED",
            "situation",
            created.id.as_str(),
            json!({"domain": created.domain, "objective": created.objective}),
        );

        let mut current = created;
        for target in [SituationStatus::Open, SituationStatus::Accepted, SituationStatus::UnderAnalysis] {
            current = self.situations.advance_status(&current.id, target)?;
            self.emit(
                actor,
                "SITUATION_STATUS_CHANGED",
                "situation",
                current.id.as_str(),
                json!({"to": status_label(target)}),
            );
        }

        let now = self.clock.now();
        let episode = Episode {
            id: EpisodeId::new(new_id()),
            use_case: current.declared_use_case,
            domain: current.domain.clone(),
            state: EpisodeState::Created,
            referenced_situation_id: current.id.clone(),
            created_at: now,
            decided_at: None,
            observation_started_at: None,
            closed_at: None,
        };
        let episode = self.episodes.create(episode)?;
        self.emit(
            actor,
            "EPISODE_CREATED",
            "episode",
            episode.id.as_str(),
            json!({"situation_id": current.id.as_str()}),
        );
        Ok(episode)
    }

    /// `ConsultMemory(situation_id, query)`: records a raw memory query and
    /// the ids it returned as an append-only attachment. Never ranks or
    /// recommends; the retrieval itself is an external collaborator's job.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::State`] if
    /// the situation is not `UNDER_ANALYSIS`.
    pub fn consult_memory(
        &self,
        actor: &str,
        situation_id: &SituationId,
        query: serde_json::Value,
        result_ids: Vec<String>,
    ) -> Result<Vec<String>, OrchestratorError> {
        let situation = self.situations.get(situation_id)?;
        if !matches!(situation.status, SituationStatus::UnderAnalysis) {
            return Err(StoreError::State(format!(
                "situation {situation_id} is not under analysis"
            ))
            .into());
        }

        let attachment = AnalysisAttachment {
            id: crate::entities::identifiers::AttachmentId::new(new_id()),
            kind: AttachmentKind::MemoryQuery,
            body: json!({"query": query, "result_ids": result_ids}),
            time: self.clock.now(),
        };
        self.situations.append_attachment(situation_id, attachment)?;
        self.emit(
            actor,
            "MEMORY_CONSULTED",
            "situation",
            situation_id.as_str(),
            json!({"result_ids": result_ids}),
        );
        Ok(result_ids)
    }

    /// `BuildProtocol(episode_id, draft)`: validates the draft against the
    /// episode/situation state, runs the Closed Layer, and persists the
    /// resulting `VALIDATED` or `REJECTED` protocol.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::State`] if
    /// the episode is not `CREATED` or the situation is not
    /// `UNDER_ANALYSIS`, or with [`StoreError::Validation`] if the draft is
    /// structurally invalid.
    pub fn build_protocol(
        &self,
        actor: &str,
        episode_id: &EpisodeId,
        draft: ProtocolDraft,
    ) -> Result<Protocol, OrchestratorError> {
        let episode = self.episodes.get(episode_id)?;
        if !matches!(episode.state, EpisodeState::Created) {
            return Err(StoreError::State(format!("episode {episode_id} is not CREATED")).into());
        }

        let situation = self.situations.get(&episode.referenced_situation_id)?;
        if !matches!(situation.status, SituationStatus::UnderAnalysis) {
            return Err(StoreError::State(format!(
                "situation {} is not under analysis",
                situation.id
            ))
            .into());
        }

        if self.protocols.get_by_episode(episode_id).is_ok() {
            return Err(StoreError::Validation(format!(
                "a protocol already exists for episode {episode_id}"
            ))
            .into());
        }

        if draft.evaluated_alternatives.is_empty() {
            return Err(StoreError::Validation("evaluated_alternatives must not be empty".to_string()).into());
        }
        if !draft.evaluated_alternatives.contains(&draft.chosen_alternative) {
            return Err(StoreError::Validation(
                "chosen_alternative must be a member of evaluated_alternatives".to_string(),
            )
            .into());
        }

        let known_memory_ids: std::collections::HashSet<&str> = situation
            .analysis_attachments
            .iter()
            .filter(|attachment| matches!(attachment.kind, AttachmentKind::MemoryQuery))
            .map(|attachment| attachment.id.as_str())
            .collect();
        for consulted_id in &draft.consulted_memory_ids {
            if !known_memory_ids.contains(consulted_id.as_str()) {
                return Err(StoreError::Validation(format!(
                    "consulted_memory_ids entry {consulted_id} was not previously recorded"
                ))
                .into());
            }
        }

        let now = self.clock.now();
        let mut candidate = Protocol {
            id: ProtocolId::new(new_id()),
            episode_id: episode_id.clone(),
            minimum_criteria: draft.minimum_criteria,
            considered_risks: draft.considered_risks,
            defined_limits: draft.defined_limits,
            risk_profile: draft.risk_profile,
            evaluated_alternatives: draft.evaluated_alternatives,
            chosen_alternative: draft.chosen_alternative,
            consulted_memory_ids: draft.consulted_memory_ids,
            used_attachment_ids: draft.used_attachment_ids,
            state: ProtocolState::Validated,
            validated_at: now,
            validated_by: actor.to_string(),
            rejection_reason: None,
        };

        let outcome = closed_layer::validate(&situation, &candidate);
        if outcome.blocked {
            candidate.state = ProtocolState::Rejected;
            candidate.rejection_reason = outcome.reason.clone();
        }

        let persisted = self.protocols.create(candidate)?;
        match persisted.state {
            ProtocolState::Validated => self.emit(
                actor,
                "PROTOCOL_VALIDATED",
                "protocol",
                persisted.id.as_str(),
                json!({"episode_id": episode_id.as_str()}),
            ),
            ProtocolState::Rejected => self.emit(
                actor,
                "PROTOCOL_REJECTED",
                "protocol",
                persisted.id.as_str(),
                json!({
                    "episode_id": episode_id.as_str(),
                    "rule_id": outcome.rule_id,
                    "reason": outcome.reason,
                }),
            ),
        }
        Ok(persisted)
    }

    /// `RegisterDecision(episode_id, input)`: re-runs the Closed Layer,
    /// checks consistency with the validated protocol, persists the
    /// decision, advances episode and situation to `DECIDED`, and issues
    /// the contract.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::ClosedLayerBlocked`] if the Closed
    /// Layer now blocks, [`OrchestratorError::Consistency`] if `input`
    /// disagrees with the validated protocol, or
    /// [`OrchestratorError::Store`] with [`StoreError::State`] if no
    /// `VALIDATED` protocol exists for the episode.
    pub fn register_decision(
        &self,
        actor: &str,
        episode_id: &EpisodeId,
        input: DecisionInput,
    ) -> Result<Contract, OrchestratorError> {
        let episode = self.episodes.get(episode_id)?;
        let protocol = self.protocols.get_by_episode(episode_id)?;
        if !matches!(protocol.state, ProtocolState::Validated) {
            return Err(StoreError::State(format!(
                "protocol for episode {episode_id} is not VALIDATED"
            ))
            .into());
        }

        let situation = self.situations.get(&episode.referenced_situation_id)?;
        let outcome = closed_layer::validate(&situation, &protocol);
        if outcome.blocked {
            self.emit(
                actor,
                "DECISION_BLOCKED",
                "episode",
                episode_id.as_str(),
                json!({"rule_id": outcome.rule_id, "reason": outcome.reason}),
            );
            return Err(OrchestratorError::ClosedLayerBlocked {
                rule_id: outcome.rule_id.unwrap_or("UNKNOWN_RULE"),
                reason: outcome.reason.unwrap_or_default(),
            });
        }

        if input.chosen_alternative != protocol.chosen_alternative || input.risk_profile != protocol.risk_profile {
            return Err(OrchestratorError::Consistency(
                "decision input does not match the validated protocol's alternative/risk_profile".to_string(),
            ));
        }

        let now = self.clock.now();
        let decision = Decision {
            id: DecisionId::new(new_id()),
            episode_id: episode_id.clone(),
            chosen_alternative: input.chosen_alternative,
            criteria: protocol.minimum_criteria.clone(),
            limits: protocol.defined_limits.clone(),
            conditions: input.conditions,
            risk_profile: input.risk_profile,
            decided_at: now,
        };
        let decision = self.decisions.create(decision)?;
        self.emit(
            actor,
            "DECISION_REGISTERED",
            "decision",
            decision.id.as_str(),
            json!({"episode_id": episode_id.as_str(), "chosen_alternative": decision.chosen_alternative}),
        );

        let episode = self.episodes.advance_state(episode_id, EpisodeState::Decided, now)?;
        self.emit(
            actor,
            "EPISODE_STATE_CHANGED",
            "episode",
            episode.id.as_str(),
            json!({"to": "decided"}),
        );

        let situation = self
            .situations
            .advance_status(&episode.referenced_situation_id, SituationStatus::Decided)?;
        self.emit(
            actor,
            "SITUATION_STATUS_CHANGED",
            "situation",
            situation.id.as_str(),
            json!({"to": "decided"}),
        );

        let contract = Contract {
            id: ContractId::new(new_id()),
            episode_id: episode_id.clone(),
            decision_id: decision.id.clone(),
            authorized_alternative: decision.chosen_alternative.clone(),
            execution_limits: decision.limits.clone(),
            mandatory_conditions: decision.conditions.clone(),
            minimum_required_observations: input.minimum_required_observations,
            issued_at: now,
            issued_to: input.issued_to,
        };
        let contract = self.contracts.create(contract)?;
        self.emit(
            actor,
            "CONTRACT_ISSUED",
            "contract",
            contract.id.as_str(),
            json!({"decision_id": decision.id.as_str()}),
        );
        Ok(contract)
    }

    /// `StartObservation(episode_id)`: advances episode and situation to
    /// `UNDER_OBSERVATION`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::State`] if
    /// the episode is not `DECIDED`.
    pub fn start_observation(&self, actor: &str, episode_id: &EpisodeId) -> Result<Episode, OrchestratorError> {
        let now = self.clock.now();
        let episode = self.episodes.advance_state(episode_id, EpisodeState::UnderObservation, now)?;
        self.emit(
            actor,
            "EPISODE_STATE_CHANGED",
            "episode",
            episode.id.as_str(),
            json!({"to": "under_observation"}),
        );
        let situation = self
            .situations
            .advance_status(&episode.referenced_situation_id, SituationStatus::UnderObservation)?;
        self.emit(
            actor,
            "SITUATION_STATUS_CHANGED",
            "situation",
            situation.id.as_str(),
            json!({"to": "under_observation"}),
        );
        Ok(episode)
    }

    /// `CloseEpisode(episode_id)`: advances episode and situation to the
    /// terminal `CLOSED` state.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::State`] if
    /// the episode's current state does not allow advancing to `CLOSED`.
    pub fn close_episode(&self, actor: &str, episode_id: &EpisodeId) -> Result<Episode, OrchestratorError> {
        let now = self.clock.now();
        let episode = self.episodes.advance_state(episode_id, EpisodeState::Closed, now)?;
        self.emit(
            actor,
            "EPISODE_STATE_CHANGED",
            "episode",
            episode.id.as_str(),
            json!({"to": "closed"}),
        );
        let situation = self
            .situations
            .advance_status(&episode.referenced_situation_id, SituationStatus::Closed)?;
        self.emit(
            actor,
            "SITUATION_STATUS_CHANGED",
            "situation",
            situation.id.as_str(),
            json!({"to": "closed"}),
        );
        Ok(episode)
    }

    /// `RegisterConsequence(contract_id, input)`: records an observation,
    /// enforcing the anti-fraud superset check, and — if `input.trigger`
    /// is set — runs the consequence policy against the named agent's
    /// active mandate and applies its effects.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::Validation`]
    /// if `minimum_evidences` does not cover the contract's required
    /// fields, or with [`StoreError::State`] if the episode is not in
    /// `DECIDED`/`UNDER_OBSERVATION`/`CLOSED`.
    pub fn register_consequence(
        &self,
        actor: &str,
        contract_id: &ContractId,
        input: ConsequenceInput,
    ) -> Result<ConsequenceObservation, OrchestratorError> {
        let contract = self.contracts.get(contract_id)?;
        let episode = self.episodes.get(&contract.episode_id)?;
        if !matches!(
            episode.state,
            EpisodeState::Decided | EpisodeState::UnderObservation | EpisodeState::Closed
        ) {
            return Err(StoreError::State(format!(
                "episode {} is not in DECIDED/UNDER_OBSERVATION/CLOSED",
                episode.id
            ))
            .into());
        }

        let observation = ConsequenceObservation {
            id: ObservationId::new(new_id()),
            contract_id: contract_id.clone(),
            episode_id: contract.episode_id.clone(),
            observed: input.observed,
            perceived: input.perceived,
            minimum_evidences: input.minimum_evidences,
            registered_by: actor.to_string(),
            registered_at: self.clock.now(),
            prior_observation_id: input.prior_observation_id,
            notes: input.notes,
        };
        if !observation.satisfies_minimum_evidences(&contract.minimum_required_observations) {
            return Err(StoreError::Validation(
                "minimum_evidences does not cover the contract's minimum_required_observations".to_string(),
            )
            .into());
        }

        let observation = self.consequences.create(observation)?;
        self.emit(
            actor,
            "CONSEQUENCE_REGISTERED",
            "observation",
            observation.id.as_str(),
            json!({"contract_id": contract_id.as_str()}),
        );

        if let Some((agent_id, trigger)) = input.trigger {
            let agent_mandates = self.mandates.list_by_agent(&agent_id)?;
            if let Some(mandate) = agent_mandates
                .into_iter()
                .find(|mandate| matches!(mandate.status, MandateStatus::Active))
            {
                let action = policy::evaluate(&trigger);
                let now = self.clock.now();
                application::apply_consequence(
                    self.mandates.as_ref(),
                    self.event_log.as_ref(),
                    &mandate,
                    &action,
                    &observation.id,
                    actor,
                    now,
                )?;
            }
        }

        Ok(observation)
    }

    /// `GrantMandate`: creates a new, active mandate.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] on a repository failure.
    pub fn grant_mandate(&self, actor: &str, grant: MandateGrant) -> Result<AutonomyMandate, OrchestratorError> {
        let now = self.clock.now();
        let mandate = AutonomyMandate {
            id: MandateId::new(new_id()),
            agent_id: grant.agent_id,
            mode: grant.mode,
            allowed_policies: grant.allowed_policies,
            max_risk_profile: grant.max_risk_profile,
            limits: grant.limits,
            human_trigger_phrases: grant.human_trigger_phrases,
            allowed_domains: grant.allowed_domains,
            allowed_use_cases: grant.allowed_use_cases,
            granted_by: actor.to_string(),
            granted_at: now,
            valid_from: grant.valid_from,
            valid_until: grant.valid_until,
            max_uses: grant.max_uses,
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
        };
        let mandate = self.mandates.create(mandate)?;
        self.emit(
            actor,
            "MANDATE_GRANTED",
            "mandate",
            mandate.id.as_str(),
            json!({"agent_id": mandate.agent_id.as_str(), "mode": mode_label(mandate.mode)}),
        );
        Ok(mandate)
    }

    /// `RevokeMandate`: revokes a mandate outright.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::State`] if
    /// the mandate is already terminal.
    pub fn revoke_mandate(
        &self,
        actor: &str,
        mandate_id: &MandateId,
        reason: &str,
    ) -> Result<AutonomyMandate, OrchestratorError> {
        let now = self.clock.now();
        let mandate = self.mandates.record_revocation(mandate_id, actor, reason, now)?;
        self.emit(
            actor,
            "MANDATE_REVOKED",
            "mandate",
            mandate.id.as_str(),
            json!({"reason": reason}),
        );
        Ok(mandate)
    }

    /// `EvaluateAutonomy`: runs the evaluator without side effects.
    #[must_use]
    pub fn evaluate_autonomy(&self, input: &EvaluationInput<'_>) -> EvaluationResult {
        evaluator::evaluate(input)
    }

    /// `VerifyAutonomyOrBlock`: evaluates autonomy and, on denial, records
    /// the denial event and — if the mandate should now expire — expires
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::AutonomyDenied`] when the evaluator
    /// denies the action.
    pub fn verify_autonomy_or_block(
        &self,
        actor: &str,
        input: &EvaluationInput<'_>,
    ) -> Result<AutonomyMode, OrchestratorError> {
        match evaluator::evaluate(input) {
            EvaluationResult::Allow { effective_mode } => Ok(effective_mode),
            EvaluationResult::Deny { reason } => {
                if let DenyReason::MandateInactive {
                    should_expire: Some(expire_reason),
                    ..
                } = reason
                    && let Some(mandate) = input.mandate
                {
                    let now = self.clock.now();
                    if let Ok(updated) = self.mandates.record_expiration(&mandate.id, expire_reason, now) {
                        self.emit(
                            actor,
                            "MANDATE_EXPIRED",
                            "mandate",
                            updated.id.as_str(),
                            json!({"reason": expire_reason_label(expire_reason)}),
                        );
                    }
                }
                self.emit(
                    actor,
                    "AUTONOMY_DENIED",
                    "agent",
                    input.agent_id.as_str(),
                    json!({"reason": format!("{reason:?}")}),
                );
                Err(OrchestratorError::AutonomyDenied { reason })
            }
        }
    }

    /// `ConsumeMandateUse`: atomically consumes one use of a mandate.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::State`] if
    /// the mandate is not active, or [`StoreError::Concurrency`] if a
    /// racing use already exhausted the budget.
    pub fn consume_mandate_use(&self, actor: &str, mandate_id: &MandateId) -> Result<AutonomyMandate, OrchestratorError> {
        let now = self.clock.now();
        let mandate = self.mandates.consume_use(mandate_id, now)?;
        self.emit(
            actor,
            "MANDATE_USE_CONSUMED",
            "mandate",
            mandate.id.as_str(),
            json!({"uses": mandate.uses}),
        );
        Ok(mandate)
    }

    /// `ExpireMandate(reason)`: expires a mandate, idempotently. Expiring
    /// an already-terminal mandate is a no-op and re-emits no event (spec
    /// §8 idempotence).
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] on a repository failure other
    /// than the already-terminal case, which is handled as a no-op.
    pub fn expire_mandate(
        &self,
        actor: &str,
        mandate_id: &MandateId,
        reason: ExpireReason,
    ) -> Result<AutonomyMandate, OrchestratorError> {
        let mandate = self.mandates.get(mandate_id)?;
        if matches!(mandate.status, MandateStatus::Expired | MandateStatus::Revoked) {
            return Ok(mandate);
        }
        let now = self.clock.now();
        let updated = self.mandates.record_expiration(mandate_id, reason, now)?;
        self.emit(
            actor,
            "MANDATE_EXPIRED",
            "mandate",
            updated.id.as_str(),
            json!({"reason": expire_reason_label(reason)}),
        );
        Ok(updated)
    }

    /// `ResumeMandate`: resumes a suspended mandate. Resuming a mandate
    /// that is not suspended is a no-op (spec §8 idempotence). Only a
    /// non-system actor may resume a mandate, and `reason` is required
    /// whenever the mandate was suspended by a triggering observation.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] wrapping [`StoreError::Validation`]
    /// if `actor` is `"system"` or a required reason is missing, or on a
    /// repository failure other than the not-suspended case, which is
    /// handled as a no-op.
    pub fn resume_mandate(
        &self,
        actor: &str,
        mandate_id: &MandateId,
        reason: Option<&str>,
    ) -> Result<AutonomyMandate, OrchestratorError> {
        if actor.eq_ignore_ascii_case("system") {
            return Err(OrchestratorError::Store(StoreError::Validation(
                "the system actor may not resume a mandate".to_string(),
            )));
        }
        let mandate = self.mandates.get(mandate_id)?;
        if !matches!(mandate.status, MandateStatus::Suspended) {
            return Ok(mandate);
        }
        let updated = self.mandates.record_resumption(mandate_id, reason)?;
        self.emit(
            actor,
            "MANDATE_RESUMED",
            "mandate",
            updated.id.as_str(),
            json!({"reason": reason}),
        );
        Ok(updated)
    }

    /// Runs one multi-agent aggregation round (C6): builds a candidate
    /// protocol per enabled agent, screens each through the Closed Layer,
    /// records `AGENT_PROTOCOL_PROPOSED`/`AGENT_DECISION_PROPOSED` audit
    /// events for every candidate, and aggregates under the requested
    /// policy. Only the caller-driven follow-up call to
    /// [`Orchestrator::register_decision`] with the selected candidate's
    /// alternative actually persists a `Decision`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] if the episode or its situation
    /// cannot be loaded.
    pub fn run_multi_agent_round(
        &self,
        actor: &str,
        request: MultiAgentRequest,
    ) -> Result<AggregationOutcome, OrchestratorError> {
        let episode = self.episodes.get(&request.episode_id)?;
        let situation = self.situations.get(&episode.referenced_situation_id)?;

        let mut candidates = Vec::with_capacity(request.profiles.len());
        for profile in request.profiles.iter().filter(|profile| profile.enabled) {
            let Some(alternative) =
                multi_agent::pick_alternative_for_profile(&request.evaluated_alternatives, profile.risk_profile)
            else {
                continue;
            };
            let alternative = alternative.clone();

            let candidate_protocol = Protocol {
                id: ProtocolId::new(new_id()),
                episode_id: request.episode_id.clone(),
                minimum_criteria: request.base_minimum_criteria.clone(),
                considered_risks: request.base_considered_risks.clone(),
                defined_limits: request.base_defined_limits.clone(),
                risk_profile: profile.risk_profile,
                evaluated_alternatives: request.evaluated_alternatives.clone(),
                chosen_alternative: alternative.clone(),
                consulted_memory_ids: vec![],
                used_attachment_ids: vec![],
                state: ProtocolState::Validated,
                validated_at: self.clock.now(),
                validated_by: profile.id.to_string(),
                rejection_reason: None,
            };
            let outcome = closed_layer::validate(&situation, &candidate_protocol);

            self.emit(
                actor,
                "AGENT_PROTOCOL_PROPOSED",
                "protocol",
                candidate_protocol.id.as_str(),
                json!({
                    "agent_id": profile.id.as_str(),
                    "alternative": alternative,
                    "blocked": outcome.blocked,
                    "rule_id": outcome.rule_id,
                }),
            );
            if !outcome.blocked {
                self.emit(
                    actor,
                    "AGENT_DECISION_PROPOSED",
                    "episode",
                    request.episode_id.as_str(),
                    json!({"agent_id": profile.id.as_str(), "alternative": alternative}),
                );
            }

            candidates.push(AgentCandidate {
                agent_id: profile.id.clone(),
                alternative,
                risk_profile: profile.risk_profile,
                blocked: outcome.blocked,
                block_rule_id: outcome.rule_id,
            });
        }

        Ok(multi_agent::aggregate(request.policy, &candidates, &request.profiles))
    }

    /// `ExportEventLogForAudit(range)`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] with [`StoreError::Capacity`]
    /// if the matching range exceeds the configured export cap.
    pub fn export_event_log_for_audit(
        &self,
        query: ExportRangeQuery,
    ) -> Result<(Vec<EventLogEntry>, ExportManifest), OrchestratorError> {
        Ok(self.event_log.export_range(query)?)
    }

    /// `ReplayEventLog`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] on an I/O failure reading a
    /// segment. A chain that exceeds the configured replay cap is not an
    /// error: it comes back as `ReplaySummary { truncated: true, .. }`.
    pub fn replay_event_log(&self) -> Result<ReplaySummary, OrchestratorError> {
        Ok(self.event_log.replay()?)
    }

    /// `VerifyEventLogNow`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] on an I/O failure reading a
    /// segment. A broken chain is not an error: it comes back as
    /// `ChainVerificationReport { valid: false, .. }`.
    pub fn verify_event_log_now(&self) -> Result<ChainVerificationReport, OrchestratorError> {
        Ok(self.event_log.verify_chain()?)
    }

    /// `GetEventLogStatus`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] on an I/O failure.
    pub fn get_event_log_status(&self) -> Result<EventLogStatus, OrchestratorError> {
        Ok(self.event_log.status()?)
    }
}

/// Generates a fresh, globally unique identifier string.
fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Stable label used in `SITUATION_STATUS_CHANGED` event payloads.
const fn status_label(status: SituationStatus) -> &'static str {
    match status {
        SituationStatus::Draft => "draft",
        SituationStatus::Open => "open",
        SituationStatus::Accepted => "accepted",
        SituationStatus::UnderAnalysis => "under_analysis",
        SituationStatus::Decided => "decided",
        SituationStatus::UnderObservation => "under_observation",
        SituationStatus::Closed => "closed",
    }
}

/// Stable label used in mandate event payloads.
const fn mode_label(mode: AutonomyMode) -> &'static str {
    match mode {
        AutonomyMode::Teaching => "teaching",
        AutonomyMode::Assisted => "assisted",
        AutonomyMode::Autonomous => "autonomous",
    }
}

/// Stable label used in `MANDATE_EXPIRED` event payloads.
const fn expire_reason_label(reason: ExpireReason) -> &'static str {
    match reason {
        ExpireReason::Time => "time",
        ExpireReason::Uses => "uses",
    }
}
