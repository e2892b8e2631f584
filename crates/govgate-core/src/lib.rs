// crates/govgate-core/src/lib.rs
// ============================================================================
// Module: Governed Decision Engine Core Library
// Description: Public API surface for the governed decision-orchestration
//              engine's core.
// Purpose: Expose entities, pure validators, repository interfaces, and the
//          orchestrator that ties them together.
// Dependencies: crate::{entities, closed_layer, autonomy, interfaces,
//                orchestrator, dashboards, hashing}
// ============================================================================

//! ## Overview
//! This crate is backend-agnostic: it defines the data model, the pure
//! validation/evaluation rules (Closed Layer, autonomy evaluator,
//! consequence policy), the multi-agent runner, and the [`Orchestrator`]
//! that drives state transitions and audit events — all against the
//! [`interfaces`] traits. Concrete storage, tenancy, and configuration live
//! in their own crates (`govgate-store`, `govgate-tenant`,
//! `govgate-config`) and implement these traits rather than this crate
//! depending on them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod autonomy;
pub mod closed_layer;
pub mod dashboards;
pub mod entities;
pub mod hashing;
pub mod interfaces;
pub mod orchestrator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use autonomy::activity;
pub use autonomy::application;
pub use autonomy::evaluator;
pub use autonomy::policy;
pub use closed_layer::ClosedLayerOutcome;
pub use closed_layer::validate as validate_closed_layer;
pub use dashboards::EpisodeCounts;
pub use dashboards::TenantDashboard;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use interfaces::ConsequenceRepository;
pub use interfaces::ContractRepository;
pub use interfaces::DecisionRepository;
pub use interfaces::EpisodeRepository;
pub use interfaces::EventLogSink;
pub use interfaces::EventLogStatus;
pub use interfaces::MandateRepository;
pub use interfaces::ProtocolRepository;
pub use interfaces::SituationRepository;
pub use interfaces::StoreError;
pub use orchestrator::Clock;
pub use orchestrator::ConsequenceInput;
pub use orchestrator::DecisionInput;
pub use orchestrator::MandateGrant;
pub use orchestrator::MultiAgentRequest;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorError;
pub use orchestrator::ProtocolDraft;
pub use orchestrator::SystemClock;
pub use orchestrator::multi_agent::AgentCandidate;
pub use orchestrator::multi_agent::AgentProfile;
pub use orchestrator::multi_agent::AggregationOutcome;
pub use orchestrator::multi_agent::AggregationPolicy;
pub use orchestrator::telemetry::DegradedRingBuffer;
pub use orchestrator::telemetry::OrchestratorEvent;
