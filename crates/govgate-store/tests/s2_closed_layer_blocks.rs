//! S2: a situation with no declared risk is rejected by the Closed Layer,
//! and a decision can never be registered against a rejected protocol.

mod common;

use govgate_core::OrchestratorError;
use govgate_core::StoreError;
use govgate_core::DecisionInput;
use govgate_core::closed_layer::RULE_RISK_REQUIRED;
use govgate_core::entities::protocol::ProtocolState;
use govgate_core::entities::protocol::RiskProfile;

#[test]
fn situation_without_declared_risk_is_rejected_and_blocks_decision() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = common::orchestrator_at(dir.path());

    let mut situation = common::passing_situation("sit-2");
    situation.risks = vec![];
    situation.uncertainties = vec![];

    let episode = orchestrator.process_request("tester", situation).expect("process request");

    let protocol = orchestrator
        .build_protocol("tester", &episode.id, common::passing_draft())
        .expect("build protocol persists even when rejected");
    assert_eq!(protocol.state, ProtocolState::Rejected);
    assert_eq!(protocol.rejection_reason.is_some(), true);

    let err = orchestrator
        .register_decision(
            "tester",
            &episode.id,
            DecisionInput {
                chosen_alternative: "approve the invoice".to_string(),
                risk_profile: RiskProfile::Moderate,
                conditions: vec![],
                issued_to: "vendor-ops".to_string(),
                minimum_required_observations: vec![],
            },
        )
        .expect_err("a rejected protocol can never be decided on");
    assert!(matches!(err, OrchestratorError::Store(StoreError::State(_))));
}

#[test]
fn closed_layer_rule_id_is_risk_required_for_a_risk_free_situation() {
    use govgate_core::entities::situation::SituationStatus;

    let mut situation = common::passing_situation("sit-3");
    situation.risks = vec![];
    situation.uncertainties = vec![];
    situation.status = SituationStatus::UnderAnalysis;

    let draft = common::passing_draft();
    let protocol = govgate_core::entities::protocol::Protocol {
        id: govgate_core::entities::identifiers::ProtocolId::new("proto-probe"),
        episode_id: govgate_core::entities::identifiers::EpisodeId::new("ep-probe"),
        minimum_criteria: draft.minimum_criteria,
        considered_risks: draft.considered_risks,
        defined_limits: draft.defined_limits,
        risk_profile: draft.risk_profile,
        evaluated_alternatives: draft.evaluated_alternatives,
        chosen_alternative: draft.chosen_alternative,
        consulted_memory_ids: vec![],
        used_attachment_ids: vec![],
        state: ProtocolState::Validated,
        validated_at: situation.creation_time,
        validated_by: "tester".to_string(),
        rejection_reason: None,
    };
    let outcome = govgate_core::validate_closed_layer(&situation, &protocol);
    assert!(outcome.blocked);
    assert_eq!(outcome.rule_id, Some(RULE_RISK_REQUIRED));
}
