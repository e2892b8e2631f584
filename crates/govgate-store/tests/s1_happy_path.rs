//! S1: a situation moves straight through to an issued contract.

mod common;

use govgate_core::DecisionInput;
use govgate_core::entities::protocol::RiskProfile;
use govgate_core::entities::protocol::ProtocolState;

#[test]
fn situation_to_contract_happy_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = common::orchestrator_at(dir.path());

    let episode = orchestrator
        .process_request("tester", common::passing_situation("sit-1"))
        .expect("process request");

    let protocol = orchestrator
        .build_protocol("tester", &episode.id, common::passing_draft())
        .expect("build protocol");
    assert_eq!(protocol.state, ProtocolState::Validated);

    let contract = orchestrator
        .register_decision(
            "tester",
            &episode.id,
            DecisionInput {
                chosen_alternative: "approve the invoice".to_string(),
                risk_profile: RiskProfile::Moderate,
                conditions: vec!["finance sign-off recorded".to_string()],
                issued_to: "vendor-ops".to_string(),
                minimum_required_observations: vec!["payment_cleared".to_string()],
            },
        )
        .expect("register decision");

    assert_eq!(contract.authorized_alternative, "approve the invoice");
    assert_eq!(contract.issued_to, "vendor-ops");
    assert!(!orchestrator.is_degraded());

    let status = orchestrator.get_event_log_status().expect("status");
    assert!(status.entry_count >= 5);
    orchestrator.verify_event_log_now().expect("chain verifies");
}
