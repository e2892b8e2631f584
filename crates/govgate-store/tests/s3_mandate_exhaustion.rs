//! S3: a mandate's use budget is consumed atomically and exhausts exactly
//! at `max_uses`.

mod common;

use govgate_core::MandateGrant;
use govgate_core::OrchestratorError;
use govgate_core::StoreError;
use govgate_core::entities::identifiers::AgentId;
use govgate_core::entities::mandate::AutonomyMode;
use govgate_core::entities::mandate::MandateStatus;
use govgate_core::entities::protocol::RiskProfile;

fn grant(orchestrator: &govgate_core::Orchestrator, max_uses: u64) -> govgate_core::entities::mandate::AutonomyMandate {
    orchestrator
        .grant_mandate(
            "tester",
            MandateGrant {
                agent_id: AgentId::new("agent-1"),
                mode: AutonomyMode::Assisted,
                allowed_policies: vec!["approve-invoice".to_string()],
                max_risk_profile: RiskProfile::Moderate,
                limits: vec![],
                human_trigger_phrases: vec![],
                allowed_domains: vec![],
                allowed_use_cases: vec![],
                valid_from: None,
                valid_until: None,
                max_uses: Some(max_uses),
            },
        )
        .expect("grant mandate")
}

#[test]
fn consuming_the_budget_exhausts_the_mandate_exactly_at_max_uses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = common::orchestrator_at(dir.path());
    let mandate = grant(&orchestrator, 2);

    let updated = orchestrator
        .consume_mandate_use("tester", &mandate.id)
        .expect("first use");
    assert_eq!(updated.uses, 1);
    assert_eq!(updated.status, MandateStatus::Active);

    let updated = orchestrator
        .consume_mandate_use("tester", &mandate.id)
        .expect("second use reaches max_uses");
    assert_eq!(updated.uses, 2);
    assert_eq!(updated.status, MandateStatus::Expired);
}

#[test]
fn a_use_past_the_exhausted_budget_is_a_concurrency_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = common::orchestrator_at(dir.path());
    let mandate = grant(&orchestrator, 1);

    orchestrator
        .consume_mandate_use("tester", &mandate.id)
        .expect("the single allotted use");

    let err = orchestrator
        .consume_mandate_use("tester", &mandate.id)
        .expect_err("budget already exhausted");
    assert!(matches!(err, OrchestratorError::Store(StoreError::Concurrency(_))));
}
