//! Shared fixtures for govgate-store scenario tests.

use std::path::Path;
use std::sync::Arc;

use govgate_core::Orchestrator;
use govgate_core::ProtocolDraft;
use govgate_core::SystemClock;
use govgate_core::entities::protocol::Limit;
use govgate_core::entities::protocol::RiskProfile;
use govgate_core::entities::situation::AbsorptionCapacity;
use govgate_core::entities::situation::Alternative;
use govgate_core::entities::situation::Reversibility;
use govgate_core::entities::situation::Risk;
use govgate_core::entities::situation::Situation;
use govgate_core::entities::situation::SituationStatus;
use govgate_core::entities::situation::Urgency;
use govgate_core::entities::time::Timestamp;
use govgate_store::EventLogConfig;
use govgate_store::FileConsequenceRepository;
use govgate_store::FileContractRepository;
use govgate_store::FileDecisionRepository;
use govgate_store::FileEpisodeRepository;
use govgate_store::FileEventLogSink;
use govgate_store::FileMandateRepository;
use govgate_store::FileProtocolRepository;
use govgate_store::FileSituationRepository;

/// Builds an [`Orchestrator`] wired to file-backed repositories rooted at
/// `dir`, initialized and ready to drive a scenario.
pub fn orchestrator_at(dir: &Path) -> Orchestrator {
    let orchestrator = Orchestrator::new(
        Arc::new(FileSituationRepository::open(dir).expect("open situations")),
        Arc::new(FileEpisodeRepository::open(dir).expect("open episodes")),
        Arc::new(FileProtocolRepository::open(dir).expect("open protocols")),
        Arc::new(FileDecisionRepository::open(dir).expect("open decisions")),
        Arc::new(FileContractRepository::open(dir).expect("open contracts")),
        Arc::new(FileConsequenceRepository::open(dir).expect("open consequences")),
        Arc::new(FileMandateRepository::open(dir).expect("open mandates")),
        Arc::new(FileEventLogSink::open(dir, EventLogConfig::default()).expect("open event log")),
        Arc::new(SystemClock),
    );
    orchestrator.init();
    orchestrator
}

fn ts(text: &str) -> Timestamp {
    Timestamp::parse(text).expect("parse timestamp")
}

/// A minimal [`Situation`] that satisfies every Closed Layer rule: declares
/// a risk, two alternatives, and a non-blank relevant consequence.
pub fn passing_situation(id: &str) -> Situation {
    Situation {
        id: govgate_core::entities::identifiers::SituationId::new(id),
        domain: "payments".to_string(),
        context: "a vendor invoice needs approval".to_string(),
        objective: "approve or reject the invoice".to_string(),
        uncertainties: vec!["vendor solvency is unconfirmed".to_string()],
        alternatives: vec![
            Alternative {
                description: "approve the invoice".to_string(),
                associated_risks: vec!["overpayment".to_string()],
            },
            Alternative {
                description: "reject the invoice".to_string(),
                associated_risks: vec!["vendor relationship damage".to_string()],
            },
        ],
        risks: vec![Risk {
            description: "vendor may be insolvent".to_string(),
            kind: "financial".to_string(),
            reversibility: Reversibility::PartiallyReversible,
        }],
        urgency: Urgency::Medium,
        absorption_capacity: AbsorptionCapacity::Medium,
        relevant_consequence: "a wrongful payment cannot be easily recovered".to_string(),
        learning_possibility: true,
        declared_use_case: 1,
        status: SituationStatus::Draft,
        creation_time: ts("2026-01-01T00:00:00Z"),
        analysis_attachments: vec![],
    }
}

/// A [`ProtocolDraft`] that passes every Closed Layer rule against
/// [`passing_situation`]'s alternatives.
pub fn passing_draft() -> ProtocolDraft {
    ProtocolDraft {
        minimum_criteria: vec!["two independent approvals".to_string()],
        considered_risks: vec!["overpayment".to_string()],
        defined_limits: vec![Limit {
            kind: "amount".to_string(),
            description: "maximum payable amount".to_string(),
            value: "50000".to_string(),
        }],
        risk_profile: RiskProfile::Moderate,
        evaluated_alternatives: vec!["approve the invoice".to_string(), "reject the invoice".to_string()],
        chosen_alternative: "approve the invoice".to_string(),
        consulted_memory_ids: vec![],
        used_attachment_ids: vec![],
    }
}
