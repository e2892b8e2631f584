// crates/govgate-store/src/repository.rs
// ============================================================================
// Module: File-Based Entity Repositories
// Description: One flat JSON file per entity family, atomically rewritten
//              in full on every mutation, indexed in memory for lookups.
// Purpose: Implement every `govgate_core::interfaces` repository trait
//          against the tenant's flat-file data directory (spec §4.1).
// Dependencies: govgate_core::{entities, interfaces}, crate::fs_util
// ============================================================================

//! ## Overview
//! Each repository wraps a `Mutex<Vec<T>>` loaded once from its backing file
//! and rewritten in full (via [`crate::fs_util::write_json_atomically`]) on
//! every mutating call. The mutex stands in for the per-repository FIFO
//! write lock named in spec §4.1/§5: a single `std::sync::Mutex` already
//! serializes writers in arrival order, and reads never block because they
//! only need a momentary lock to clone the in-memory vector.
//!
//! This is not the representation a high-throughput production deployment
//! would choose for entity families that grow without bound, but it matches
//! the append-only, no-`update`/no-`delete` contract the traits expose and
//! keeps one file per entity family human-readable, which spec §4.1 asks
//! for directly ("one flat file per entity family").

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use govgate_core::entities::consequence::ConsequenceObservation;
use govgate_core::entities::contract::Contract;
use govgate_core::entities::decision::Decision;
use govgate_core::entities::episode::Episode;
use govgate_core::entities::episode::EpisodeState;
use govgate_core::entities::identifiers::AgentId;
use govgate_core::entities::identifiers::ContractId;
use govgate_core::entities::identifiers::DecisionId;
use govgate_core::entities::identifiers::EpisodeId;
use govgate_core::entities::identifiers::MandateId;
use govgate_core::entities::identifiers::ObservationId;
use govgate_core::entities::identifiers::ProtocolId;
use govgate_core::entities::identifiers::SituationId;
use govgate_core::entities::mandate::AutonomyMandate;
use govgate_core::entities::mandate::ExpireReason;
use govgate_core::entities::mandate::MandateStatus;
use govgate_core::entities::protocol::Protocol;
use govgate_core::entities::situation::AnalysisAttachment;
use govgate_core::entities::situation::Situation;
use govgate_core::entities::situation::SituationStatus;
use govgate_core::entities::time::Timestamp;
use govgate_core::{
    ConsequenceRepository, ContractRepository, DecisionRepository, EpisodeRepository,
    MandateRepository, ProtocolRepository, SituationRepository, StoreError,
};

use crate::fs_util;

/// Locks `mutex`, mapping a poisoned lock to [`StoreError::Fatal`].
fn lock<T>(mutex: &Mutex<Vec<T>>) -> Result<std::sync::MutexGuard<'_, Vec<T>>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Fatal("repository mutex poisoned".to_string()))
}

/// File-backed [`Situation`] repository.
pub struct FileSituationRepository {
    path: PathBuf,
    rows: Mutex<Vec<Situation>>,
}

impl FileSituationRepository {
    /// Opens (or creates) the situation table at `data_dir/situations.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("situations.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }
}

impl SituationRepository for FileSituationRepository {
    fn create(&self, situation: Situation) -> Result<Situation, StoreError> {
        if situation.id.as_str().is_empty() {
            return Err(StoreError::Validation("situation id must not be empty".to_string()));
        }
        let mut rows = lock(&self.rows)?;
        rows.push(situation.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(situation)
    }

    fn get(&self, id: &SituationId) -> Result<Situation, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("situation {id}")))
    }

    fn list(&self) -> Result<Vec<Situation>, StoreError> {
        Ok(lock(&self.rows)?.clone())
    }

    fn append_attachment(
        &self,
        id: &SituationId,
        attachment: AnalysisAttachment,
    ) -> Result<Situation, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("situation {id}")))?;
        row.analysis_attachments.push(attachment);
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn advance_status(&self, id: &SituationId, to: SituationStatus) -> Result<Situation, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("situation {id}")))?;
        if !row.status.allows_transition_to(to) {
            return Err(StoreError::State(format!(
                "situation {id} cannot move from {:?} to {to:?}",
                row.status
            )));
        }
        row.status = to;
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }
}

/// File-backed [`Episode`] repository.
pub struct FileEpisodeRepository {
    path: PathBuf,
    rows: Mutex<Vec<Episode>>,
}

impl FileEpisodeRepository {
    /// Opens (or creates) the episode table at `data_dir/episodes.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("episodes.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }
}

impl EpisodeRepository for FileEpisodeRepository {
    fn create(&self, episode: Episode) -> Result<Episode, StoreError> {
        let mut rows = lock(&self.rows)?;
        if rows.iter().any(|row| row.referenced_situation_id == episode.referenced_situation_id) {
            return Err(StoreError::Validation(format!(
                "episode already exists for situation {}",
                episode.referenced_situation_id
            )));
        }
        rows.push(episode.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(episode)
    }

    fn get(&self, id: &EpisodeId) -> Result<Episode, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("episode {id}")))
    }

    fn get_by_situation(&self, situation_id: &SituationId) -> Result<Episode, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.referenced_situation_id == situation_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("episode for situation {situation_id}")))
    }

    fn list(&self) -> Result<Vec<Episode>, StoreError> {
        Ok(lock(&self.rows)?.clone())
    }

    fn advance_state(&self, id: &EpisodeId, to: EpisodeState, at: Timestamp) -> Result<Episode, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("episode {id}")))?;
        if !row.state.allows_transition_to(to) {
            return Err(StoreError::State(format!(
                "episode {id} cannot move from {:?} to {to:?}",
                row.state
            )));
        }
        row.state = to;
        match to {
            EpisodeState::Decided => row.decided_at = Some(at),
            EpisodeState::UnderObservation => row.observation_started_at = Some(at),
            EpisodeState::Closed => row.closed_at = Some(at),
            EpisodeState::Created => {}
        }
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }
}

/// File-backed [`Protocol`] repository.
pub struct FileProtocolRepository {
    path: PathBuf,
    rows: Mutex<Vec<Protocol>>,
}

impl FileProtocolRepository {
    /// Opens (or creates) the protocol table at `data_dir/protocols.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("protocols.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }
}

impl ProtocolRepository for FileProtocolRepository {
    fn create(&self, protocol: Protocol) -> Result<Protocol, StoreError> {
        let mut rows = lock(&self.rows)?;
        if rows.iter().any(|row| row.episode_id == protocol.episode_id) {
            return Err(StoreError::Validation(format!(
                "protocol already exists for episode {}",
                protocol.episode_id
            )));
        }
        rows.push(protocol.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(protocol)
    }

    fn get(&self, id: &ProtocolId) -> Result<Protocol, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("protocol {id}")))
    }

    fn get_by_episode(&self, episode_id: &EpisodeId) -> Result<Protocol, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.episode_id == episode_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("protocol for episode {episode_id}")))
    }
}

/// File-backed [`Decision`] repository.
pub struct FileDecisionRepository {
    path: PathBuf,
    rows: Mutex<Vec<Decision>>,
}

impl FileDecisionRepository {
    /// Opens (or creates) the decision table at `data_dir/decisions.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("decisions.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }
}

impl DecisionRepository for FileDecisionRepository {
    fn create(&self, decision: Decision) -> Result<Decision, StoreError> {
        let mut rows = lock(&self.rows)?;
        if rows.iter().any(|row| row.episode_id == decision.episode_id) {
            return Err(StoreError::Validation(format!(
                "decision already exists for episode {}",
                decision.episode_id
            )));
        }
        rows.push(decision.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(decision)
    }

    fn get(&self, id: &DecisionId) -> Result<Decision, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("decision {id}")))
    }

    fn get_by_episode(&self, episode_id: &EpisodeId) -> Result<Decision, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.episode_id == episode_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("decision for episode {episode_id}")))
    }
}

/// File-backed [`Contract`] repository.
pub struct FileContractRepository {
    path: PathBuf,
    rows: Mutex<Vec<Contract>>,
}

impl FileContractRepository {
    /// Opens (or creates) the contract table at `data_dir/contracts.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("contracts.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }
}

impl ContractRepository for FileContractRepository {
    fn create(&self, contract: Contract) -> Result<Contract, StoreError> {
        let mut rows = lock(&self.rows)?;
        if rows.iter().any(|row| row.decision_id == contract.decision_id) {
            return Err(StoreError::Validation(format!(
                "contract already exists for decision {}",
                contract.decision_id
            )));
        }
        rows.push(contract.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(contract)
    }

    fn get(&self, id: &ContractId) -> Result<Contract, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("contract {id}")))
    }

    fn get_by_decision(&self, decision_id: &DecisionId) -> Result<Contract, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.decision_id == decision_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("contract for decision {decision_id}")))
    }

    fn list(&self) -> Result<Vec<Contract>, StoreError> {
        Ok(lock(&self.rows)?.clone())
    }
}

/// File-backed [`ConsequenceObservation`] repository.
pub struct FileConsequenceRepository {
    path: PathBuf,
    rows: Mutex<Vec<ConsequenceObservation>>,
}

impl FileConsequenceRepository {
    /// Opens (or creates) the consequence table at
    /// `data_dir/consequences.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("consequences.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }
}

impl ConsequenceRepository for FileConsequenceRepository {
    fn create(&self, observation: ConsequenceObservation) -> Result<ConsequenceObservation, StoreError> {
        let mut rows = lock(&self.rows)?;
        rows.push(observation.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(observation)
    }

    fn get(&self, id: &ObservationId) -> Result<ConsequenceObservation, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("observation {id}")))
    }

    fn list_by_contract(&self, contract_id: &ContractId) -> Result<Vec<ConsequenceObservation>, StoreError> {
        let rows = lock(&self.rows)?;
        Ok(rows
            .iter()
            .filter(|row| &row.contract_id == contract_id)
            .cloned()
            .collect())
    }
}

/// File-backed [`AutonomyMandate`] repository.
pub struct FileMandateRepository {
    path: PathBuf,
    rows: Mutex<Vec<AutonomyMandate>>,
}

impl FileMandateRepository {
    /// Opens (or creates) the mandate table at `data_dir/mandates.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the file exists but is corrupt.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join("mandates.json");
        let rows = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    /// Returns whether `status` is one a mandate can no longer leave.
    const fn is_terminal(status: MandateStatus) -> bool {
        matches!(status, MandateStatus::Expired | MandateStatus::Revoked)
    }
}

impl MandateRepository for FileMandateRepository {
    fn create(&self, mandate: AutonomyMandate) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        rows.push(mandate.clone());
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(mandate)
    }

    fn get(&self, id: &MandateId) -> Result<AutonomyMandate, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))
    }

    fn list_by_agent(&self, agent_id: &AgentId) -> Result<Vec<AutonomyMandate>, StoreError> {
        let rows = lock(&self.rows)?;
        Ok(rows
            .iter()
            .filter(|row| &row.agent_id == agent_id)
            .cloned()
            .collect())
    }

    fn consume_use(&self, id: &MandateId, at: Timestamp) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))?;
        if row.status == MandateStatus::Expired && row.expire_reason == Some(ExpireReason::Uses) {
            return Err(StoreError::Concurrency(format!(
                "mandate {id} use budget already exhausted by a racing writer"
            )));
        }
        if row.status != MandateStatus::Active {
            return Err(StoreError::State(format!("mandate {id} is not active")));
        }
        row.uses += 1;
        row.last_used_at = Some(at);
        if row.uses_exhausted() {
            row.status = MandateStatus::Expired;
            row.expired_at = Some(at);
            row.expire_reason = Some(ExpireReason::Uses);
        }
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn record_revocation(
        &self,
        id: &MandateId,
        revoked_by: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))?;
        if Self::is_terminal(row.status) {
            return Err(StoreError::State(format!("mandate {id} is already terminal")));
        }
        row.status = MandateStatus::Revoked;
        row.revoked_at = Some(at);
        row.revoked_by = Some(revoked_by.to_string());
        row.revocation_reason = Some(reason.to_string());
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn record_expiration(&self, id: &MandateId, reason: ExpireReason, at: Timestamp) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))?;
        if Self::is_terminal(row.status) {
            return Err(StoreError::State(format!("mandate {id} is already terminal")));
        }
        row.status = MandateStatus::Expired;
        row.expired_at = Some(at);
        row.expire_reason = Some(reason);
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn record_suspension(
        &self,
        id: &MandateId,
        reason: &str,
        triggered_by_observation_id: Option<ObservationId>,
        at: Timestamp,
    ) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))?;
        if Self::is_terminal(row.status) {
            return Err(StoreError::State(format!("mandate {id} is terminal")));
        }
        row.status = MandateStatus::Suspended;
        row.suspended_at = Some(at);
        row.suspend_reason = Some(reason.to_string());
        row.triggered_by_observation_id = triggered_by_observation_id;
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn record_resumption(&self, id: &MandateId, reason: Option<&str>) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))?;
        if row.status != MandateStatus::Suspended {
            return Err(StoreError::State(format!("mandate {id} is not suspended")));
        }
        if row.triggered_by_observation_id.is_some() && reason.is_none_or(str::is_empty) {
            return Err(StoreError::Validation(format!(
                "mandate {id} was suspended by a triggering observation; resumption requires a reason"
            )));
        }
        row.status = MandateStatus::Active;
        row.suspended_at = None;
        row.suspend_reason = None;
        row.triggered_by_observation_id = None;
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn record_mode_degradation(&self, id: &MandateId) -> Result<AutonomyMandate, StoreError> {
        let mut rows = lock(&self.rows)?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("mandate {id}")))?;
        row.mode = row.mode.degrade();
        let updated = row.clone();
        fs_util::write_json_atomically(&self.path, &*rows)?;
        Ok(updated)
    }

    fn list_all(&self) -> Result<Vec<AutonomyMandate>, StoreError> {
        Ok(lock(&self.rows)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govgate_core::entities::identifiers::AttachmentId;
    use govgate_core::entities::protocol::Limit;
    use govgate_core::entities::protocol::RiskProfile;
    use govgate_core::entities::situation::AbsorptionCapacity;
    use govgate_core::entities::situation::Alternative;
    use govgate_core::entities::situation::AttachmentKind;
    use govgate_core::entities::situation::Urgency;

    fn sample_situation(id: &str) -> Situation {
        Situation {
            id: SituationId::new(id),
            domain: "ops".to_string(),
            context: "ctx".to_string(),
            objective: "obj".to_string(),
            uncertainties: vec![],
            alternatives: vec![
                Alternative { description: "A".to_string(), associated_risks: vec![] },
                Alternative { description: "B".to_string(), associated_risks: vec![] },
            ],
            risks: vec![],
            urgency: Urgency::Low,
            absorption_capacity: AbsorptionCapacity::Medium,
            relevant_consequence: "loss of trust".to_string(),
            learning_possibility: true,
            declared_use_case: 1,
            status: SituationStatus::Draft,
            creation_time: Timestamp::parse("2026-01-01T00:00:00Z").expect("parse"),
            analysis_attachments: vec![],
        }
    }

    #[test]
    fn situation_repository_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let repo = FileSituationRepository::open(dir.path()).expect("open");
            repo.create(sample_situation("sit-1")).expect("create");
        }
        let repo = FileSituationRepository::open(dir.path()).expect("reopen");
        let loaded = repo.get(&SituationId::new("sit-1")).expect("get");
        assert_eq!(loaded.domain, "ops");
    }

    #[test]
    fn situation_repository_rejects_backward_status_transition() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileSituationRepository::open(dir.path()).expect("open");
        repo.create(sample_situation("sit-1")).expect("create");
        repo.advance_status(&SituationId::new("sit-1"), SituationStatus::Accepted)
            .expect("forward move");
        let err = repo
            .advance_status(&SituationId::new("sit-1"), SituationStatus::Open)
            .expect_err("backward move rejected");
        assert!(matches!(err, StoreError::State(_)));
    }

    #[test]
    fn situation_repository_appends_attachment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileSituationRepository::open(dir.path()).expect("open");
        repo.create(sample_situation("sit-1")).expect("create");
        let attachment = AnalysisAttachment {
            id: AttachmentId::new("att-1"),
            kind: AttachmentKind::Note,
            body: serde_json::json!({"note": "checked"}),
            time: Timestamp::parse("2026-01-01T00:00:00Z").expect("parse"),
        };
        let updated = repo
            .append_attachment(&SituationId::new("sit-1"), attachment)
            .expect("append");
        assert_eq!(updated.analysis_attachments.len(), 1);
    }

    fn sample_mandate(id: &str, max_uses: Option<u64>, uses: u64) -> AutonomyMandate {
        AutonomyMandate {
            id: MandateId::new(id),
            agent_id: AgentId::new("agent-1"),
            mode: govgate_core::entities::mandate::AutonomyMode::Autonomous,
            allowed_policies: vec![],
            max_risk_profile: RiskProfile::Moderate,
            limits: Vec::<Limit>::new(),
            human_trigger_phrases: vec![],
            allowed_domains: vec![],
            allowed_use_cases: vec![],
            granted_by: "admin".to_string(),
            granted_at: Timestamp::parse("2026-01-01T00:00:00Z").expect("parse"),
            valid_from: None,
            valid_until: None,
            max_uses,
            uses,
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
        }
    }

    #[test]
    fn consume_use_expires_mandate_on_reaching_max_uses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileMandateRepository::open(dir.path()).expect("open");
        repo.create(sample_mandate("m-1", Some(2), 1)).expect("create");
        let at = Timestamp::parse("2026-01-02T00:00:00Z").expect("parse");
        let updated = repo.consume_use(&MandateId::new("m-1"), at).expect("consume");
        assert_eq!(updated.uses, 2);
        assert_eq!(updated.status, MandateStatus::Expired);
    }

    #[test]
    fn consume_use_rejects_second_racing_consumer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileMandateRepository::open(dir.path()).expect("open");
        repo.create(sample_mandate("m-1", Some(1), 0)).expect("create");
        let at = Timestamp::parse("2026-01-02T00:00:00Z").expect("parse");
        repo.consume_use(&MandateId::new("m-1"), at).expect("first consume");
        let err = repo
            .consume_use(&MandateId::new("m-1"), at)
            .expect_err("second consume rejected");
        assert!(matches!(err, StoreError::Concurrency(_)));
    }

    #[test]
    fn resume_mandate_rejects_non_suspended_mandate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileMandateRepository::open(dir.path()).expect("open");
        repo.create(sample_mandate("m-1", None, 0)).expect("create");
        let err = repo
            .record_resumption(&MandateId::new("m-1"), None)
            .expect_err("not suspended");
        assert!(matches!(err, StoreError::State(_)));
    }

    #[test]
    fn resume_mandate_rejects_missing_reason_when_triggered_by_an_observation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileMandateRepository::open(dir.path()).expect("open");
        repo.create(sample_mandate("m-1", None, 0)).expect("create");
        let at = Timestamp::parse("2026-01-02T00:00:00Z").expect("parse");
        repo.record_suspension(
            &MandateId::new("m-1"),
            "limits violated",
            Some(ObservationId::new("obs-1")),
            at,
        )
        .expect("suspend");

        let err = repo
            .record_resumption(&MandateId::new("m-1"), None)
            .expect_err("reason required when a triggering observation exists");
        assert!(matches!(err, StoreError::Validation(_)));

        let resumed = repo
            .record_resumption(&MandateId::new("m-1"), Some("investigated, safe to resume"))
            .expect("resume with reason");
        assert_eq!(resumed.status, MandateStatus::Active);
    }
}
