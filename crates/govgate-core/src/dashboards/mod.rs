// crates/govgate-core/src/dashboards/mod.rs
// ============================================================================
// Module: Tenant Dashboard
// Description: Read-only query projections over the repository abstraction.
// Purpose: Implement C9 exactly: counts and latest-N listings, no writes,
//          no ranking or scoring.
// Dependencies: crate::{entities::*, interfaces::*}
// ============================================================================

//! ## Overview
//! [`TenantDashboard`] never mutates anything and never calls the event
//! log; every method is a pure read projected from the repositories'
//! `list`/`list_by_*` calls. It exists for operator visibility, not for
//! feeding back into any decision the orchestrator makes.

use std::sync::Arc;

use crate::entities::consequence::ConsequenceObservation;
use crate::entities::episode::Episode;
use crate::entities::episode::EpisodeState;
use crate::entities::mandate::MandateStatus;
use crate::entities::situation::Situation;
use crate::interfaces::ConsequenceRepository;
use crate::interfaces::ContractRepository;
use crate::interfaces::EpisodeRepository;
use crate::interfaces::MandateRepository;
use crate::interfaces::SituationRepository;
use crate::interfaces::StoreError;

/// Episode counts by lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpisodeCounts {
    /// Episodes in `CREATED`.
    pub created: u64,
    /// Episodes in `DECIDED`.
    pub decided: u64,
    /// Episodes in `UNDER_OBSERVATION`.
    pub under_observation: u64,
    /// Episodes in `CLOSED`.
    pub closed: u64,
}

/// A read-only, tenant-scoped view over the repository abstraction.
pub struct TenantDashboard {
    situations: Arc<dyn SituationRepository + Send + Sync>,
    episodes: Arc<dyn EpisodeRepository + Send + Sync>,
    contracts: Arc<dyn ContractRepository + Send + Sync>,
    consequences: Arc<dyn ConsequenceRepository + Send + Sync>,
    mandates: Arc<dyn MandateRepository + Send + Sync>,
}

impl TenantDashboard {
    /// Wires a dashboard from the repositories it reads.
    #[must_use]
    pub fn new(
        situations: Arc<dyn SituationRepository + Send + Sync>,
        episodes: Arc<dyn EpisodeRepository + Send + Sync>,
        contracts: Arc<dyn ContractRepository + Send + Sync>,
        consequences: Arc<dyn ConsequenceRepository + Send + Sync>,
        mandates: Arc<dyn MandateRepository + Send + Sync>,
    ) -> Self {
        Self {
            situations,
            episodes,
            contracts,
            consequences,
            mandates,
        }
    }

    /// Counts episodes by lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    pub fn episode_counts(&self) -> Result<EpisodeCounts, StoreError> {
        let mut counts = EpisodeCounts::default();
        for episode in self.episodes.list()? {
            match episode.state {
                EpisodeState::Created => counts.created += 1,
                EpisodeState::Decided => counts.decided += 1,
                EpisodeState::UnderObservation => counts.under_observation += 1,
                EpisodeState::Closed => counts.closed += 1,
            }
        }
        Ok(counts)
    }

    /// Counts mandates currently in `ACTIVE` status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    pub fn active_mandate_count(&self) -> Result<u64, StoreError> {
        let count = self
            .mandates
            .list_all()?
            .iter()
            .filter(|mandate| matches!(mandate.status, MandateStatus::Active))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    /// Counts contracts that have not yet received any
    /// [`ConsequenceObservation`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    pub fn contracts_pending_observation(&self) -> Result<u64, StoreError> {
        let mut pending = 0u64;
        for contract in self.contracts.list()? {
            if self.consequences.list_by_contract(&contract.id)?.is_empty() {
                pending += 1;
            }
        }
        Ok(pending)
    }

    /// Returns the `n` most recently created situations, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    pub fn latest_situations(&self, n: usize) -> Result<Vec<Situation>, StoreError> {
        let mut situations = self.situations.list()?;
        situations.sort_unstable_by(|a, b| b.creation_time.cmp(&a.creation_time));
        situations.truncate(n);
        Ok(situations)
    }

    /// Returns the `n` most recently created episodes, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    pub fn latest_episodes(&self, n: usize) -> Result<Vec<Episode>, StoreError> {
        let mut episodes = self.episodes.list()?;
        episodes.sort_unstable_by(|a, b| b.created_at.cmp(&a.created_at));
        episodes.truncate(n);
        Ok(episodes)
    }

    /// Returns every [`ConsequenceObservation`] recorded against
    /// `contract_id`. A thin synonym for
    /// [`ConsequenceRepository::list_by_contract`](crate::interfaces::ConsequenceRepository::list_by_contract),
    /// kept on the dashboard for read-model symmetry with the other listing
    /// methods.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fatal`] on an I/O failure.
    pub fn observations_for_contract(
        &self,
        contract_id: &crate::entities::identifiers::ContractId,
    ) -> Result<Vec<ConsequenceObservation>, StoreError> {
        self.consequences.list_by_contract(contract_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, missing_docs, reason = "in-memory test fixtures, not production repositories")]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::entities::contract::Contract;
    use crate::entities::identifiers::ContractId;
    use crate::entities::identifiers::DecisionId;
    use crate::entities::identifiers::EpisodeId;
    use crate::entities::identifiers::MandateId;
    use crate::entities::identifiers::ObservationId;
    use crate::entities::identifiers::SituationId;
    use crate::entities::mandate::AutonomyMandate;
    use crate::entities::mandate::AutonomyMode;
    use crate::entities::mandate::ExpireReason;
    use crate::entities::protocol::RiskProfile;
    use crate::entities::situation::AbsorptionCapacity;
    use crate::entities::situation::SituationStatus;
    use crate::entities::situation::Urgency;
    use crate::entities::time::Timestamp;

    #[derive(Default)]
    struct FakeSituations(Mutex<Vec<Situation>>);
    impl SituationRepository for FakeSituations {
        fn create(&self, s: Situation) -> Result<Situation, StoreError> {
            self.0.lock().unwrap().push(s.clone());
            Ok(s)
        }
        fn get(&self, id: &SituationId) -> Result<Situation, StoreError> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|s| &s.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
        fn list(&self) -> Result<Vec<Situation>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn append_attachment(
            &self,
            _id: &SituationId,
            _attachment: crate::entities::situation::AnalysisAttachment,
        ) -> Result<Situation, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn advance_status(&self, _id: &SituationId, _to: SituationStatus) -> Result<Situation, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
    }

    #[derive(Default)]
    struct FakeEpisodes(Mutex<Vec<Episode>>);
    impl EpisodeRepository for FakeEpisodes {
        fn create(&self, e: Episode) -> Result<Episode, StoreError> {
            self.0.lock().unwrap().push(e.clone());
            Ok(e)
        }
        fn get(&self, id: &EpisodeId) -> Result<Episode, StoreError> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|e| &e.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
        fn get_by_situation(&self, _situation_id: &SituationId) -> Result<Episode, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn list(&self) -> Result<Vec<Episode>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn advance_state(
            &self,
            _id: &EpisodeId,
            _to: EpisodeState,
            _at: Timestamp,
        ) -> Result<Episode, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
    }

    #[derive(Default)]
    struct FakeContracts(Mutex<Vec<Contract>>);
    impl ContractRepository for FakeContracts {
        fn create(&self, c: Contract) -> Result<Contract, StoreError> {
            self.0.lock().unwrap().push(c.clone());
            Ok(c)
        }
        fn get(&self, id: &ContractId) -> Result<Contract, StoreError> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|c| &c.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
        fn get_by_decision(&self, _decision_id: &DecisionId) -> Result<Contract, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn list(&self) -> Result<Vec<Contract>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct FakeConsequences(Mutex<Vec<ConsequenceObservation>>);
    impl ConsequenceRepository for FakeConsequences {
        fn create(&self, o: ConsequenceObservation) -> Result<ConsequenceObservation, StoreError> {
            self.0.lock().unwrap().push(o.clone());
            Ok(o)
        }
        fn get(&self, id: &ObservationId) -> Result<ConsequenceObservation, StoreError> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|o| &o.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
        fn list_by_contract(&self, contract_id: &ContractId) -> Result<Vec<ConsequenceObservation>, StoreError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|o| &o.contract_id == contract_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeMandates(Mutex<Vec<AutonomyMandate>>);
    impl MandateRepository for FakeMandates {
        fn create(&self, m: AutonomyMandate) -> Result<AutonomyMandate, StoreError> {
            self.0.lock().unwrap().push(m.clone());
            Ok(m)
        }
        fn get(&self, id: &MandateId) -> Result<AutonomyMandate, StoreError> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|m| &m.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
        fn list_by_agent(
            &self,
            _agent_id: &crate::entities::identifiers::AgentId,
        ) -> Result<Vec<AutonomyMandate>, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn consume_use(&self, _id: &MandateId, _at: Timestamp) -> Result<AutonomyMandate, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn record_revocation(
            &self,
            _id: &MandateId,
            _revoked_by: &str,
            _reason: &str,
            _at: Timestamp,
        ) -> Result<AutonomyMandate, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn record_expiration(
            &self,
            _id: &MandateId,
            _reason: ExpireReason,
            _at: Timestamp,
        ) -> Result<AutonomyMandate, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn record_suspension(
            &self,
            _id: &MandateId,
            _reason: &str,
            _triggered_by_observation_id: Option<ObservationId>,
            _at: Timestamp,
        ) -> Result<AutonomyMandate, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn record_resumption(&self, _id: &MandateId, _reason: Option<&str>) -> Result<AutonomyMandate, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn record_mode_degradation(&self, _id: &MandateId) -> Result<AutonomyMandate, StoreError> {
            unimplemented!("not exercised by dashboard tests")
        }
        fn list_all(&self) -> Result<Vec<AutonomyMandate>, StoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    fn sample_situation(id: &str, time: &str) -> Situation {
        Situation {
            id: SituationId::new(id),
            domain: "ops".to_string(),
            context: "ctx".to_string(),
            objective: "obj".to_string(),
            uncertainties: vec![],
            alternatives: vec![],
            risks: vec![],
            urgency: Urgency::Low,
            absorption_capacity: AbsorptionCapacity::Medium,
            relevant_consequence: "loss".to_string(),
            learning_possibility: true,
            declared_use_case: 1,
            status: SituationStatus::Draft,
            creation_time: Timestamp::parse(time).unwrap(),
            analysis_attachments: vec![],
        }
    }

    fn dashboard() -> (TenantDashboard, Arc<FakeSituations>, Arc<FakeEpisodes>, Arc<FakeContracts>, Arc<FakeConsequences>, Arc<FakeMandates>) {
        let situations = Arc::new(FakeSituations::default());
        let episodes = Arc::new(FakeEpisodes::default());
        let contracts = Arc::new(FakeContracts::default());
        let consequences = Arc::new(FakeConsequences::default());
        let mandates = Arc::new(FakeMandates::default());
        let dashboard = TenantDashboard::new(
            situations.clone(),
            episodes.clone(),
            contracts.clone(),
            consequences.clone(),
            mandates.clone(),
        );
        (dashboard, situations, episodes, contracts, consequences, mandates)
    }

    #[test]
    fn episode_counts_tally_by_state() {
        let (dashboard, _, episodes, ..) = dashboard();
        for (state, n) in [
            (EpisodeState::Created, 2),
            (EpisodeState::Decided, 1),
            (EpisodeState::Closed, 3),
        ] {
            for i in 0..n {
                episodes
                    .create(Episode {
                        id: EpisodeId::new(format!("ep-{state:?}-{i}")),
                        use_case: 1,
                        domain: "ops".to_string(),
                        state,
                        referenced_situation_id: SituationId::new("sit-1"),
                        created_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
                        decided_at: None,
                        observation_started_at: None,
                        closed_at: None,
                    })
                    .unwrap();
            }
        }
        let counts = dashboard.episode_counts().unwrap();
        assert_eq!(counts.created, 2);
        assert_eq!(counts.decided, 1);
        assert_eq!(counts.under_observation, 0);
        assert_eq!(counts.closed, 3);
    }

    #[test]
    fn active_mandate_count_excludes_terminal_mandates() {
        let (dashboard, .., mandates) = dashboard();
        let base = AutonomyMandate {
            id: MandateId::new("m-1"),
            agent_id: crate::entities::identifiers::AgentId::new("agent-1"),
            mode: AutonomyMode::Autonomous,
            allowed_policies: vec![],
            max_risk_profile: RiskProfile::Moderate,
            limits: vec![],
            human_trigger_phrases: vec![],
            allowed_domains: vec![],
            allowed_use_cases: vec![],
            granted_by: "admin".to_string(),
            granted_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            valid_from: None,
            valid_until: None,
            max_uses: None,
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
        mandates.create(base.clone()).unwrap();
        mandates
            .create(AutonomyMandate {
                id: MandateId::new("m-2"),
                status: MandateStatus::Revoked,
                ..base
            })
            .unwrap();
        assert_eq!(dashboard.active_mandate_count().unwrap(), 1);
    }

    #[test]
    fn latest_situations_orders_newest_first_and_truncates() {
        let (dashboard, situations, ..) = dashboard();
        situations.create(sample_situation("sit-1", "2026-01-01T00:00:00Z")).unwrap();
        situations.create(sample_situation("sit-2", "2026-03-01T00:00:00Z")).unwrap();
        situations.create(sample_situation("sit-3", "2026-02-01T00:00:00Z")).unwrap();
        let latest = dashboard.latest_situations(2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id.as_str(), "sit-2");
        assert_eq!(latest[1].id.as_str(), "sit-3");
    }
}
