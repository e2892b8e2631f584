// crates/govgate-tenant/src/runtime.rs
// ============================================================================
// Module: Per-Tenant Runtime
// Description: Lazy map of live Core instances, one per tenant data directory.
// Purpose: Implement spec §4.7 "Runtime" — independent, crash-isolated
//          instances built on demand and cached for the process lifetime.
// Dependencies: govgate_core::{Orchestrator, SystemClock}, govgate_store,
//               crate::{path, TenantError}
// ============================================================================

//! ## Overview
//! A [`Core`] bundles one tenant's seven repositories, its event log, and the
//! [`govgate_core::Orchestrator`] that drives them — all rooted at the
//! directory [`crate::path::resolve_data_dir`] produced for that tenant.
//! [`TenantRuntime`] is the lazy, shared-ownership map from tenant id to
//! [`Core`]: the first caller for a tenant pays the cost of opening every
//! repository file and verifying the event log snapshot; every later caller
//! observes the same cached instance. Because nothing is shared across
//! tenants beyond the registry, one tenant's instance can be corrupt or
//! degraded without affecting any other's.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use govgate_core::Orchestrator;
use govgate_core::SystemClock;
use govgate_store::EventLogConfig;
use govgate_store::FileConsequenceRepository;
use govgate_store::FileContractRepository;
use govgate_store::FileDecisionRepository;
use govgate_store::FileEpisodeRepository;
use govgate_store::FileEventLogSink;
use govgate_store::FileMandateRepository;
use govgate_store::FileProtocolRepository;
use govgate_store::FileSituationRepository;

use crate::TenantError;
use crate::path::resolve_data_dir;

/// One tenant's fully wired instance: repositories, event log, and the
/// orchestrator that ties them together. Independently initializable,
/// verifiable (via [`Orchestrator::is_degraded`]), and shutdown-able by
/// simply dropping it — no thread or background task outlives a `Core`.
pub struct Core {
    /// Directory this instance is rooted at.
    data_dir: PathBuf,
    /// The orchestrator wired to this tenant's repositories and event log.
    pub orchestrator: Orchestrator,
}

impl Core {
    /// Opens every repository and the event log rooted at `data_dir`, wires
    /// an [`Orchestrator`] over them, and runs boot-time verification.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::Store`] if any repository file is corrupt or
    /// the directory cannot be created.
    pub fn open(data_dir: &Path, event_log_config: EventLogConfig) -> Result<Self, TenantError> {
        let situations = Arc::new(FileSituationRepository::open(data_dir)?);
        let episodes = Arc::new(FileEpisodeRepository::open(data_dir)?);
        let protocols = Arc::new(FileProtocolRepository::open(data_dir)?);
        let decisions = Arc::new(FileDecisionRepository::open(data_dir)?);
        let contracts = Arc::new(FileContractRepository::open(data_dir)?);
        let consequences = Arc::new(FileConsequenceRepository::open(data_dir)?);
        let mandates = Arc::new(FileMandateRepository::open(data_dir)?);
        let event_log = Arc::new(FileEventLogSink::open(data_dir, event_log_config)?);

        let orchestrator = Orchestrator::new(
            situations,
            episodes,
            protocols,
            decisions,
            contracts,
            consequences,
            mandates,
            event_log,
            Arc::new(SystemClock),
        );
        orchestrator.init();

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            orchestrator,
        })
    }

    /// Returns the directory this instance is rooted at.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Lazily constructed, shared map of per-tenant [`Core`] instances.
pub struct TenantRuntime {
    base_dir: PathBuf,
    event_log_config: EventLogConfig,
    instances: Mutex<HashMap<String, Arc<Core>>>,
}

impl TenantRuntime {
    /// Creates an empty runtime rooted at `base_dir`; no tenant instance is
    /// built until first requested.
    #[must_use]
    pub fn new(base_dir: PathBuf, event_log_config: EventLogConfig) -> Self {
        Self {
            base_dir,
            event_log_config,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached [`Core`] for `tenant_id`, building and caching it
    /// on first use.
    ///
    /// `tenant_id` must already be normalized (see
    /// [`crate::path::validate_tenant_id`]); this call does not re-validate
    /// it, only resolves its directory.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::PathTraversal`] if the resolved directory
    /// escapes the tenants root, or [`TenantError::Store`] if opening the
    /// instance fails.
    pub fn get_or_open(&self, tenant_id: &str) -> Result<Arc<Core>, TenantError> {
        let mut instances = self
            .instances
            .lock()
            .map_err(|_| TenantError::Fatal("tenant runtime mutex poisoned".to_string()))?;
        if let Some(core) = instances.get(tenant_id) {
            return Ok(Arc::clone(core));
        }
        let data_dir = resolve_data_dir(&self.base_dir, tenant_id)?;
        let core = Arc::new(Core::open(&data_dir, self.event_log_config)?);
        instances.insert(tenant_id.to_string(), Arc::clone(&core));
        Ok(core)
    }

    /// Drops the cached instance for `tenant_id`, if any, freeing its
    /// repositories and event log handle. A later call to
    /// [`Self::get_or_open`] rebuilds it from disk.
    pub fn shutdown(&self, tenant_id: &str) {
        if let Ok(mut instances) = self.instances.lock() {
            instances.remove(tenant_id);
        }
    }
}
