// crates/govgate-tenant/src/registry.rs
// ============================================================================
// Module: Tenant Registry
// Description: Persistent tenant metadata: status, quotas, and features.
// Purpose: Implement spec §4.7 "Registry" — the single source of truth for
//          which tenants exist and whether they may be served traffic.
// Dependencies: govgate_core::entities::{identifiers, time}, govgate_store,
//               crate::TenantError
// ============================================================================

//! ## Overview
//! The registry is one JSON file (`config/tenants.json`) under the engine's
//! base directory, guarded by an in-process mutex exactly like the
//! file-backed repositories in `govgate-store::repository`. Removal is a
//! soft delete (`status = deleted`); the registry never forgets a tenant id
//! so that an accidental re-registration cannot reuse a directory that still
//! holds another tenant's data.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use govgate_core::entities::identifiers::TenantId;
use govgate_core::entities::time::Timestamp;
use govgate_store::fs_util;
use serde::Deserialize;
use serde::Serialize;

use crate::TenantError;
use crate::path::validate_tenant_id;

/// Lifecycle status of a registered tenant (spec §4.7 "Registry").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    /// Tenant accepts traffic.
    Active,
    /// Tenant is temporarily barred from traffic but retains its data.
    Suspended,
    /// Tenant has been soft-deleted; its id may never be reused.
    Deleted,
}

/// Per-tenant resource quotas enforced at the router layer (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantQuotas {
    /// Maximum event log entries this tenant may accumulate.
    pub max_events: u64,
    /// Maximum total storage, in megabytes, this tenant may occupy.
    pub max_storage_mb: u64,
    /// Maximum requests per minute accepted for this tenant.
    pub rate_limit_rpm: u32,
}

/// Persisted tenant metadata (spec §4.7 "Registry").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Normalized tenant identifier.
    pub id: TenantId,
    /// Human-readable tenant name.
    pub name: String,
    /// Lifecycle status.
    pub status: TenantStatus,
    /// Registration time.
    pub created_at: Timestamp,
    /// Time of the most recent metadata update.
    pub updated_at: Timestamp,
    /// Resource quotas.
    pub quotas: TenantQuotas,
    /// Enabled feature flags for this tenant.
    pub features: Vec<String>,
}

/// File-backed registry of tenant metadata, rooted at `<base>/config/tenants.json`.
pub struct TenantRegistry {
    path: PathBuf,
    tenants: Mutex<Vec<TenantConfig>>,
}

impl TenantRegistry {
    /// Opens (or creates) the registry file under `base`.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::Fatal`] if the registry file exists but is not
    /// valid JSON, or cannot be read.
    pub fn open(base: &Path) -> Result<Self, TenantError> {
        let path = base.join("config").join("tenants.json");
        let tenants = fs_util::read_json_or_default(&path, Vec::new())?;
        Ok(Self {
            path,
            tenants: Mutex::new(tenants),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<TenantConfig>>, TenantError> {
        self.tenants
            .lock()
            .map_err(|_| TenantError::Fatal("tenant registry mutex poisoned".to_string()))
    }

    fn persist(&self, tenants: &[TenantConfig]) -> Result<(), TenantError> {
        fs_util::write_json_atomically(&self.path, &tenants)?;
        Ok(())
    }

    /// Registers a new tenant with the given id, name, quotas, and features.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::InvalidId`]/[`TenantError::Reserved`] if `id`
    /// fails validation, or [`TenantError::AlreadyExists`] if the
    /// (normalized) id is already registered, active or not.
    pub fn register(
        &self,
        id: &str,
        name: &str,
        quotas: TenantQuotas,
        features: Vec<String>,
        at: Timestamp,
    ) -> Result<TenantConfig, TenantError> {
        let normalized = validate_tenant_id(id)?;
        let mut tenants = self.lock()?;
        if tenants.iter().any(|tenant| tenant.id.as_str() == normalized.as_str()) {
            return Err(TenantError::AlreadyExists(normalized));
        }
        let config = TenantConfig {
            id: TenantId::new(normalized),
            name: name.to_string(),
            status: TenantStatus::Active,
            created_at: at,
            updated_at: at,
            quotas,
            features,
        };
        tenants.push(config.clone());
        self.persist(&tenants)?;
        Ok(config)
    }

    /// Fetches a tenant's metadata by id.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] if no such tenant is registered.
    pub fn get(&self, id: &TenantId) -> Result<TenantConfig, TenantError> {
        let tenants = self.lock()?;
        tenants
            .iter()
            .find(|tenant| &tenant.id == id)
            .cloned()
            .ok_or_else(|| TenantError::NotFound(id.to_string()))
    }

    /// Lists every registered tenant, regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::Fatal`] if the registry mutex is poisoned.
    pub fn list(&self) -> Result<Vec<TenantConfig>, TenantError> {
        Ok(self.lock()?.clone())
    }

    /// Lists only tenants with [`TenantStatus::Active`].
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::Fatal`] if the registry mutex is poisoned.
    pub fn list_active(&self) -> Result<Vec<TenantConfig>, TenantError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|tenant| tenant.status == TenantStatus::Active)
            .cloned()
            .collect())
    }

    /// Updates a tenant's name, quotas, and features in place.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] if no such tenant is registered.
    pub fn update(
        &self,
        id: &TenantId,
        name: String,
        quotas: TenantQuotas,
        features: Vec<String>,
        at: Timestamp,
    ) -> Result<TenantConfig, TenantError> {
        let mut tenants = self.lock()?;
        let tenant = tenants
            .iter_mut()
            .find(|tenant| &tenant.id == id)
            .ok_or_else(|| TenantError::NotFound(id.to_string()))?;
        tenant.name = name;
        tenant.quotas = quotas;
        tenant.features = features;
        tenant.updated_at = at;
        let updated = tenant.clone();
        self.persist(&tenants)?;
        Ok(updated)
    }

    /// Moves a tenant to [`TenantStatus::Suspended`].
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] if no such tenant is registered, or
    /// [`TenantError::Deleted`] if the tenant has already been removed.
    pub fn suspend(&self, id: &TenantId, at: Timestamp) -> Result<TenantConfig, TenantError> {
        self.set_status(id, TenantStatus::Suspended, at)
    }

    /// Moves a suspended tenant back to [`TenantStatus::Active`].
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] if no such tenant is registered, or
    /// [`TenantError::Deleted`] if the tenant has already been removed.
    pub fn resume(&self, id: &TenantId, at: Timestamp) -> Result<TenantConfig, TenantError> {
        self.set_status(id, TenantStatus::Active, at)
    }

    /// Soft-deletes a tenant by moving it to [`TenantStatus::Deleted`]. The
    /// id remains in the registry so it can never be re-registered.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] if no such tenant is registered.
    pub fn remove(&self, id: &TenantId, at: Timestamp) -> Result<TenantConfig, TenantError> {
        self.set_status(id, TenantStatus::Deleted, at)
    }

    fn set_status(
        &self,
        id: &TenantId,
        status: TenantStatus,
        at: Timestamp,
    ) -> Result<TenantConfig, TenantError> {
        let mut tenants = self.lock()?;
        let tenant = tenants
            .iter_mut()
            .find(|tenant| &tenant.id == id)
            .ok_or_else(|| TenantError::NotFound(id.to_string()))?;
        if tenant.status == TenantStatus::Deleted && status != TenantStatus::Deleted {
            return Err(TenantError::Deleted(id.to_string()));
        }
        tenant.status = status;
        tenant.updated_at = at;
        let updated = tenant.clone();
        self.persist(&tenants)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> Timestamp {
        Timestamp::parse(text).expect("parse")
    }

    fn quotas() -> TenantQuotas {
        TenantQuotas {
            max_events: 10_000,
            max_storage_mb: 1024,
            rate_limit_rpm: 600,
        }
    }

    #[test]
    fn register_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let registry = TenantRegistry::open(dir.path()).expect("open");
            registry
                .register("acme-corp", "Acme Corp", quotas(), vec![], ts("2026-01-01T00:00:00Z"))
                .expect("register");
        }
        let registry = TenantRegistry::open(dir.path()).expect("reopen");
        let tenant = registry
            .get(&TenantId::new("acme-corp"))
            .expect("get after reopen");
        assert_eq!(tenant.name, "Acme Corp");
    }

    #[test]
    fn register_rejects_duplicate_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = TenantRegistry::open(dir.path()).expect("open");
        registry
            .register("acme-corp", "Acme Corp", quotas(), vec![], ts("2026-01-01T00:00:00Z"))
            .expect("first register");
        let err = registry
            .register("acme-corp", "Acme Corp Again", quotas(), vec![], ts("2026-01-02T00:00:00Z"))
            .expect_err("duplicate rejected");
        assert!(matches!(err, TenantError::AlreadyExists(_)));
    }

    #[test]
    fn register_rejects_invalid_id_without_persisting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = TenantRegistry::open(dir.path()).expect("open");
        let err = registry
            .register("../etc/passwd", "Evil", quotas(), vec![], ts("2026-01-01T00:00:00Z"))
            .expect_err("invalid id rejected");
        assert!(matches!(err, TenantError::InvalidId(_)));
        assert!(registry.list().expect("list").is_empty());
    }

    #[test]
    fn list_active_excludes_suspended_and_deleted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = TenantRegistry::open(dir.path()).expect("open");
        registry
            .register("acme-corp", "Acme", quotas(), vec![], ts("2026-01-01T00:00:00Z"))
            .expect("register acme");
        registry
            .register("globex-inc", "Globex", quotas(), vec![], ts("2026-01-01T00:00:00Z"))
            .expect("register globex");
        registry
            .suspend(&TenantId::new("globex-inc"), ts("2026-01-02T00:00:00Z"))
            .expect("suspend");
        let active = registry.list_active().expect("list_active");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, TenantId::new("acme-corp"));
    }

    #[test]
    fn removed_tenant_cannot_be_resumed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = TenantRegistry::open(dir.path()).expect("open");
        registry
            .register("acme-corp", "Acme", quotas(), vec![], ts("2026-01-01T00:00:00Z"))
            .expect("register");
        let id = TenantId::new("acme-corp");
        registry.remove(&id, ts("2026-01-02T00:00:00Z")).expect("remove");
        let err = registry
            .resume(&id, ts("2026-01-03T00:00:00Z"))
            .expect_err("deleted tenant cannot resume");
        assert!(matches!(err, TenantError::Deleted(_)));
    }
}
