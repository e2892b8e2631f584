// crates/govgate-tenant/src/router.rs
// ============================================================================
// Module: Tenant Router
// Description: Resolves an incoming request to a live Core instance.
// Purpose: Implement spec §4.7 "Router" — header, then path prefix, then
//          subdomain, then auth claim, first match wins.
// Dependencies: crate::{registry::TenantRegistry, runtime::{Core, TenantRuntime},
//               TenantError}
// ============================================================================

//! ## Overview
//! A [`Router`] never touches transport: it takes a [`RequestTenantHints`]
//! already extracted from a request by the gateway (an explicit tenant
//! header, a path prefix segment, a subdomain label, and/or an auth token
//! claim) and resolves it to one tenant id, in that fixed precedence order.
//! It then consults the [`TenantRegistry`] for status and, if active, asks
//! the [`TenantRuntime`] for the live [`Core`].

use std::sync::Arc;

use govgate_core::entities::identifiers::TenantId;

use crate::TenantError;
use crate::path::validate_tenant_id;
use crate::registry::TenantRegistry;
use crate::registry::TenantStatus;
use crate::runtime::Core;
use crate::runtime::TenantRuntime;

/// The tenant-identifying signals a gateway extracts from one request,
/// offered to the router in precedence order.
#[derive(Debug, Clone, Default)]
pub struct RequestTenantHints {
    /// Value of an explicit tenant header (e.g. `X-Tenant-Id`), if present.
    pub header: Option<String>,
    /// First path segment, if the route is prefixed with a tenant id.
    pub path_prefix: Option<String>,
    /// Subdomain label, if the request arrived over a per-tenant subdomain.
    pub subdomain: Option<String>,
    /// Tenant claim extracted from a verified auth token, if present.
    pub auth_claim: Option<String>,
}

impl RequestTenantHints {
    /// Returns the first populated hint in precedence order: header, path
    /// prefix, subdomain, then auth claim.
    #[must_use]
    pub fn resolve_candidate(&self) -> Option<&str> {
        self.header
            .as_deref()
            .or(self.path_prefix.as_deref())
            .or(self.subdomain.as_deref())
            .or(self.auth_claim.as_deref())
    }
}

/// Resolves requests to live [`Core`] instances, combining tenant
/// registration status with lazy runtime construction.
pub struct Router {
    registry: Arc<TenantRegistry>,
    runtime: Arc<TenantRuntime>,
}

impl Router {
    /// Builds a router over a shared registry and runtime.
    #[must_use]
    pub fn new(registry: Arc<TenantRegistry>, runtime: Arc<TenantRuntime>) -> Self {
        Self { registry, runtime }
    }

    /// Resolves `hints` to a tenant's [`Core`] instance.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] if no hint is present or the id is
    /// unregistered, [`TenantError::Suspended`] or [`TenantError::Deleted`]
    /// if the tenant exists but is not active, [`TenantError::InvalidId`] or
    /// [`TenantError::Reserved`] if the resolved id fails validation, and
    /// [`TenantError::Store`] if constructing the instance fails.
    pub fn resolve(&self, hints: &RequestTenantHints) -> Result<Arc<Core>, TenantError> {
        let candidate = hints
            .resolve_candidate()
            .ok_or_else(|| TenantError::NotFound("no tenant hint present on request".to_string()))?;
        let normalized = validate_tenant_id(candidate)?;

        let tenant = self.registry.get(&TenantId::new(normalized.clone()))?;
        match tenant.status {
            TenantStatus::Active => {}
            TenantStatus::Suspended => return Err(TenantError::Suspended(normalized)),
            TenantStatus::Deleted => return Err(TenantError::Deleted(normalized)),
        }
        self.runtime.get_or_open(&normalized)
    }
}
