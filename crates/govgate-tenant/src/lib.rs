// crates/govgate-tenant/src/lib.rs
// ============================================================================
// Module: Governed Decision Engine Tenant Library
// Description: TenantId validation, safe path resolution, the tenant
//              registry, lazy per-tenant runtime, and the request router.
// Purpose: Implement C8, the multi-tenant isolation boundary, on top of
//          `govgate-core`'s entity model and `govgate-store`'s file backend.
// Dependencies: govgate_core, govgate_store, crate::{path, registry, runtime,
//               router}
// ============================================================================

//! ## Overview
//! Nothing in `govgate-core` or `govgate-store` knows what a tenant is: they
//! operate on "a data directory". This crate is the only place that turns a
//! caller-supplied tenant id into a safe, exclusive directory and a live
//! [`runtime::Core`] instance. The four pieces compose in one direction —
//! [`path`] validates and resolves, [`registry::TenantRegistry`] persists
//! tenant metadata, [`runtime::TenantRuntime`] lazily builds and caches
//! [`runtime::Core`] instances over resolved paths, and [`router::Router`]
//! ties registry lookup + runtime construction together behind one call.

pub mod path;
pub mod registry;
pub mod router;
pub mod runtime;

pub use path::resolve_data_dir;
pub use path::validate_tenant_id;
pub use registry::TenantConfig;
pub use registry::TenantQuotas;
pub use registry::TenantRegistry;
pub use registry::TenantStatus;
pub use router::Router;
pub use runtime::Core;
pub use runtime::TenantRuntime;

use thiserror::Error;

/// The tenant-scoped error taxonomy (spec §7 "Tenant errors").
#[derive(Debug, Error)]
pub enum TenantError {
    /// Tenant id fails the `^[a-z0-9][a-z0-9-]{1,48}[a-z0-9]$` pattern.
    #[error("invalid tenant id: {0}")]
    InvalidId(String),
    /// Tenant id is in the reserved set.
    #[error("tenant id is reserved: {0}")]
    Reserved(String),
    /// Resolved path escaped the tenants root.
    #[error("path traversal rejected for tenant id: {0}")]
    PathTraversal(String),
    /// No tenant is registered under this id.
    #[error("tenant not found: {0}")]
    NotFound(String),
    /// Tenant exists but is suspended.
    #[error("tenant suspended: {0}")]
    Suspended(String),
    /// Tenant exists but has been removed.
    #[error("tenant deleted: {0}")]
    Deleted(String),
    /// Tenant already registered.
    #[error("tenant already registered: {0}")]
    AlreadyExists(String),
    /// Underlying store failure constructing or running a tenant instance.
    #[error("tenant store error: {0}")]
    Store(#[from] govgate_core::StoreError),
    /// Base directory unwritable or registry file unreadable on boot.
    #[error("fatal tenant error: {0}")]
    Fatal(String),
}
