// crates/govgate-config/src/lib.rs
// ============================================================================
// Module: Governed Decision Engine Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for the engine's TOML configuration.
// Dependencies: govgate_core, govgate_store, serde, toml
// ============================================================================

//! ## Overview
//! `govgate-config` defines the canonical configuration model for the
//! engine: strict, fail-closed TOML loading with eager validation, covering
//! exactly the options named in spec §6 (event log tuning, tenant quota
//! defaults, and the base directory). Validation rejects anything a caller
//! could use to exceed a hard ceiling or to point the engine at an unusable
//! directory; it never repairs or defaults around a bad value.

pub mod config;

pub use config::ConfigError;
pub use config::EngineConfig;
pub use config::EventLogSettings;
pub use config::TenantQuotaDefaults;
