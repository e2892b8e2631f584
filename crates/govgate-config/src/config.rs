// crates/govgate-config/src/config.rs
// ============================================================================
// Module: Engine Configuration
// Description: TOML configuration loading and validation for the engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file, validated eagerly, and never
//! repaired: a value outside its documented bounds is a load-time error, not
//! a value silently clamped at use time. [`EventLogSettings`] and
//! [`TenantQuotaDefaults`] mirror, field for field, the tunables named in
//! spec §6; [`EngineConfig`] is the top-level document.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "govgate.toml";
/// Environment variable used to override the config path.
const CONFIG_ENV_VAR: &str = "GOVGATE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum total path length accepted for `base_dir`.
const MAX_PATH_LENGTH: usize = 4096;

/// Hard ceiling on `max_events_export` unless `allow_ceiling_override` is set.
const MAX_EVENTS_EXPORT_CEILING: usize = 10_000;
/// Hard ceiling on `max_events_replay` unless `allow_ceiling_override` is set.
const MAX_EVENTS_REPLAY_CEILING: usize = 50_000;

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Event log tuning (spec §6 "Configuration"). Field-for-field mirror of
/// `govgate_store::EventLogConfig`, kept as a separate type so this crate
/// does not need a dependency edge onto the store's runtime types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogSettings {
    /// Entries per segment before rotation. Must be greater than zero.
    pub segment_size: u32,
    /// Appends between snapshot rewrites. Must be greater than zero.
    pub snapshot_every: u32,
    /// Maximum retained closed segments.
    pub retention_segments: u32,
    /// Hard ceiling on a single `export_range` call.
    pub max_events_export: usize,
    /// Hard ceiling on a single `replay` call.
    pub max_events_replay: usize,
    /// Allows `max_events_export`/`max_events_replay` to exceed the
    /// documented default ceilings. Operators must opt in explicitly.
    pub allow_ceiling_override: bool,
}

impl Default for EventLogSettings {
    fn default() -> Self {
        Self {
            segment_size: 1000,
            snapshot_every: 500,
            retention_segments: 30,
            max_events_export: MAX_EVENTS_EXPORT_CEILING,
            max_events_replay: MAX_EVENTS_REPLAY_CEILING,
            allow_ceiling_override: false,
        }
    }
}

impl From<EventLogSettings> for govgate_store::EventLogConfig {
    fn from(settings: EventLogSettings) -> Self {
        Self {
            segment_size: settings.segment_size,
            snapshot_every: settings.snapshot_every,
            retention_segments: settings.retention_segments,
            max_events_export: settings.max_events_export,
            max_events_replay: settings.max_events_replay,
        }
    }
}

impl EventLogSettings {
    /// Validates positivity of rotation settings and the export/replay
    /// ceilings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `segment_size` or
    /// `snapshot_every` is zero, or if `max_events_export`/
    /// `max_events_replay` exceeds its ceiling while
    /// `allow_ceiling_override` is false.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_size == 0 {
            return Err(ConfigError::Invalid("event_log.segment_size must be greater than zero".to_string()));
        }
        if self.snapshot_every == 0 {
            return Err(ConfigError::Invalid("event_log.snapshot_every must be greater than zero".to_string()));
        }
        if !self.allow_ceiling_override && self.max_events_export > MAX_EVENTS_EXPORT_CEILING {
            return Err(ConfigError::Invalid(format!(
                "event_log.max_events_export exceeds the ceiling of {MAX_EVENTS_EXPORT_CEILING} without allow_ceiling_override"
            )));
        }
        if !self.allow_ceiling_override && self.max_events_replay > MAX_EVENTS_REPLAY_CEILING {
            return Err(ConfigError::Invalid(format!(
                "event_log.max_events_replay exceeds the ceiling of {MAX_EVENTS_REPLAY_CEILING} without allow_ceiling_override"
            )));
        }
        Ok(())
    }
}

/// Per-tenant resource quota defaults applied at registration time
/// (spec §6 "Per-tenant quotas"). Field-for-field mirror of
/// `govgate_tenant::TenantQuotas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantQuotaDefaults {
    /// Maximum event log entries a tenant may accumulate.
    pub max_events: u64,
    /// Maximum total storage, in megabytes, a tenant may occupy.
    pub max_storage_mb: u64,
    /// Maximum requests per minute accepted for a tenant.
    pub rate_limit_rpm: u32,
}

impl Default for TenantQuotaDefaults {
    fn default() -> Self {
        Self {
            max_events: 1_000_000,
            max_storage_mb: 1024,
            rate_limit_rpm: 600,
        }
    }
}

impl TenantQuotaDefaults {
    /// Validates that every quota is a positive bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if any field is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_events == 0 {
            return Err(ConfigError::Invalid("tenant_quota_defaults.max_events must be greater than zero".to_string()));
        }
        if self.max_storage_mb == 0 {
            return Err(ConfigError::Invalid(
                "tenant_quota_defaults.max_storage_mb must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit_rpm == 0 {
            return Err(ConfigError::Invalid(
                "tenant_quota_defaults.rate_limit_rpm must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level engine configuration document (`govgate.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Tenants root directory (spec §6 `base_dir`).
    pub base_dir: String,
    /// Event log tuning, applied to every tenant's instance.
    #[serde(default)]
    pub event_log: EventLogSettings,
    /// Default quotas applied when a tenant is registered without explicit
    /// overrides.
    #[serde(default)]
    pub tenant_quota_defaults: TenantQuotaDefaults,
}

impl EngineConfig {
    /// Loads and validates configuration from `path`, or from the location
    /// named by `GOVGATE_CONFIG`, or from `./govgate.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid TOML, and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        let content = std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any section fails validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("base_dir", &self.base_dir)?;
        self.event_log.validate()?;
        self.tenant_quota_defaults.validate()?;
        Ok(())
    }
}

/// Resolves the config path from the explicit argument, then the
/// environment, then the default filename.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path string against length and non-emptiness constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}
