//! Boundary validation tests for govgate-config.
// crates/govgate-config/tests/boundary_validation.rs
// =============================================================================
// Module: Boundary Validation Tests
// Description: Min/max boundary and edge case coverage for engine config.
// Purpose: Exercise every documented bound named in spec §6.
// =============================================================================

use std::fs;

use govgate_config::ConfigError;
use govgate_config::EngineConfig;

mod common;

type TestResult = Result<(), String>;

/// Asserts that a validation result is an error containing a specific
/// substring.
fn assert_invalid(result: Result<EngineConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

fn write_and_load(contents: &str) -> (Result<EngineConfig, ConfigError>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("govgate.toml");
    fs::write(&path, contents).expect("write config");
    let result = EngineConfig::load(Some(&path));
    (result, dir)
}

#[test]
fn segment_size_at_minimum_one_is_accepted() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nsegment_size = 1\n");
    result.map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn segment_size_at_zero_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nsegment_size = 0\n");
    assert_invalid(result, "segment_size must be greater than zero")
}

#[test]
fn snapshot_every_at_zero_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nsnapshot_every = 0\n");
    assert_invalid(result, "snapshot_every must be greater than zero")
}

#[test]
fn max_events_export_at_ceiling_is_accepted() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nmax_events_export = 10000\n");
    result.map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn max_events_export_one_above_ceiling_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nmax_events_export = 10001\n");
    assert_invalid(result, "max_events_export exceeds the ceiling")
}

#[test]
fn max_events_replay_at_ceiling_is_accepted() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nmax_events_replay = 50000\n");
    result.map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn max_events_replay_one_above_ceiling_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[event_log]\nmax_events_replay = 50001\n");
    assert_invalid(result, "max_events_replay exceeds the ceiling")
}

#[test]
fn ceiling_override_permits_arbitrarily_large_export_limits() -> TestResult {
    let (result, _dir) = write_and_load(
        "base_dir = \"/data\"\n[event_log]\nmax_events_export = 1000000\nallow_ceiling_override = true\n",
    );
    result.map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn rate_limit_rpm_at_zero_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[tenant_quota_defaults]\nrate_limit_rpm = 0\n");
    assert_invalid(result, "rate_limit_rpm must be greater than zero")
}

#[test]
fn max_storage_mb_at_zero_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"/data\"\n[tenant_quota_defaults]\nmax_storage_mb = 0\n");
    assert_invalid(result, "max_storage_mb must be greater than zero")
}

#[test]
fn base_dir_whitespace_only_is_rejected() -> TestResult {
    let (result, _dir) = write_and_load("base_dir = \"   \"\n");
    assert_invalid(result, "base_dir must be non-empty")
}

#[test]
fn minimal_config_helper_round_trips() -> TestResult {
    let (config, _dir, _path) = common::minimal_config()?;
    assert_eq!(config.base_dir, "/var/lib/govgate");
    Ok(())
}
