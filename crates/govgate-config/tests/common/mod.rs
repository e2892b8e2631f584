//! Shared helpers for govgate-config integration tests.

use std::fs;
use std::path::PathBuf;

use govgate_config::EngineConfig;
use tempfile::TempDir;

/// Writes a minimal but valid `govgate.toml` to a fresh temp directory and
/// loads it. The returned [`TempDir`] must be kept alive by the caller for
/// as long as `path` is used.
pub fn minimal_config() -> Result<(EngineConfig, TempDir, PathBuf), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("govgate.toml");
    fs::write(&path, "base_dir = \"/var/lib/govgate\"\n").map_err(|err| err.to_string())?;
    let config = EngineConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    Ok((config, dir, path))
}
