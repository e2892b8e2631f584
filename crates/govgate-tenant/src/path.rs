// crates/govgate-tenant/src/path.rs
// ============================================================================
// Module: Tenant Id Validation & Safe Path Resolution
// Description: TenantId grammar and the canonicalize-then-prefix-check that
//              keeps one tenant's directory from ever escaping into another's.
// Purpose: Implement spec §4.7 "TenantId" and "Safe path resolution".
// Dependencies: govgate_core::entities::identifiers, crate::TenantError
// ============================================================================

//! ## Overview
//! A tenant id is only ever trusted after [`validate_tenant_id`] accepts it.
//! [`resolve_data_dir`] then resolves `base/tenants/<id>` and re-checks the
//! canonicalized result against the canonicalized tenants root, so a tenant
//! id that somehow encodes `..` segments (or a symlink planted inside the
//! tenants root) cannot walk a caller outside of it.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::TenantError;

/// Minimum tenant id length (inclusive), per spec §8 boundary behaviors.
pub const MIN_TENANT_ID_LEN: usize = 3;
/// Maximum tenant id length (inclusive), per spec §8 boundary behaviors.
pub const MAX_TENANT_ID_LEN: usize = 50;

/// Tenant ids that would collide with reserved top-level directories.
const RESERVED_IDS: &[&str] = &["admin", "system", "config", "backup", "logs", "tenants"];

/// Validates and normalizes a caller-supplied tenant id.
///
/// Matches `^[a-z0-9][a-z0-9-]{1,48}[a-z0-9]$` after lowercasing, and
/// rejects membership in [`RESERVED_IDS`].
///
/// # Errors
///
/// Returns [`TenantError::InvalidId`] if the id fails the grammar, or
/// [`TenantError::Reserved`] if it names a reserved directory.
pub fn validate_tenant_id(raw: &str) -> Result<String, TenantError> {
    let normalized = raw.to_lowercase();
    if normalized.len() < MIN_TENANT_ID_LEN || normalized.len() > MAX_TENANT_ID_LEN {
        return Err(TenantError::InvalidId(format!(
            "tenant id must be between {MIN_TENANT_ID_LEN} and {MAX_TENANT_ID_LEN} characters: {raw}"
        )));
    }
    let bytes = normalized.as_bytes();
    let is_alnum = |byte: u8| byte.is_ascii_lowercase() || byte.is_ascii_digit();
    if !is_alnum(bytes[0]) || !is_alnum(bytes[bytes.len() - 1]) {
        return Err(TenantError::InvalidId(format!(
            "tenant id must start and end with a letter or digit: {raw}"
        )));
    }
    if !bytes.iter().all(|&byte| is_alnum(byte) || byte == b'-') {
        return Err(TenantError::InvalidId(format!(
            "tenant id must contain only lowercase letters, digits, and hyphens: {raw}"
        )));
    }
    if RESERVED_IDS.contains(&normalized.as_str()) {
        return Err(TenantError::Reserved(normalized));
    }
    Ok(normalized)
}

/// Resolves and validates the exclusive data directory for `tenant_id` under
/// `base`, per spec §4.7 "Safe path resolution".
///
/// `tenant_id` must already be normalized by [`validate_tenant_id`]. The
/// directory is created if it does not yet exist, then canonicalized and
/// checked to fall strictly within `canonicalize(base/tenants)`.
///
/// # Errors
///
/// Returns [`TenantError::PathTraversal`] if the canonicalized result does
/// not begin with the canonicalized tenants root, or
/// [`TenantError::Fatal`] if the directories cannot be created or read.
pub fn resolve_data_dir(base: &Path, tenant_id: &str) -> Result<PathBuf, TenantError> {
    let tenants_root = base.join("tenants");
    fs::create_dir_all(&tenants_root)
        .map_err(|err| TenantError::Fatal(format!("{}: {err}", tenants_root.display())))?;
    let canonical_root = fs::canonicalize(&tenants_root)
        .map_err(|err| TenantError::Fatal(format!("{}: {err}", tenants_root.display())))?;

    let candidate = tenants_root.join(tenant_id);
    fs::create_dir_all(&candidate)
        .map_err(|err| TenantError::Fatal(format!("{}: {err}", candidate.display())))?;
    let canonical_candidate = fs::canonicalize(&candidate)
        .map_err(|err| TenantError::Fatal(format!("{}: {err}", candidate.display())))?;

    if !canonical_candidate.starts_with(&canonical_root) || canonical_candidate == canonical_root {
        return Err(TenantError::PathTraversal(tenant_id.to_string()));
    }
    Ok(canonical_candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimum_and_maximum_length() {
        let short = "a".repeat(MIN_TENANT_ID_LEN);
        let long = "a".repeat(MAX_TENANT_ID_LEN);
        assert!(validate_tenant_id(&short).is_ok());
        assert!(validate_tenant_id(&long).is_ok());
    }

    #[test]
    fn rejects_length_one_below_and_above_bounds() {
        let too_short = "a".repeat(MIN_TENANT_ID_LEN - 1);
        let too_long = "a".repeat(MAX_TENANT_ID_LEN + 1);
        assert!(validate_tenant_id(&too_short).is_err());
        assert!(validate_tenant_id(&too_long).is_err());
    }

    #[test]
    fn normalizes_to_lowercase() {
        let normalized = validate_tenant_id("Acme-Corp").expect("valid");
        assert_eq!(normalized, "acme-corp");
    }

    #[test]
    fn rejects_leading_or_trailing_hyphen() {
        assert!(validate_tenant_id("-acme").is_err());
        assert!(validate_tenant_id("acme-").is_err());
    }

    #[test]
    fn rejects_reserved_ids() {
        assert!(matches!(
            validate_tenant_id("admin"),
            Err(TenantError::Reserved(_))
        ));
        assert!(matches!(
            validate_tenant_id("tenants"),
            Err(TenantError::Reserved(_))
        ));
    }

    #[test]
    fn rejects_path_traversal_characters() {
        assert!(validate_tenant_id("../etc/passwd").is_err());
        assert!(validate_tenant_id("a/b").is_err());
        assert!(validate_tenant_id("~root").is_err());
    }

    #[test]
    fn resolves_distinct_directories_for_distinct_tenants() {
        let base = tempfile::tempdir().expect("tempdir");
        let acme = resolve_data_dir(base.path(), "acme-corp").expect("resolve acme");
        let globex = resolve_data_dir(base.path(), "globex-inc").expect("resolve globex");
        assert_ne!(acme, globex);
        assert!(acme.starts_with(base.path().join("tenants")));
    }

    #[test]
    fn resolving_the_same_tenant_twice_is_stable() {
        let base = tempfile::tempdir().expect("tempdir");
        let first = resolve_data_dir(base.path(), "acme-corp").expect("resolve once");
        let second = resolve_data_dir(base.path(), "acme-corp").expect("resolve again");
        assert_eq!(first, second);
    }
}
