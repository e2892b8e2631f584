// crates/govgate-core/src/hashing.rs
// ============================================================================
// Module: Canonical Hashing
// Description: RFC 8785 JSON canonicalization and content hashing utilities.
// Purpose: Provide deterministic hashes for event log entries and backups.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! The event log's hash chain (spec §4.2) depends on hashing canonicalized
//! JSON rather than whatever byte order a particular serializer happens to
//! produce. This module hashes all canonical JSON using RFC 8785 (JCS) so
//! that semantically equal payloads — maps with permuted keys, `1` vs `1.0`
//! — produce identical digests.

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing, the only algorithm used by the event log.
    Sha256,
}

/// Default hash algorithm for the event log and backup manifests.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// Distinguished genesis value used as `previous_hash` for entry 0.
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000000000000000";

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Creates a new digest from raw bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }

    /// Returns the genesis digest used to seed the event log's hash chain.
    #[must_use]
    pub fn genesis() -> Self {
        Self {
            algorithm: DEFAULT_HASH_ALGORITHM,
            value: GENESIS_HASH.to_string(),
        }
    }
}

impl std::fmt::Display for HashDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails, which
/// includes values containing non-finite floats (`NaN`/`Infinity`).
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON using the provided algorithm.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            HashDigest::new(HashAlgorithm::Sha256, &digest)
        }
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use serde_json::Value;
    use serde_json::json;

    #[test]
    fn canonical_hash_is_order_independent_for_maps() {
        let mut map_a = Map::new();
        map_a.insert("b".to_string(), json!(2));
        map_a.insert("a".to_string(), json!(1));

        let mut map_b = Map::new();
        map_b.insert("a".to_string(), json!(1));
        map_b.insert("b".to_string(), json!(2));

        let hash_a =
            hash_canonical_json(HashAlgorithm::Sha256, &Value::Object(map_a)).expect("hash a");
        let hash_b =
            hash_canonical_json(HashAlgorithm::Sha256, &Value::Object(map_b)).expect("hash b");

        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn canonical_hash_normalizes_numeric_representation() {
        let hash_a = hash_canonical_json(HashAlgorithm::Sha256, &json!(1.0)).expect("hash a");
        let hash_b = hash_canonical_json(HashAlgorithm::Sha256, &json!(1)).expect("hash b");
        assert_eq!(hash_a, hash_b);
    }

    #[derive(Serialize)]
    struct FloatWrapper {
        value: f64,
    }

    #[test]
    fn canonical_hash_rejects_nan() {
        let err = hash_canonical_json(HashAlgorithm::Sha256, &FloatWrapper { value: f64::NAN })
            .unwrap_err();
        assert!(matches!(err, HashError::Canonicalization(_)));
    }

    #[test]
    fn genesis_digest_is_stable() {
        let a = HashDigest::genesis();
        let b = HashDigest::genesis();
        assert_eq!(a, b);
    }
}
