use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::CertError;
use crate::serde::to_canonical_json_bytes;

/// Hex SHA-256 of the canonical JSON encoding of `value`.
///
/// Used as a reproducibility fingerprint: the same inputs at the same
/// precision give the same string.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, CertError> {
    let mut hasher = Sha256::new();
    hasher.update(to_canonical_json_bytes(value)?);
    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect())
}
