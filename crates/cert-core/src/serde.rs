//! Canonical JSON and YAML helpers for cert payloads.
//!
//! Canonical JSON sorts every object by key, so that equal values always
//! encode to the same bytes and can be fingerprinted.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::{CertError, ErrorInfo};

fn serde_error(code: &str, err: impl ToString) -> CertError {
    CertError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Recursively orders object keys in place.
fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (key, mut inner) in entries {
                sort_keys(&mut inner);
                map.insert(key, inner);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Serializes `value` into canonical JSON bytes.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CertError> {
    let mut tree = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    sort_keys(&mut tree);
    serde_json::to_vec(&tree).map_err(|err| serde_error("json-write", err))
}

/// Restores a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, CertError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json-read", err))
}

/// Serializes a value (typically an options struct) into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, CertError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml-encode", err))
}

/// Deserializes options from a YAML payload; missing fields take defaults.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, CertError> {
    serde_yaml::from_slice(data).map_err(|err| {
        CertError::Config(
            ErrorInfo::new("yaml-read", err.to_string())
                .with_hint("check field names against the options struct"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn key_order_does_not_leak_into_bytes() {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        for key in ["zeta", "alpha", "mid", "rad"] {
            forward.insert(key, 1);
        }
        for key in ["rad", "mid", "alpha", "zeta"] {
            backward.insert(key, 1);
        }
        let a = to_canonical_json_bytes(&forward).expect("encode");
        let b = to_canonical_json_bytes(&backward).expect("encode");
        assert_eq!(a, b);
        assert!(String::from_utf8(a).expect("utf8").starts_with("{\"alpha\""));
    }
}
