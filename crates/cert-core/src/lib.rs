#![deny(missing_docs)]
#![doc = "Ball and magnitude arithmetic, the shared error taxonomy and canonical serde helpers for the cert engine."]

/// Complex balls.
pub mod acb;
/// Real balls with multiprecision midpoints.
pub mod arb;
mod elementary;
/// Structured errors shared by every cert crate.
pub mod errors;
/// Exact binary floating-point values with big-integer mantissas.
pub mod float;
/// Canonical hashing helpers.
pub mod hash;
/// Outward-rounded magnitude bounds.
pub mod mag;
/// Bit-level `f64` helpers.
pub mod rounding;
/// Canonical JSON and YAML helpers.
pub mod serde;

pub use acb::Acb;
pub use arb::Arb;
pub use errors::{CertError, ErrorInfo};
pub use float::Float;
pub use hash::stable_hash_string;
pub use mag::Mag;
pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};

/// Precision used when a caller has no preference: that of an `f64`.
pub const DEFAULT_PREC: u32 = rounding::F64_BITS;
