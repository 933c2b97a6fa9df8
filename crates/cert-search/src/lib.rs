#![deny(missing_docs)]
#![doc = "Monotone error-bound search: the reusable doubling/bisection bracket, estimator capability and Euler–Maclaurin parameter selection."]

/// Doubling and bisection search for the smallest passing parameter.
pub mod bracket;
/// Euler–Maclaurin truncation parameters.
pub mod em;
/// The error-bound estimator capability.
pub mod estimator;

pub use bracket::{bracket_search, SearchLimits, SearchOutcome};
pub use em::{choose_em_params, choose_m, em_limit, em_tolerance, estimate_mag, EmParamOpts, EmParams};
pub use estimator::{BoundEstimator, GeometricTail, MagEstimate};
