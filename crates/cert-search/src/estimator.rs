//! Error-bound estimators consumed by the bracket search.

use cert_core::{CertError, Mag};
use serde::{Deserialize, Serialize};

/// Capability to bound the truncation error for an integer parameter.
///
/// Implementations are expected to be non-increasing in `param`, although
/// the search tolerates local violations near the precision floor. An
/// infinite [`Mag`] is a legitimate answer meaning "no useful bound yet";
/// an `Err` aborts the search.
pub trait BoundEstimator {
    /// Returns an upper bound on the error incurred at `param`.
    fn estimate(&self, param: u64) -> Result<Mag, CertError>;
}

impl<F> BoundEstimator for F
where
    F: Fn(u64) -> Result<Mag, CertError>,
{
    fn estimate(&self, param: u64) -> Result<Mag, CertError> {
        self(param)
    }
}

const LOG2_RANGE: f64 = 4_503_599_627_370_496.0;

/// Outcome of a magnitude pre-estimate that may overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum MagEstimate {
    /// The estimate is finite and positive.
    Finite(Mag),
    /// The estimate could not be represented.
    Overflowed,
}

impl MagEstimate {
    /// Builds the estimate `2^log2` rounded up. Non-finite exponents, and
    /// exponents outside the `Mag` range, are reported as overflow.
    pub fn from_log2(log2: f64) -> Self {
        if !log2.is_finite() || log2.abs() > LOG2_RANGE {
            return MagEstimate::Overflowed;
        }
        let whole = log2.floor();
        let frac = Mag::from_f64((log2 - whole).exp2());
        MagEstimate::Finite(frac.mul_2exp(whole as i64))
    }

    /// Returns the estimate, or one when it overflowed.
    ///
    /// One is the neutral scale: a tolerance multiplied by it is left as an
    /// absolute tolerance.
    pub fn or_one(self) -> Mag {
        match self {
            MagEstimate::Finite(mag) => mag,
            MagEstimate::Overflowed => Mag::one(),
        }
    }
}

/// Tail bound of a geometric series: `scale * ratio^n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricTail {
    /// Bound for the tail when no terms are summed.
    pub scale: Mag,
    /// Common ratio, expected to be below one.
    pub ratio: Mag,
}

impl BoundEstimator for GeometricTail {
    fn estimate(&self, param: u64) -> Result<Mag, CertError> {
        Ok(self.scale.mul(&self.ratio.pow_ui(param)))
    }
}
