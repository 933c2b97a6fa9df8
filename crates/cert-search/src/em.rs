//! Truncation parameters for Euler–Maclaurin summation of Hurwitz zeta
//! style series `sum (a + k)^-s`.
//!
//! The caller owns the error bound for a given `(N, M)` pair; this module
//! decides which pairs to try, how the tolerance is scaled and where the
//! search gives up.

use cert_core::errors::{CertError, ErrorInfo};
use cert_core::{Acb, Float, Mag};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bracket::{bracket_search, SearchLimits};
use crate::estimator::MagEstimate;

fn config_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::Config(ErrorInfo::new(code, message.into()))
}

fn default_limit_factor() -> u64 {
    100
}

fn default_m_cap() -> u64 {
    2000
}

fn default_pathological_limit() -> u64 {
    u64::MAX / 4
}

fn default_imag_threshold_log2() -> i32 {
    10
}

fn default_real_threshold_log2() -> i32 {
    3
}

fn default_window() -> u64 {
    4
}

/// Tunable thresholds of the Euler–Maclaurin parameter selector.
///
/// The defaults reproduce the heuristics tuned for the Hurwitz zeta
/// function; other series should revisit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmParamOpts {
    /// Normal search limit is `limit_factor * target`.
    #[serde(default = "default_limit_factor")]
    pub limit_factor: u64,
    /// Cap on the extra secondary budget `N / 100` in [`choose_m`].
    #[serde(default = "default_m_cap")]
    pub m_cap: u64,
    /// Search limit used when slow convergence is expected.
    #[serde(default = "default_pathological_limit")]
    pub pathological_limit: u64,
    /// `|Im s| > 2^imag_threshold_log2` selects the pathological limit.
    #[serde(default = "default_imag_threshold_log2")]
    pub imag_threshold_log2: i32,
    /// `Re s > 2^real_threshold_log2` (with `a != 1`) enables tolerance
    /// rescaling by the estimated magnitude of `a^-s`.
    #[serde(default = "default_real_threshold_log2")]
    pub real_threshold_log2: i32,
    /// Bisection window.
    #[serde(default = "default_window")]
    pub window: u64,
}

impl Default for EmParamOpts {
    fn default() -> Self {
        Self {
            limit_factor: default_limit_factor(),
            m_cap: default_m_cap(),
            pathological_limit: default_pathological_limit(),
            imag_threshold_log2: default_imag_threshold_log2(),
            real_threshold_log2: default_real_threshold_log2(),
            window: default_window(),
        }
    }
}

/// Selected truncation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmParams {
    /// Number of terms summed directly.
    pub n: u64,
    /// Number of Bernoulli correction terms.
    pub m: u64,
    /// Error bound reported at `(n, m)`.
    pub bound: Mag,
    /// Tolerance the bound was checked against.
    pub tolerance: Mag,
    /// Search limit in force.
    pub limit: u64,
    /// Number of bound evaluations.
    pub evaluations: u64,
}

/// Secondary parameter derived from `n`: `min(n, target + min(n / 100, cap))`.
pub fn choose_m(n: u64, target: u64, cap: u64) -> u64 {
    n.min(target.saturating_add((n / 100).min(cap)))
}

/// Rough magnitude of `a^-s` computed from the midpoints, with `|a|`
/// evaluated at `prec` bits.
///
/// This only scales the tolerance, so it need not be rigorous; a result that
/// cannot be represented is reported as [`MagEstimate::Overflowed`].
pub fn estimate_mag(s: &Acb, a: &Acb, prec: u32) -> MagEstimate {
    let (x, y) = (a.re().mid_f64(), a.im().mid_f64());
    let (sigma, t) = (s.re().mid_f64(), s.im().mid_f64());
    // |a^-s| = exp(t arg(a) - sigma ln|a|)
    let ln_abs = a.abs(prec).mid_f64().ln();
    let exponent = t * y.atan2(x) - sigma * ln_abs;
    MagEstimate::from_log2(exponent * std::f64::consts::LOG2_E)
}

/// Tolerance for a `target`-bit result.
///
/// Flat `2^-target`, unless `a != 1` and `Re s` is large, in which case the
/// tolerance is relative to the estimated size of the leading term `a^-s`.
pub fn em_tolerance(s: &Acb, a: &Acb, target: u64, prec: u32, opts: &EmParamOpts) -> Mag {
    let flat = Mag::from_2exp(-(target.min(i64::MAX as u64) as i64));
    let threshold = Float::from_2exp(i64::from(opts.real_threshold_log2));
    if !a.is_one() && *s.re().mid() > threshold {
        estimate_mag(s, a, prec).or_one().mul(&flat)
    } else {
        flat
    }
}

/// Search limit for `s`: effectively unbounded high up in the critical strip,
/// proportional to the target otherwise.
pub fn em_limit(s: &Acb, target: u64, opts: &EmParamOpts) -> u64 {
    if s.im().mid().abs() > Float::from_2exp(i64::from(opts.imag_threshold_log2)) {
        opts.pathological_limit
    } else {
        target.saturating_mul(opts.limit_factor)
    }
}

/// Chooses `(N, M)` so that `bound(N, M)` is at most the tolerance for a
/// `target`-bit evaluation at `(s, a)`.
///
/// `bound` is the caller's rigorous truncation error bound, evaluated at
/// `(N, M, prec)`; it is called a logarithmic number of times in the
/// returned `N`. Fails when the search limit is exhausted (retry at higher
/// precision) and propagates any error returned by `bound`.
pub fn choose_em_params<F>(
    s: &Acb,
    a: &Acb,
    target: u64,
    prec: u32,
    opts: &EmParamOpts,
    bound: F,
) -> Result<EmParams, CertError>
where
    F: Fn(u64, u64, u32) -> Result<Mag, CertError>,
{
    if !s.is_finite() || !a.is_finite() {
        return Err(CertError::NonFinite(
            ErrorInfo::new("non-finite-input", "s and a must be finite balls")
                .with_context("s", s)
                .with_context("a", a),
        ));
    }
    if opts.window == 0 {
        return Err(config_error("zero-window", "bisection window must be at least one"));
    }
    let tolerance = em_tolerance(s, a, target, prec, opts);
    let limit = em_limit(s, target, opts);
    debug!(target, prec, %tolerance, limit, "choosing Euler-Maclaurin parameters");

    let cap = opts.m_cap;
    let estimator = |n: u64| bound(n, choose_m(n, target, cap), prec);
    let limits = SearchLimits {
        start: 2,
        limit,
        window: opts.window,
    };
    let outcome = bracket_search(&estimator, &tolerance, &limits)?;
    Ok(EmParams {
        n: outcome.param,
        m: choose_m(outcome.param, target, cap),
        bound: outcome.bound,
        tolerance,
        limit,
        evaluations: outcome.evaluations,
    })
}
