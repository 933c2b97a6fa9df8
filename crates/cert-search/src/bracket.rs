//! Doubling then bisection search for the smallest parameter whose error
//! bound meets a tolerance.

use cert_core::errors::{CertError, ErrorInfo};
use cert_core::Mag;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::estimator::BoundEstimator;

fn internal_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::Internal(ErrorInfo::new(code, message.into()))
}

fn config_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::Config(ErrorInfo::new(code, message.into()))
}

fn default_start() -> u64 {
    2
}

fn default_limit() -> u64 {
    u64::MAX / 4
}

fn default_window() -> u64 {
    4
}

/// Bracket configuration for [`bracket_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// First parameter evaluated. The implicit lower bracket is `start / 2`.
    #[serde(default = "default_start")]
    pub start: u64,
    /// Doubling stops with a failure once the upper bracket exceeds this.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Bisection stops once `high - low` is at most this width.
    #[serde(default = "default_window")]
    pub window: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            start: default_start(),
            limit: default_limit(),
            window: default_window(),
        }
    }
}

impl SearchLimits {
    /// Default start and window with an explicit limit.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), CertError> {
        if self.start == 0 {
            return Err(config_error("zero-start", "search must start above zero"));
        }
        if self.window == 0 {
            return Err(config_error(
                "zero-window",
                "bisection window must be at least one",
            ));
        }
        Ok(())
    }
}

/// Result of a successful [`bracket_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Smallest parameter found whose bound meets the tolerance.
    pub param: u64,
    /// Bound reported by the estimator at `param`; never above the tolerance.
    pub bound: Mag,
    /// Final lower bracket. Every evaluated parameter at or below it failed.
    pub low: u64,
    /// Number of estimator calls made.
    pub evaluations: u64,
}

fn evaluate_at<E>(estimator: &E, param: u64, evaluations: &mut u64) -> Result<Mag, CertError>
where
    E: BoundEstimator + ?Sized,
{
    *evaluations += 1;
    let bound = estimator.estimate(param)?;
    trace!(param, %bound, "search evaluation");
    Ok(bound)
}

/// Finds a parameter `n` with `estimator.estimate(n) <= tol`.
///
/// Evaluates `start`, doubles while the bound exceeds `tol`, then bisects the
/// bracket `(low, high]` until it is at most `window` wide. The number of
/// estimator calls is logarithmic in the returned parameter. An infinite
/// estimate counts as a miss; an estimator error aborts the search.
///
/// Fails with a `Search` error when the upper bracket passes `limit`
/// without meeting the tolerance, and with an `Internal` error if doubling
/// would overflow `u64`.
pub fn bracket_search<E>(
    estimator: &E,
    tol: &Mag,
    limits: &SearchLimits,
) -> Result<SearchOutcome, CertError>
where
    E: BoundEstimator + ?Sized,
{
    limits.validate()?;
    let mut evaluations = 0u64;
    let mut low = limits.start / 2;
    let mut high = limits.start;
    let mut high_bound = evaluate_at(estimator, high, &mut evaluations)?;

    if high_bound <= *tol {
        debug!(param = high, %high_bound, "tolerance met at first evaluation");
        return Ok(SearchOutcome {
            param: high,
            bound: high_bound,
            low,
            evaluations,
        });
    }

    while high_bound > *tol {
        if high > limits.limit {
            warn!(high, limit = limits.limit, %high_bound, %tol, "search limit exhausted");
            return Err(CertError::Search(
                ErrorInfo::new(
                    "tolerance-unreachable",
                    "no parameter within the search limit meets the tolerance",
                )
                .with_context("limit", limits.limit)
                .with_context("last_param", high)
                .with_context("last_bound", high_bound)
                .with_context("tolerance", tol)
                .with_hint("raise the working precision or the search limit"),
            ));
        }
        low = high;
        high = high.checked_mul(2).ok_or_else(|| {
            internal_error("search-overflow", format!("doubling {low} overflows u64"))
        })?;
        high_bound = evaluate_at(estimator, high, &mut evaluations)?;
        debug!(low, high, %high_bound, "bracket doubled");
    }

    while high - low > limits.window {
        let mid = low + (high - low) / 2;
        let mid_bound = evaluate_at(estimator, mid, &mut evaluations)?;
        if mid_bound <= *tol {
            high = mid;
            high_bound = mid_bound;
        } else {
            low = mid;
        }
    }

    debug!(param = high, low, evaluations, %high_bound, "search converged");
    Ok(SearchOutcome {
        param: high,
        bound: high_bound,
        low,
        evaluations,
    })
}
