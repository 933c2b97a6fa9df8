//! Rigorous integration along a straight path by local Taylor expansions.
//!
//! The path `a -> b` is cut into segments of half-length at most the inner
//! radius. On each segment with midpoint `m` and half-step `h`,
//!
//! ```text
//! int_{m-h}^{m+h} f = 2 sum_{k even} c_k h^(k+1) / (k+1)
//! ```
//!
//! where `c_k` are the Taylor coefficients at `m`. With `|c_k| <= M / R^k`
//! on the outer circle and `q = |h| / R`, the terms from `k = N` on are
//! bounded by `2 |h| M q^N / (1 - q)`; that tail is added to the radius.

use cert_core::errors::{CertError, ErrorInfo};
use cert_core::{stable_hash_string, Acb, Arb, Mag};
use cert_search::{bracket_search, GeometricTail, SearchLimits};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cauchy::cauchy_bound;
use crate::func::{evaluate_checked, CalcFunc};

const MAX_ORDER_LIMIT: u64 = 1 << 16;

fn config_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::Config(ErrorInfo::new(code, message.into()))
}

fn default_cauchy_depth() -> u32 {
    8
}

fn default_max_steps() -> u64 {
    1 << 20
}

/// Knobs for [`integrate_taylor_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaylorOpts {
    /// Maximum number of refinement passes of the Cauchy bound.
    #[serde(default = "default_cauchy_depth")]
    pub cauchy_depth: u32,
    /// Upper limit on the number of path segments.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Largest Taylor order the search may select; defaults to
    /// `100 * max(goal, 1)`, capped at `2^16`.
    #[serde(default)]
    pub order_limit: Option<u64>,
}

impl Default for TaylorOpts {
    fn default() -> Self {
        Self {
            cauchy_depth: default_cauchy_depth(),
            max_steps: default_max_steps(),
            order_limit: None,
        }
    }
}

impl TaylorOpts {
    fn order_limit_for(&self, goal: u32) -> u64 {
        self.order_limit
            .unwrap_or_else(|| (100 * u64::from(goal.max(1))).min(MAX_ORDER_LIMIT))
    }
}

/// Straight integration path and the radii of the local expansions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaylorPath {
    /// Start point.
    pub a: Acb,
    /// End point.
    pub b: Acb,
    /// Half-length bound for each segment; the Taylor series is summed
    /// within this distance of its center.
    pub inner_radius: f64,
    /// Radius of the circle on which the function is bounded. The function
    /// must be analytic within this distance of the path.
    pub outer_radius: f64,
}

impl TaylorPath {
    /// Path from `a` to `b` with the given radii.
    pub fn new(a: Acb, b: Acb, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            a,
            b,
            inner_radius,
            outer_radius,
        }
    }

    fn validate(&self) -> Result<(), CertError> {
        if !self.a.is_finite() || !self.b.is_finite() {
            return Err(CertError::NonFinite(
                ErrorInfo::new("non-finite-endpoint", "path endpoints must be finite")
                    .with_context("a", &self.a)
                    .with_context("b", &self.b),
            ));
        }
        let radii_ok = self.inner_radius.is_finite()
            && self.outer_radius.is_finite()
            && self.inner_radius > 0.0
            && self.inner_radius < self.outer_radius;
        if !radii_ok {
            return Err(CertError::Config(
                ErrorInfo::new("invalid-radii", "radii must satisfy 0 < inner < outer")
                    .with_context("inner_radius", self.inner_radius)
                    .with_context("outer_radius", self.outer_radius),
            ));
        }
        Ok(())
    }
}

/// Diagnostics for one path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Segment midpoint.
    pub center: Acb,
    /// Number of Taylor coefficients summed.
    pub order: u64,
    /// Bound for `|f|` on the outer circle.
    pub cauchy_bound: Mag,
    /// Truncation error added to the segment result.
    pub tail_bound: Mag,
}

/// Integral together with per-segment diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaylorReport {
    /// Ball enclosing the integral.
    pub value: Acb,
    /// Path and radii used.
    pub path: TaylorPath,
    /// Absolute accuracy goal in bits.
    pub accuracy_goal: u32,
    /// Working precision.
    pub prec: u32,
    /// Per-segment diagnostics, in path order.
    pub steps: Vec<StepSummary>,
    /// Sum of the per-segment tail bounds.
    pub total_tail: Mag,
    /// Whether both radii of `value` are at most `2^-accuracy_goal`. Rounding
    /// at a working precision close to the goal can leave this unset even
    /// though every tail met its share.
    pub goal_met: bool,
    /// Stable hash of the value and the per-segment diagnostics.
    pub fingerprint: String,
}

/// Integral of `func` along the straight path from `a` to `b`.
///
/// The result is a ball enclosing the exact integral; its radius includes
/// the truncation error, which is aimed at `2^-accuracy_goal` in absolute
/// terms. `func` must be analytic within `outer_radius` of the path.
///
/// Half of the goal is given to the truncation tails and the rest is left
/// for rounding, so a working precision a few bits above the goal is
/// needed to meet it; [`TaylorReport::goal_met`] tells whether it was.
pub fn integrate_taylor<F>(
    func: &F,
    a: &Acb,
    b: &Acb,
    inner_radius: f64,
    outer_radius: f64,
    accuracy_goal: u32,
    prec: u32,
) -> Result<Acb, CertError>
where
    F: CalcFunc + ?Sized,
{
    let path = TaylorPath::new(a.clone(), b.clone(), inner_radius, outer_radius);
    integrate_taylor_report(func, &path, accuracy_goal, prec, &TaylorOpts::default())
        .map(|report| report.value)
}

/// Like [`integrate_taylor`], returning the full [`TaylorReport`].
pub fn integrate_taylor_report<F>(
    func: &F,
    path: &TaylorPath,
    accuracy_goal: u32,
    prec: u32,
    opts: &TaylorOpts,
) -> Result<TaylorReport, CertError>
where
    F: CalcFunc + ?Sized,
{
    path.validate()?;
    if opts.max_steps == 0 {
        return Err(config_error("zero-steps", "max_steps must be at least one"));
    }

    let delta = path.b.sub(&path.a, prec);
    let steps = segment_count(&delta, path.inner_radius, opts.max_steps)?;
    let half = delta.div_ui(2 * steps, prec);
    let reach = half.upper();
    let outer = Arb::from_f64(path.outer_radius);
    let ratio = reach.div(&Mag::from_f64_lower(path.outer_radius));
    if ratio >= Mag::one() {
        return Err(config_error(
            "segment-too-long",
            "segment half-length reaches the outer radius",
        ));
    }
    let one_minus_ratio = Mag::one().sub_lower(&ratio);
    // half of 2^-goal split evenly across the segments
    let tol = Mag::from_2exp(-i64::from(accuracy_goal) - ceil_log2(steps) - 1);
    let limits = SearchLimits {
        start: 2,
        limit: opts.order_limit_for(accuracy_goal),
        window: 1,
    };
    debug!(steps, %reach, %ratio, %tol, "taylor integration");

    let mut total = Acb::zero();
    let mut total_tail = Mag::zero();
    let mut summaries = Vec::with_capacity(steps.min(1 << 12) as usize);
    for j in 0..steps {
        let center = path.a.add(&half.mul_ui(2 * j + 1, prec), prec);
        let bound = cauchy_bound(func, &center, &outer, opts.cauchy_depth, prec)?;
        if bound.is_inf() {
            return Err(CertError::NonFinite(
                ErrorInfo::new("infinite-cauchy-bound", "function is unbounded on the outer circle")
                    .with_context("center", &center)
                    .with_context("step", j),
            ));
        }
        let tail = GeometricTail {
            scale: reach.mul(&bound).mul_2exp(1).div(&one_minus_ratio),
            ratio,
        };
        let order = bracket_search(&tail, &tol, &limits).map_err(|err| {
            warn!(step = j, %center, %bound, "no Taylor order meets the goal");
            err.with_context("step", j).with_context("cauchy_bound", bound)
        })?;
        let coeffs = evaluate_checked(func, &center, order.param as usize, prec)?;
        let segment = sum_even_terms(&coeffs, &half, prec).add_error(&order.bound);
        total = total.add(&segment, prec);
        total_tail = total_tail.add(&order.bound);
        summaries.push(StepSummary {
            center,
            order: order.param,
            cauchy_bound: bound,
            tail_bound: order.bound,
        });
    }

    let goal = Mag::from_2exp(-i64::from(accuracy_goal));
    let goal_met = total.re().rad() <= goal && total.im().rad() <= goal;
    if !goal_met {
        warn!(accuracy_goal, prec, %total, "result is wider than the accuracy goal");
    }
    let fingerprint = stable_hash_string(&(&total, &summaries, accuracy_goal, prec))?;
    debug!(%total, %total_tail, goal_met, "taylor integration done");
    Ok(TaylorReport {
        value: total,
        path: path.clone(),
        accuracy_goal,
        prec,
        steps: summaries,
        total_tail,
        goal_met,
        fingerprint,
    })
}

/// Number of segments so that each half-step is at most `inner`.
fn segment_count(delta: &Acb, inner: f64, max_steps: u64) -> Result<u64, CertError> {
    let length = delta.upper().to_f64();
    let raw = (length / (2.0 * inner)).ceil().max(1.0);
    if !raw.is_finite() || raw > max_steps as f64 {
        return Err(CertError::Config(
            ErrorInfo::new("too-many-steps", "path needs more segments than allowed")
                .with_context("length", length)
                .with_context("inner_radius", inner)
                .with_context("max_steps", max_steps)
                .with_hint("increase the inner radius or max_steps"),
        ));
    }
    let mut steps = raw as u64;
    // the f64 division above may round down
    while Mag::from_f64(length).div(&Mag::from_f64_lower(2.0 * steps as f64))
        > Mag::from_f64_lower(inner)
    {
        steps += 1;
    }
    Ok(steps)
}

fn ceil_log2(n: u64) -> i64 {
    i64::from(64 - n.saturating_sub(1).leading_zeros())
}

/// `2 * sum_{k even} c_k h^(k+1) / (k+1)`.
fn sum_even_terms(coeffs: &[Acb], half: &Acb, prec: u32) -> Acb {
    let mut sum = Acb::zero();
    let mut power = half.clone();
    for (k, coeff) in coeffs.iter().enumerate() {
        if k % 2 == 0 {
            let term = coeff.mul(&power, prec).div_ui(k as u64 + 1, prec);
            sum = sum.add(&term, prec);
        }
        power = power.mul(half, prec);
    }
    sum.mul_2exp(1)
}
