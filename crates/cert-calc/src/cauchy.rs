//! Bounds for `|f|` on a circle, used to bound Taylor coefficients through
//! the Cauchy estimate `|f^(k)(z0) / k!| <= M / R^k`.

use cert_core::errors::{CertError, ErrorInfo};
use cert_core::{Acb, Arb, Mag};
use tracing::{debug, trace};

use crate::func::{evaluate_checked, CalcFunc};

/// Samples per pass at depth zero; each further pass doubles it.
const BASE_SAMPLES: u64 = 16;
/// Refinement stops once the bound is known to this many bits.
const ACCURACY_BITS: i64 = 3;
/// Extra working precision for the sample points.
const GUARD_BITS: u32 = 10;

fn non_finite_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::NonFinite(ErrorInfo::new(code, message.into()))
}

/// Upper bound for `|f(z)|` over the circle `|z - center| = radius`.
///
/// Pass `d` covers the circle with `16 * 2^d` arcs; each arc is enclosed in
/// a single ball and `f` is evaluated (value only) on it. Passes continue
/// until the largest sampled magnitude is known to a few bits or
/// `max_depth` passes have run, and the smallest upper bound seen is
/// returned. At least one pass always runs.
///
/// Fails with `NonFinite` if the circle is not finite or `f` returns a
/// non-finite value on some arc; callback failures are propagated unchanged.
pub fn cauchy_bound<F>(
    func: &F,
    center: &Acb,
    radius: &Arb,
    max_depth: u32,
    prec: u32,
) -> Result<Mag, CertError>
where
    F: CalcFunc + ?Sized,
{
    if !center.is_finite() || !radius.is_finite() {
        return Err(non_finite_error("non-finite-circle", "center and radius must be finite")
            .with_context("center", center)
            .with_context("radius", radius));
    }
    let wp = prec.saturating_add(GUARD_BITS);
    let mut best = Mag::inf();
    let mut samples = BASE_SAMPLES;

    for depth in 0..max_depth.max(1) {
        let mut upper = Mag::zero();
        let mut lower = Mag::zero();
        let arc = Mag::one().div(&Mag::from_f64_lower(samples as f64));
        for i in 0..samples {
            // angle ((2i + 1) +/- 1) pi / n covers the i-th arc
            let turn = Arb::new((2 * i + 1) as f64 / samples as f64, arc);
            let (sin, cos) = turn.sin_cos_pi(wp);
            let point = center.add(&Acb::new(cos, sin).mul_arb(radius, wp), wp);
            let value = evaluate_checked(func, &point, 1, prec)?;
            let magnitude = value[0].abs(prec);
            upper = upper.max(magnitude.upper());
            lower = lower.max(magnitude.lower());
        }
        trace!(depth, samples, %upper, %lower, "cauchy pass");
        best = best.min(upper);
        if lower.add(&upper.mul_2exp(-ACCURACY_BITS)) >= upper {
            break;
        }
        samples = samples.saturating_mul(2);
    }

    debug!(%best, %radius, "cauchy bound");
    Ok(best)
}
