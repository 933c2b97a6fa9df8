//! Real balls: a [`Float`] midpoint with a [`Mag`] radius.
//!
//! Every operation computes the midpoint at the requested working precision
//! and adds the rounding error to the radius, so `prec` sets the granularity
//! of the result with no upper limit.

use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use serde::{Deserialize, Serialize};

use crate::elementary::{pi_fixed, sin_cos_fixed};
use crate::float::Float;
use crate::mag::Mag;

/// Precision used to compare balls; differences are bounded, never rounded
/// away.
const COMPARE_PREC: u32 = 128;
/// Guard bits for the fixed-point transcendental kernels.
const KERNEL_GUARD_BITS: u64 = 32;
/// Arguments beyond `2^30` in magnitude get the enclosure `[-1, 1]`.
const TRIG_ARG_LIMIT: f64 = 1_073_741_824.0;

/// Real ball `[mid +/- rad]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arb {
    mid: Float,
    rad: Mag,
}

fn fixed_to_float(value: BigUint, negative: bool, wp: u64) -> Float {
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Float::from_parts(BigInt::from_biguint(sign, value), -(wp as i64))
}

fn units(count: u64, wp: u64) -> Mag {
    Mag::from_f64(count as f64).mul_2exp(-(wp as i64))
}

impl Arb {
    /// Ball with an `f64` midpoint. A non-finite midpoint gives the
    /// indeterminate ball `[0 +/- inf]`.
    pub fn new(mid: f64, rad: Mag) -> Self {
        match Float::from_f64(mid) {
            Some(mid) => Self { mid, rad },
            None => Self::indeterminate(),
        }
    }

    /// Ball with the given midpoint and radius.
    pub fn from_parts(mid: Float, rad: Mag) -> Self {
        Self { mid, rad }
    }

    /// Exact ball around `x`.
    pub fn from_f64(x: f64) -> Self {
        Self::new(x, Mag::zero())
    }

    /// Exact ball around the integer `n`.
    pub fn from_i64(n: i64) -> Self {
        Self::from_parts(Float::from_i64(n), Mag::zero())
    }

    /// Exact ball around the integer `n`.
    pub fn from_u64(n: u64) -> Self {
        Self::from_parts(Float::from_u64(n), Mag::zero())
    }

    /// Exact zero.
    pub fn zero() -> Self {
        Self::from_parts(Float::zero(), Mag::zero())
    }

    /// Exact one.
    pub fn one() -> Self {
        Self::from_parts(Float::one(), Mag::zero())
    }

    /// The ball `[0 +/- inf]`, containing every real number.
    pub fn indeterminate() -> Self {
        Self::from_parts(Float::zero(), Mag::inf())
    }

    fn unit_interval() -> Self {
        Self::from_parts(Float::zero(), Mag::one())
    }

    /// Ball enclosing `pi`.
    pub fn const_pi(prec: u32) -> Self {
        let wp = u64::from(prec) + KERNEL_GUARD_BITS;
        let (pi, err) = pi_fixed(wp);
        Self::rounded(fixed_to_float(pi, false, wp), units(err, wp), prec)
    }

    /// Midpoint of the ball.
    pub fn mid(&self) -> &Float {
        &self.mid
    }

    /// Midpoint rounded to an `f64`, for estimates and display.
    pub fn mid_f64(&self) -> f64 {
        self.mid.to_f64()
    }

    /// Radius of the ball.
    pub fn rad(&self) -> Mag {
        self.rad
    }

    /// The radius is finite.
    pub fn is_finite(&self) -> bool {
        self.rad.is_finite()
    }

    /// The radius is exactly zero.
    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// The ball is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.mid.is_zero() && self.is_exact()
    }

    /// The ball is exactly one.
    pub fn is_one(&self) -> bool {
        self.mid.is_one() && self.is_exact()
    }

    /// Upper bound for `|x|` over the ball.
    pub fn upper(&self) -> Mag {
        self.mid.mag_upper().add(&self.rad)
    }

    /// Lower bound for `|x|` over the ball.
    pub fn lower(&self) -> Mag {
        self.mid.mag_lower().sub_lower(&self.rad)
    }

    /// Widens the radius by `err`.
    pub fn add_error(&self, err: &Mag) -> Self {
        Self::from_parts(self.mid.clone(), self.rad.add(err))
    }

    /// Upper and lower bounds for `|x - mid|`.
    fn distance(&self, x: &Float) -> (Mag, Mag) {
        let (diff, err) = x.sub_round(&self.mid, COMPARE_PREC);
        (
            diff.mag_upper().add(&err),
            diff.mag_lower().sub_lower(&err),
        )
    }

    /// True if `x` certainly lies in the ball.
    pub fn contains_f64(&self, x: f64) -> bool {
        match Float::from_f64(x) {
            Some(x) => self.contains_float(&x),
            None => false,
        }
    }

    /// True if `x` certainly lies in the ball.
    pub fn contains_float(&self, x: &Float) -> bool {
        if self.rad.is_inf() {
            return true;
        }
        self.distance(x).0 <= self.rad
    }

    /// True if every point of `other` certainly lies in the ball.
    pub fn contains(&self, other: &Arb) -> bool {
        if self.rad.is_inf() {
            return true;
        }
        self.distance(&other.mid).0.add(&other.rad) <= self.rad
    }

    /// True if the two balls may share a point.
    pub fn overlaps(&self, other: &Arb) -> bool {
        self.distance(&other.mid).1 <= self.rad.add(&other.rad)
    }

    /// Result ball from an unrounded midpoint, a bound for the error already
    /// committed and the working precision.
    fn rounded(mid: Float, rad: Mag, prec: u32) -> Self {
        let (mid, err) = mid.round(prec);
        Self::from_parts(mid, rad.add(&err))
    }

    /// Negation (exact).
    pub fn neg(&self) -> Self {
        Self::from_parts(self.mid.neg(), self.rad)
    }

    /// Absolute value of the midpoint, radius kept (exact).
    pub fn abs(&self) -> Self {
        Self::from_parts(self.mid.abs(), self.rad)
    }

    /// Ball containing `self + other`.
    pub fn add(&self, other: &Arb, prec: u32) -> Self {
        let (sum, err) = self.mid.add_round(&other.mid, prec);
        Self::from_parts(sum, self.rad.add(&other.rad).add(&err))
    }

    /// Ball containing `self - other`.
    pub fn sub(&self, other: &Arb, prec: u32) -> Self {
        let (diff, err) = self.mid.sub_round(&other.mid, prec);
        Self::from_parts(diff, self.rad.add(&other.rad).add(&err))
    }

    /// Ball containing `self * other`.
    pub fn mul(&self, other: &Arb, prec: u32) -> Self {
        let (prod, err) = self.mid.mul_round(&other.mid, prec);
        let rad = self
            .mid
            .mag_upper()
            .mul(&other.rad)
            .add(&other.mid.mag_upper().mul(&self.rad))
            .add(&self.rad.mul(&other.rad));
        Self::from_parts(prod, rad.add(&err))
    }

    /// Ball containing `self^2`.
    pub fn sqr(&self, prec: u32) -> Self {
        self.mul(self, prec)
    }

    /// Ball containing `self * n`.
    pub fn mul_ui(&self, n: u64, prec: u32) -> Self {
        self.mul(&Arb::from_u64(n), prec)
    }

    /// Ball containing `self * 2^k` (exact).
    pub fn mul_2exp(&self, k: i64) -> Self {
        Self::from_parts(self.mid.mul_2exp(k), self.rad.mul_2exp(k))
    }

    /// Ball containing `self / n`; division by zero is indeterminate.
    pub fn div_ui(&self, n: u64, prec: u32) -> Self {
        let divisor = Float::from_u64(n);
        match self.mid.div_round(&divisor, prec) {
            Some((quot, err)) => {
                Self::from_parts(quot, self.rad.div(&divisor.mag_lower()).add(&err))
            }
            None => Self::indeterminate(),
        }
    }

    /// Ball containing `self / other`; indeterminate when `other` may vanish.
    pub fn div(&self, other: &Arb, prec: u32) -> Self {
        let denom_lower = other.lower();
        if denom_lower.is_zero() {
            return Self::indeterminate();
        }
        let Some((quot, err)) = self.mid.div_round(&other.mid, prec) else {
            return Self::indeterminate();
        };
        // |a/b - am/bm| <= (|am| rb + |bm| ra) / (|bm| (|bm| - rb))
        let numer = self
            .mid
            .mag_upper()
            .mul(&other.rad)
            .add(&other.mid.mag_upper().mul(&self.rad));
        let denom = other.mid.mag_lower().mul_lower(&denom_lower);
        Self::from_parts(quot, numer.div(&denom).add(&err))
    }

    /// Ball containing `sqrt(self)`; indeterminate unless the ball is
    /// positive or exactly zero.
    pub fn sqrt(&self, prec: u32) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let lower = self.lower();
        if self.mid.is_negative() || lower.is_zero() {
            return Self::indeterminate();
        }
        let Some((root, err)) = self.mid.sqrt_round(prec) else {
            return Self::indeterminate();
        };
        // |sqrt(x) - sqrt(m)| <= r / sqrt(m - r)
        let spread = self.rad.div(&lower.sqrt_lower());
        Self::from_parts(root, spread.add(&err))
    }

    /// Accumulates `self + x * y`.
    pub fn addmul(&self, x: &Arb, y: &Arb, prec: u32) -> Self {
        self.add(&x.mul(y, prec), prec)
    }

    /// Accumulates `self - x * y`.
    pub fn submul(&self, x: &Arb, y: &Arb, prec: u32) -> Self {
        self.sub(&x.mul(y, prec), prec)
    }

    /// Balls containing `sin(self)` and `cos(self)`.
    pub fn sin_cos(&self, prec: u32) -> (Arb, Arb) {
        if self.is_zero() {
            return (Arb::zero(), Arb::one());
        }
        let approx = self.mid.to_f64();
        if !self.is_finite() || approx.abs() > TRIG_ARG_LIMIT {
            return (Self::unit_interval(), Self::unit_interval());
        }
        // x = r + quarter * pi / 2 with |r| <= pi / 4 (plus slack)
        let quarter = (approx / std::f64::consts::FRAC_PI_2).round() as i64;
        let wp = u64::from(prec) + KERNEL_GUARD_BITS;
        let pi_wp = wp + u64::from(64 - quarter.unsigned_abs().leading_zeros()) + 2;
        let (pi, pi_err) = pi_fixed(pi_wp);
        let half_pi = fixed_to_float(pi, false, pi_wp + 1);
        let reduced = self
            .mid
            .add_exact(&half_pi.mul(&Float::from_i64(-quarter)));
        let mut arg_err = units(pi_err, pi_wp + 1).mul(&Mag::from_f64(quarter.unsigned_abs() as f64));

        // |r| as a fixed-point integer, truncated
        let shift = reduced.exponent().saturating_add(wp as i64);
        let magnitude = reduced.mantissa().magnitude();
        let r_fixed = if shift >= 0 {
            magnitude << shift as u64
        } else {
            arg_err = arg_err.add(&units(1, wp));
            magnitude >> shift.unsigned_abs()
        };
        let (s, c, kernel_err) = sin_cos_fixed(&r_fixed, wp);
        let negative = reduced.is_negative();

        // sin and cos are 1-Lipschitz and never move by more than 2
        let spread = self
            .rad
            .add(&arg_err)
            .min(Mag::from_f64(2.0))
            .add(&units(kernel_err, wp));
        let (sin_r, cos_r) = (
            fixed_to_float(s, negative, wp),
            fixed_to_float(c, false, wp),
        );
        let (sin, cos) = match quarter.rem_euclid(4) {
            0 => (sin_r, cos_r),
            1 => (cos_r, sin_r.neg()),
            2 => (sin_r.neg(), cos_r.neg()),
            _ => (cos_r.neg(), sin_r),
        };
        (
            Self::rounded(sin, spread, prec),
            Self::rounded(cos, spread, prec),
        )
    }

    /// Balls containing `sin(pi * self)` and `cos(pi * self)`.
    ///
    /// Midpoints that are multiples of `1/2` give exact values.
    pub fn sin_cos_pi(&self, prec: u32) -> (Arb, Arb) {
        let approx = self.mid.to_f64();
        if !self.is_finite() || approx.abs() > TRIG_ARG_LIMIT {
            return (Self::unit_interval(), Self::unit_interval());
        }
        let wp = prec.saturating_add(8);
        let pi = Arb::const_pi(wp);
        let spread = pi.upper().mul(&self.rad).min(Mag::from_f64(2.0));
        if let Some(quarter) = self.mid.half_turns_mod4() {
            let (s, c) = match quarter {
                0 => (0, 1),
                1 => (1, 0),
                2 => (0, -1),
                _ => (-1, 0),
            };
            return (
                Self::from_parts(Float::from_i64(s), spread),
                Self::from_parts(Float::from_i64(c), spread),
            );
        }
        // subtracting an even integer is exact and leaves |x| <= 1
        let turns = (approx / 2.0).round() as i64;
        let reduced = self.mid.add_exact(&Float::from_i64(-2 * turns));
        let arg = Arb::from_parts(reduced, self.rad).mul(&pi, wp);
        arg.sin_cos(prec)
    }
}

impl Default for Arb {
    fn default() -> Self {
        Arb::zero()
    }
}

impl fmt::Display for Arb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} +/- {}]", self.mid, self.rad)
    }
}
