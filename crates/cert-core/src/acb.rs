//! Complex balls as pairs of real balls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arb::Arb;
use crate::float::Float;
use crate::mag::Mag;
use crate::DEFAULT_PREC;

/// Complex ball with independent real and imaginary [`Arb`] parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Acb {
    re: Arb,
    im: Arb,
}

impl Acb {
    /// Builds a complex ball from its parts.
    pub fn new(re: Arb, im: Arb) -> Self {
        Self { re, im }
    }

    /// Exact complex number `re + i im`.
    pub fn from_f64(re: f64, im: f64) -> Self {
        Self::new(Arb::from_f64(re), Arb::from_f64(im))
    }

    /// Real ball embedded in the complex plane.
    pub fn from_real(re: Arb) -> Self {
        Self::new(re, Arb::zero())
    }

    /// Exact zero.
    pub fn zero() -> Self {
        Self::from_f64(0.0, 0.0)
    }

    /// Exact one.
    pub fn one() -> Self {
        Self::from_f64(1.0, 0.0)
    }

    /// Real part.
    pub fn re(&self) -> &Arb {
        &self.re
    }

    /// Imaginary part.
    pub fn im(&self) -> &Arb {
        &self.im
    }

    /// Both parts are finite balls.
    pub fn is_finite(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Both radii are zero.
    pub fn is_exact(&self) -> bool {
        self.re.is_exact() && self.im.is_exact()
    }

    /// The ball is exactly one.
    pub fn is_one(&self) -> bool {
        self.re.is_one() && self.im.is_zero()
    }

    /// The ball is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    /// True if `re + i im` certainly lies in the ball.
    pub fn contains_point(&self, re: f64, im: f64) -> bool {
        self.re.contains_f64(re) && self.im.contains_f64(im)
    }

    /// True if every point of `other` certainly lies in the ball.
    pub fn contains(&self, other: &Acb) -> bool {
        self.re.contains(&other.re) && self.im.contains(&other.im)
    }

    /// True if the two balls may share a point.
    pub fn overlaps(&self, other: &Acb) -> bool {
        self.re.overlaps(&other.re) && self.im.overlaps(&other.im)
    }

    /// Adds `err` to the radius of both parts.
    pub fn add_error(&self, err: &Mag) -> Self {
        Self::new(self.re.add_error(err), self.im.add_error(err))
    }

    /// Negation (exact).
    pub fn neg(&self) -> Self {
        Self::new(self.re.neg(), self.im.neg())
    }

    /// Ball containing `self + other`.
    pub fn add(&self, other: &Acb, prec: u32) -> Self {
        Self::new(self.re.add(&other.re, prec), self.im.add(&other.im, prec))
    }

    /// Ball containing `self - other`.
    pub fn sub(&self, other: &Acb, prec: u32) -> Self {
        Self::new(self.re.sub(&other.re, prec), self.im.sub(&other.im, prec))
    }

    /// Ball containing `self * x` for a real ball `x`.
    pub fn mul_arb(&self, x: &Arb, prec: u32) -> Self {
        Self::new(self.re.mul(x, prec), self.im.mul(x, prec))
    }

    /// Ball containing `self * other`.
    pub fn mul(&self, other: &Acb, prec: u32) -> Self {
        if other.im.is_zero() {
            return self.mul_arb(&other.re, prec);
        }
        if self.im.is_zero() {
            return other.mul_arb(&self.re, prec);
        }
        let re = self
            .re
            .mul(&other.re, prec)
            .submul(&self.im, &other.im, prec);
        let im = self
            .re
            .mul(&other.im, prec)
            .addmul(&self.im, &other.re, prec);
        Self::new(re, im)
    }

    /// Ball containing `self^2`.
    pub fn sqr(&self, prec: u32) -> Self {
        self.mul(self, prec)
    }

    /// Ball containing `self * n`.
    pub fn mul_ui(&self, n: u64, prec: u32) -> Self {
        Self::new(self.re.mul_ui(n, prec), self.im.mul_ui(n, prec))
    }

    /// Ball containing `self / n`.
    pub fn div_ui(&self, n: u64, prec: u32) -> Self {
        Self::new(self.re.div_ui(n, prec), self.im.div_ui(n, prec))
    }

    /// Ball containing `self * 2^k`.
    pub fn mul_2exp(&self, k: i64) -> Self {
        Self::new(self.re.mul_2exp(k), self.im.mul_2exp(k))
    }

    /// Ball containing `1 / self`; indeterminate when the ball may contain
    /// zero.
    pub fn inv(&self, prec: u32) -> Self {
        if self.im.is_zero() {
            return Self::from_real(Arb::one().div(&self.re, prec));
        }
        if self.re.is_zero() {
            return Self::new(Arb::zero(), Arb::one().div(&self.im, prec).neg());
        }
        // 1 / (x + iy) = (x - iy) / (x^2 + y^2)
        let norm = self.re.sqr(prec).add(&self.im.sqr(prec), prec);
        Self::new(self.re.div(&norm, prec), self.im.neg().div(&norm, prec))
    }

    /// Ball containing `self / other`; indeterminate when `other` may
    /// contain zero.
    pub fn div(&self, other: &Acb, prec: u32) -> Self {
        if other.im.is_zero() {
            return Self::new(self.re.div(&other.re, prec), self.im.div(&other.re, prec));
        }
        self.mul(&other.inv(prec), prec)
    }

    /// Real ball containing `|self|`.
    pub fn abs(&self, prec: u32) -> Arb {
        if self.im.is_zero() {
            return self.re.abs();
        }
        if self.re.is_zero() {
            return self.im.abs();
        }
        let root = self
            .re
            .sqr(prec)
            .add(&self.im.sqr(prec), prec)
            .sqrt(prec);
        if root.is_finite() {
            root
        } else {
            // the ball reaches the origin: |z| lies in [0, re + im]
            Arb::from_parts(Float::zero(), self.re.upper().add(&self.im.upper()))
        }
    }

    /// Upper bound for `|z|` over the ball.
    pub fn upper(&self) -> Mag {
        let re = self.re.upper();
        let im = self.im.upper();
        // sqrt(re^2 + im^2) <= re + im
        re.add(&im).min(self.abs(DEFAULT_PREC).upper())
    }
}

impl From<Arb> for Acb {
    fn from(re: Arb) -> Self {
        Acb::from_real(re)
    }
}

impl fmt::Display for Acb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}*i", self.re, self.im)
    }
}
