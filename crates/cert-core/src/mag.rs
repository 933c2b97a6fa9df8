//! Non-negative magnitude bounds with outward rounding.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rounding::{frexp, ldexp, next_down, next_up, two_prod, two_sum, F64_BITS};

/// Exponents beyond this bound saturate to infinity.
const MAG_EXP_MAX: i64 = 1 << 60;
/// Exponents below this bound are clamped (upper bounds) or flushed to zero
/// (lower bounds).
const MAG_EXP_MIN: i64 = -(1 << 60);
const MAN_LOW: u64 = 1 << (F64_BITS - 1);
const INF_EXP: i64 = i64::MAX;

/// Non-negative bound stored as a 53-bit mantissa and a wide binary exponent.
///
/// A finite non-zero value is `man * 2^(exp - 53)` with
/// `2^52 <= man < 2^53`. Zero is `man == 0, exp == 0`; infinity is
/// `man == 0, exp == i64::MAX`. Arithmetic rounds up unless the method name
/// says otherwise, so a `Mag` never understates the bound it was derived to
/// cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mag {
    man: u64,
    exp: i64,
}

impl Mag {
    /// Exact zero.
    pub const fn zero() -> Self {
        Self { man: 0, exp: 0 }
    }

    /// Exact one.
    pub const fn one() -> Self {
        Self {
            man: MAN_LOW,
            exp: 1,
        }
    }

    /// Positive infinity, the trivially valid bound.
    pub const fn inf() -> Self {
        Self {
            man: 0,
            exp: INF_EXP,
        }
    }

    /// Returns `2^e` exactly.
    pub fn from_2exp(e: i64) -> Self {
        Self::clamp_upper(MAN_LOW, e.saturating_add(1))
    }

    /// Upper bound for `|x|`. `NaN` maps to infinity.
    pub fn from_f64(x: f64) -> Self {
        if x.is_nan() {
            return Self::inf();
        }
        Self::from_parts_upper(x.abs(), 0)
    }

    /// Lower bound for `|x|`. `NaN` maps to zero.
    pub fn from_f64_lower(x: f64) -> Self {
        if x.is_nan() {
            return Self::zero();
        }
        Self::from_parts_lower(x.abs(), 0)
    }

    /// Returns true for exact zero.
    pub fn is_zero(&self) -> bool {
        self.man == 0 && self.exp != INF_EXP
    }

    /// Returns true for the infinite bound.
    pub fn is_inf(&self) -> bool {
        self.exp == INF_EXP
    }

    /// Returns true unless the bound is infinite.
    pub fn is_finite(&self) -> bool {
        !self.is_inf()
    }

    /// Binary exponent `e` such that the value lies in `[2^(e-1), 2^e)`.
    /// Returns `None` for zero and infinity.
    pub fn exponent(&self) -> Option<i64> {
        if self.man == 0 {
            None
        } else {
            Some(self.exp)
        }
    }

    fn frac(&self) -> f64 {
        ldexp(self.man as f64, -(F64_BITS as i64))
    }

    fn clamp_upper(man: u64, exp: i64) -> Self {
        if exp > MAG_EXP_MAX {
            Self::inf()
        } else if exp < MAG_EXP_MIN {
            Self {
                man: MAN_LOW,
                exp: MAG_EXP_MIN,
            }
        } else {
            Self { man, exp }
        }
    }

    fn clamp_lower(man: u64, exp: i64) -> Self {
        if exp > MAG_EXP_MAX {
            Self {
                man: (1 << F64_BITS) - 1,
                exp: MAG_EXP_MAX,
            }
        } else if exp < MAG_EXP_MIN {
            Self::zero()
        } else {
            Self { man, exp }
        }
    }

    /// `f * 2^e` for a non-negative `f`, rounding the representation up.
    /// The caller is responsible for `f` already being an upper bound.
    fn from_parts_upper(f: f64, e: i64) -> Self {
        if f == 0.0 {
            return Self::zero();
        }
        if !f.is_finite() {
            return Self::inf();
        }
        let (m, k) = frexp(f);
        let man = ldexp(m, F64_BITS as i64) as u64;
        Self::clamp_upper(man, e.saturating_add(k))
    }

    fn from_parts_lower(f: f64, e: i64) -> Self {
        if f <= 0.0 || f.is_nan() {
            return Self::zero();
        }
        if f.is_infinite() {
            return Self::clamp_lower((1 << F64_BITS) - 1, MAG_EXP_MAX);
        }
        let (m, k) = frexp(f);
        let man = ldexp(m, F64_BITS as i64) as u64;
        Self::clamp_lower(man, e.saturating_add(k))
    }

    /// Upper bound for `self + other`.
    pub fn add(&self, other: &Mag) -> Mag {
        if self.is_inf() || other.is_inf() {
            return Mag::inf();
        }
        if self.is_zero() {
            return *other;
        }
        if other.is_zero() {
            return *self;
        }
        let (big, small) = if self.exp >= other.exp {
            (self, other)
        } else {
            (other, self)
        };
        let shift = big.exp - small.exp;
        let sum = if shift > 64 {
            next_up(big.frac())
        } else {
            let (sum, err) = two_sum(big.frac(), ldexp(small.frac(), -shift));
            if err > 0.0 {
                next_up(sum)
            } else {
                sum
            }
        };
        Mag::from_parts_upper(sum, big.exp)
    }

    /// Lower bound for `max(self - other, 0)`.
    pub fn sub_lower(&self, other: &Mag) -> Mag {
        if other.is_zero() {
            return *self;
        }
        if self.is_inf() {
            return Mag::inf();
        }
        if other.is_inf() || *self <= *other {
            return Mag::zero();
        }
        let shift = self.exp - other.exp;
        let diff = if shift > 64 {
            next_down(self.frac())
        } else {
            next_down(self.frac() - ldexp(other.frac(), -shift))
        };
        Mag::from_parts_lower(diff, self.exp)
    }

    /// Upper bound for `self * other`.
    pub fn mul(&self, other: &Mag) -> Mag {
        if self.is_zero() || other.is_zero() {
            return Mag::zero();
        }
        if self.is_inf() || other.is_inf() {
            return Mag::inf();
        }
        let (prod, err) = two_prod(self.frac(), other.frac());
        let prod = if err > 0.0 { next_up(prod) } else { prod };
        Mag::from_parts_upper(prod, self.exp.saturating_add(other.exp))
    }

    /// Lower bound for `self * other`.
    pub fn mul_lower(&self, other: &Mag) -> Mag {
        if self.is_zero() || other.is_zero() {
            return Mag::zero();
        }
        if self.is_inf() || other.is_inf() {
            return Mag::inf();
        }
        let (prod, err) = two_prod(self.frac(), other.frac());
        let prod = if err < 0.0 { next_down(prod) } else { prod };
        Mag::from_parts_lower(prod, self.exp.saturating_add(other.exp))
    }

    /// Upper bound for `self / other`, where `other` is a lower bound of the
    /// true divisor. Division by zero gives infinity unless `self` is zero.
    pub fn div(&self, other: &Mag) -> Mag {
        if self.is_zero() {
            return Mag::zero();
        }
        if other.is_zero() || self.is_inf() {
            return Mag::inf();
        }
        if other.is_inf() {
            return Mag::zero();
        }
        let quot = self.frac() / other.frac();
        // remainder of the rounded quotient, exact by fma
        let rem = (-quot).mul_add(other.frac(), self.frac());
        let quot = if rem > 0.0 { next_up(quot) } else { quot };
        Mag::from_parts_upper(quot, self.exp.saturating_sub(other.exp))
    }

    /// Upper bound for `self^n` by binary exponentiation.
    pub fn pow_ui(&self, n: u64) -> Mag {
        let mut result = Mag::one();
        let mut base = *self;
        let mut rest = n;
        while rest > 0 {
            if rest & 1 == 1 {
                result = result.mul(&base);
            }
            rest >>= 1;
            if rest > 0 {
                base = base.mul(&base);
            }
            if result.is_zero() {
                break;
            }
        }
        result
    }

    /// Splits into `f * 2^e` with `f` in `[0.5, 2)` and `e` even.
    fn even_split(&self) -> (f64, i64) {
        if self.exp.rem_euclid(2) == 0 {
            (self.frac(), self.exp)
        } else {
            (2.0 * self.frac(), self.exp - 1)
        }
    }

    /// Upper bound for `sqrt(self)`.
    pub fn sqrt(&self) -> Mag {
        if self.is_zero() || self.is_inf() {
            return *self;
        }
        let (f, e) = self.even_split();
        Mag::from_parts_upper(next_up(f.sqrt()), e / 2)
    }

    /// Lower bound for `sqrt(self)`.
    pub fn sqrt_lower(&self) -> Mag {
        if self.is_zero() || self.is_inf() {
            return *self;
        }
        let (f, e) = self.even_split();
        Mag::from_parts_lower(next_down(f.sqrt()), e / 2)
    }

    /// Exact multiplication by `2^k` (saturating at the exponent range).
    pub fn mul_2exp(&self, k: i64) -> Mag {
        if self.man == 0 {
            return *self;
        }
        Mag::clamp_upper(self.man, self.exp.saturating_add(k))
    }

    /// Larger of two bounds.
    pub fn max(self, other: Mag) -> Mag {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// Smaller of two bounds.
    pub fn min(self, other: Mag) -> Mag {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Smallest `f64` not below the bound (overflow gives `+inf`).
    pub fn to_f64(&self) -> f64 {
        if self.is_inf() {
            return f64::INFINITY;
        }
        if self.is_zero() {
            return 0.0;
        }
        if self.exp > 1024 {
            f64::INFINITY
        } else if self.exp < -1021 {
            f64::MIN_POSITIVE
        } else {
            ldexp(self.frac(), self.exp)
        }
    }

    /// Largest `f64` not above the bound (underflow gives zero).
    pub fn to_f64_lower(&self) -> f64 {
        if self.is_inf() {
            return f64::INFINITY;
        }
        if self.is_zero() || self.exp < -1021 {
            return 0.0;
        }
        if self.exp > 1024 {
            f64::MAX
        } else {
            ldexp(self.frac(), self.exp)
        }
    }
}

impl Default for Mag {
    fn default() -> Self {
        Mag::zero()
    }
}

impl Ord for Mag {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_inf(), other.is_inf()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        match (self.is_zero(), other.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .exp
                .cmp(&other.exp)
                .then_with(|| self.man.cmp(&other.man)),
        }
    }
}

impl PartialOrd for Mag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Mag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inf() {
            return write!(f, "inf");
        }
        if self.is_zero() {
            return write!(f, "0");
        }
        if (-1000..=1000).contains(&self.exp) {
            write!(f, "{:e}", self.to_f64())
        } else {
            write!(f, "{}*2^{}", self.frac(), self.exp)
        }
    }
}
