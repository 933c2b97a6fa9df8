//! Binary floating-point numbers with an arbitrary-size integer mantissa.
//!
//! A [`Float`] is always an exact value. Operations that cannot be exact at
//! a given precision return the rounded value together with a [`Mag`]
//! bound for the discarded part, which ball arithmetic adds to the radius.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::mag::Mag;
use crate::rounding::{frexp, ldexp, F64_BITS};

/// Smallest working precision; lower requests are raised to it.
pub const MIN_PREC: u32 = 2;

/// Exact binary floating-point value `man * 2^exp`.
///
/// The mantissa is odd unless the value is zero, in which case the exponent
/// is zero too, so equal values have equal representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Float {
    man: BigInt,
    exp: i64,
}

fn effective_prec(prec: u32) -> u64 {
    u64::from(prec.max(MIN_PREC))
}

impl Float {
    fn normalised(man: BigInt, exp: i64) -> Self {
        match man.trailing_zeros() {
            None => Self::zero(),
            Some(0) => Self { man, exp },
            Some(tz) => Self {
                man: man >> tz,
                exp: exp.saturating_add(tz as i64),
            },
        }
    }

    /// `man * 2^exp`, normalised.
    pub fn from_parts(man: BigInt, exp: i64) -> Self {
        Self::normalised(man, exp)
    }

    /// Exact zero.
    pub fn zero() -> Self {
        Self {
            man: BigInt::zero(),
            exp: 0,
        }
    }

    /// Exact one.
    pub fn one() -> Self {
        Self {
            man: BigInt::one(),
            exp: 0,
        }
    }

    /// Exactly `2^e`.
    pub fn from_2exp(e: i64) -> Self {
        Self {
            man: BigInt::one(),
            exp: e,
        }
    }

    /// The integer `n`.
    pub fn from_i64(n: i64) -> Self {
        Self::normalised(BigInt::from(n), 0)
    }

    /// The integer `n`.
    pub fn from_u64(n: u64) -> Self {
        Self::normalised(BigInt::from(n), 0)
    }

    /// Exact value of `x`; `None` for infinities and `NaN`.
    pub fn from_f64(x: f64) -> Option<Self> {
        if !x.is_finite() {
            return None;
        }
        if x == 0.0 {
            return Some(Self::zero());
        }
        let (m, e) = frexp(x);
        // m * 2^53 is an integer of magnitude below 2^53
        let man = ldexp(m, i64::from(F64_BITS)) as i64;
        Some(Self::normalised(
            BigInt::from(man),
            e - i64::from(F64_BITS),
        ))
    }

    /// Integer mantissa.
    pub fn mantissa(&self) -> &BigInt {
        &self.man
    }

    /// Binary exponent of the lowest mantissa bit.
    pub fn exponent(&self) -> i64 {
        self.exp
    }

    /// Number of significant bits.
    pub fn bits(&self) -> u64 {
        self.man.bits()
    }

    /// True for exact zero.
    pub fn is_zero(&self) -> bool {
        self.man.is_zero()
    }

    /// True for exact one.
    pub fn is_one(&self) -> bool {
        self.exp == 0 && self.man.is_one()
    }

    /// True for values below zero.
    pub fn is_negative(&self) -> bool {
        self.man.is_negative()
    }

    /// Exponent `t` with `|self| < 2^t`, or `None` for zero.
    pub fn top(&self) -> Option<i64> {
        if self.is_zero() {
            None
        } else {
            Some(self.exp.saturating_add(self.man.bits() as i64))
        }
    }

    /// Negation.
    pub fn neg(&self) -> Self {
        Self {
            man: -&self.man,
            exp: self.exp,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            man: self.man.abs(),
            exp: self.exp,
        }
    }

    /// `self * 2^k`.
    pub fn mul_2exp(&self, k: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            man: self.man.clone(),
            exp: self.exp.saturating_add(k),
        }
    }

    /// Exact product.
    pub fn mul(&self, other: &Float) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        // odd times odd stays odd
        Self {
            man: &self.man * &other.man,
            exp: self.exp.saturating_add(other.exp),
        }
    }

    /// Exact sum. The mantissa grows with the exponent gap of the operands,
    /// so callers bound the gap first.
    pub(crate) fn add_exact(&self, other: &Float) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (high, low) = if self.exp >= other.exp {
            (self, other)
        } else {
            (other, self)
        };
        let shift = high.exp.saturating_sub(low.exp) as u64;
        Self::normalised((&high.man << shift) + &low.man, low.exp)
    }

    /// Rounds to `prec` significant bits, to nearest. Returns the rounded
    /// value and a bound for `|self - rounded|`.
    pub fn round(&self, prec: u32) -> (Self, Mag) {
        let prec = effective_prec(prec);
        let bits = self.man.bits();
        if bits <= prec {
            return (self.clone(), Mag::zero());
        }
        let shift = bits - prec;
        let magnitude = self.man.magnitude();
        let mut kept = magnitude >> shift;
        let dropped = magnitude - (&kept << shift);
        if dropped >= BigUint::one() << (shift - 1) {
            kept += 1u32;
        }
        let exp = self.exp.saturating_add(shift as i64);
        let rounded = Self::normalised(BigInt::from_biguint(self.man.sign(), kept), exp);
        // the mantissa is odd, so some dropped bit is set
        (rounded, Mag::from_2exp(exp - 1))
    }

    /// `self + other` rounded to `prec` bits, with an error bound.
    pub fn add_round(&self, other: &Float, prec: u32) -> (Self, Mag) {
        let (self_top, other_top) = match (self.top(), other.top()) {
            (None, _) => return other.round(prec),
            (_, None) => return self.round(prec),
            (Some(a), Some(b)) => (a, b),
        };
        let (big, small, big_top, small_top) = if self_top >= other_top {
            (self, other, self_top, other_top)
        } else {
            (other, self, other_top, self_top)
        };
        // an operand entirely below the rounding point only widens the error
        let cutoff = big_top.saturating_sub(effective_prec(prec) as i64 + 4);
        if small_top < cutoff {
            let (rounded, err) = big.round(prec);
            return (rounded, err.add(&small.mag_upper()));
        }
        big.add_exact(small).round(prec)
    }

    /// `self - other` rounded to `prec` bits, with an error bound.
    pub fn sub_round(&self, other: &Float, prec: u32) -> (Self, Mag) {
        self.add_round(&other.neg(), prec)
    }

    /// `self * other` rounded to `prec` bits, with an error bound.
    pub fn mul_round(&self, other: &Float, prec: u32) -> (Self, Mag) {
        self.mul(other).round(prec)
    }

    /// `self / other` rounded to `prec` bits, with an error bound; `None`
    /// when `other` is zero.
    pub fn div_round(&self, other: &Float, prec: u32) -> Option<(Self, Mag)> {
        if other.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some((Self::zero(), Mag::zero()));
        }
        // two quotient bits beyond prec keep the truncation below half an ulp
        let wanted = effective_prec(prec) + 2;
        let shift = (wanted + other.man.bits()).saturating_sub(self.man.bits());
        let numer = self.man.magnitude() << shift;
        let (quot, rem) = numer.div_rem(other.man.magnitude());
        let sign = if self.man.sign() == other.man.sign() {
            Sign::Plus
        } else {
            Sign::Minus
        };
        let exp = self
            .exp
            .saturating_sub(other.exp)
            .saturating_sub(shift as i64);
        let truncated = Self::normalised(BigInt::from_biguint(sign, quot), exp);
        let (rounded, err) = truncated.round(prec);
        if rem.is_zero() {
            Some((rounded, err))
        } else {
            Some((rounded, err.add(&Mag::from_2exp(exp))))
        }
    }

    /// Square root rounded to `prec` bits, with an error bound; `None` for
    /// negative input.
    pub fn sqrt_round(&self, prec: u32) -> Option<(Self, Mag)> {
        if self.is_negative() {
            return None;
        }
        if self.is_zero() {
            return Some((Self::zero(), Mag::zero()));
        }
        let wanted = effective_prec(prec) + 2;
        let mut shift = (2 * wanted).saturating_sub(self.man.bits());
        if self.exp.saturating_sub(shift as i64).rem_euclid(2) != 0 {
            shift += 1;
        }
        let radicand = self.man.magnitude() << shift;
        let root = radicand.sqrt();
        let exact = &root * &root == radicand;
        let exp = self.exp.saturating_sub(shift as i64) / 2;
        let (rounded, err) = Self::normalised(BigInt::from(root), exp).round(prec);
        if exact {
            Some((rounded, err))
        } else {
            Some((rounded, err.add(&Mag::from_2exp(exp))))
        }
    }

    /// Leading `width` mantissa bits, the number of bits dropped and the
    /// exponent that scales the kept bits.
    fn leading_bits(&self, width: u64) -> (u64, u64, i64) {
        let shift = self.man.bits().saturating_sub(width);
        let top = (self.man.magnitude() >> shift)
            .to_u64()
            .unwrap_or(u64::MAX);
        (top, shift, self.exp.saturating_add(shift as i64))
    }

    /// Approximate `f64` value (a few ulps); saturates to infinity.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let (top, _, exp) = self.leading_bits(64);
        let value = ldexp(top as f64, exp);
        if self.is_negative() {
            -value
        } else {
            value
        }
    }

    /// Upper bound for `|self|`.
    pub fn mag_upper(&self) -> Mag {
        if self.is_zero() {
            return Mag::zero();
        }
        let (top, shift, exp) = self.leading_bits(u64::from(F64_BITS));
        // odd mantissa: any shift drops a set bit
        let top = if shift > 0 { top + 1 } else { top };
        Mag::from_f64(top as f64).mul_2exp(exp)
    }

    /// Lower bound for `|self|`.
    pub fn mag_lower(&self) -> Mag {
        if self.is_zero() {
            return Mag::zero();
        }
        let (top, _, exp) = self.leading_bits(u64::from(F64_BITS));
        Mag::from_f64_lower(top as f64).mul_2exp(exp)
    }

    fn cmp_abs(&self, other: &Float) -> Ordering {
        match (self.top(), other.top()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) if a != b => a.cmp(&b),
            _ => {
                // equal tops keep the alignment shift within the mantissa widths
                let low = self.exp.min(other.exp);
                let lhs = self.man.magnitude() << (self.exp - low) as u64;
                let rhs = other.man.magnitude() << (other.exp - low) as u64;
                lhs.cmp(&rhs)
            }
        }
    }

    /// Index of `2 * self` modulo 4 when `2 * self` is an integer.
    pub(crate) fn half_turns_mod4(&self) -> Option<u8> {
        if self.is_zero() {
            return Some(0);
        }
        let twice = self.exp.saturating_add(1);
        if twice < 0 {
            return None;
        }
        if twice >= 2 {
            return Some(0);
        }
        let scaled = &self.man << twice as u64;
        scaled.mod_floor(&BigInt::from(4)).to_u8()
    }
}

impl Default for Float {
    fn default() -> Self {
        Float::zero()
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        let (lhs, rhs) = (self.man.sign(), other.man.sign());
        if lhs != rhs {
            return lhs.cmp(&rhs);
        }
        match lhs {
            Sign::NoSign => Ordering::Equal,
            Sign::Plus => self.cmp_abs(other),
            Sign::Minus => other.cmp_abs(self),
        }
    }
}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.top() {
            Some(top) if (-1000..=1000).contains(&top) => write!(f, "{:e}", self.to_f64()),
            Some(_) => write!(f, "{}*2^{}", self.man, self.exp),
            None => write!(f, "0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representation_is_canonical() {
        let a = Float::from_parts(BigInt::from(12), -2);
        assert_eq!(a, Float::from_i64(3));
        assert_eq!(Float::from_f64(0.75), Some(Float::from_parts(BigInt::from(3), -2)));
        assert_eq!(Float::from_parts(BigInt::zero(), 17), Float::zero());
        assert_eq!(Float::from_f64(f64::NAN), None);
    }

    #[test]
    fn rounding_keeps_prec_bits_and_bounds_the_error() {
        // 1 + 2^-10 at 8 bits rounds to 1
        let x = Float::from_f64(1.0 + 1.0 / 1024.0).expect("finite");
        let (r, err) = x.round(8);
        assert!(r.is_one());
        assert_eq!(err, Mag::from_2exp(-8));
        let (r, err) = x.round(11);
        assert_eq!(r, x);
        assert!(err.is_zero());
    }

    #[test]
    fn distant_operands_do_not_allocate_the_gap() {
        let big = Float::one();
        let tiny = Float::from_2exp(-1_000_000_000);
        let (sum, err) = big.add_round(&tiny, 64);
        assert!(sum.is_one());
        assert!(err >= Mag::from_2exp(-1_000_000_000));
        assert!(err < Mag::from_2exp(-60));
    }

    #[test]
    fn division_beyond_double_precision() {
        let (third, err) = Float::one().div_round(&Float::from_u64(3), 200).expect("nonzero");
        assert_eq!(third.bits(), 200);
        assert!(err <= Mag::from_2exp(-200));
        let (back, _) = third.mul_round(&Float::from_u64(3), 300);
        let (gap, _) = back.sub_round(&Float::one(), 300);
        assert!(gap.mag_upper() <= Mag::from_2exp(-200));
    }

    #[test]
    fn square_roots_of_squares_are_exact() {
        let (root, err) = Float::from_u64(25).sqrt_round(53).expect("non-negative");
        assert_eq!(root, Float::from_u64(5));
        assert!(err.is_zero());
        assert!(Float::from_i64(-4).sqrt_round(53).is_none());
    }

    #[test]
    fn ordering_follows_value() {
        let values = [-3.5, -0.25, 0.0, 1e-300, 0.5, 2.0, 1e300];
        for pair in values.windows(2) {
            let a = Float::from_f64(pair[0]).expect("finite");
            let b = Float::from_f64(pair[1]).expect("finite");
            assert!(a < b, "{} < {}", pair[0], pair[1]);
        }
        assert!(Float::from_2exp(-5000) > Float::zero());
    }

    #[test]
    fn magnitude_bounds_bracket_the_value() {
        let (third, _) = Float::one().div_round(&Float::from_u64(3), 120).expect("nonzero");
        assert!(third.mag_lower() < third.mag_upper());
        assert!(third.mag_upper().to_f64() >= 1.0 / 3.0);
        assert!(third.mag_lower().to_f64_lower() <= 1.0 / 3.0);
    }
}
