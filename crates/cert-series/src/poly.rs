//! Power series with ball coefficients.

use cert_core::Arb;
use serde::{Deserialize, Serialize};

/// Polynomial (truncated power series) with [`Arb`] coefficients.
///
/// Coefficient `i` multiplies `x^i`; coefficients past [`ArbPoly::len`] are
/// implicitly zero. Constructors and arithmetic leave the series normalised
/// (no trailing exact zeros), while [`ArbPoly::set_length`] deliberately
/// does not.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArbPoly {
    coeffs: Vec<Arb>,
}

impl ArbPoly {
    /// The zero series.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The constant series `1`.
    pub fn one() -> Self {
        Self {
            coeffs: vec![Arb::one()],
        }
    }

    /// Series with the given coefficients, normalised.
    pub fn from_coeffs(coeffs: Vec<Arb>) -> Self {
        let mut poly = Self { coeffs };
        poly.normalise();
        poly
    }

    /// Exact series from `f64` coefficients.
    pub fn from_f64s(values: &[f64]) -> Self {
        Self::from_coeffs(values.iter().copied().map(Arb::from_f64).collect())
    }

    /// Number of stored coefficients.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// True when no coefficients are stored.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Coefficient of `x^i` (zero past the length).
    pub fn coeff(&self, i: usize) -> Arb {
        self.coeffs.get(i).cloned().unwrap_or_else(Arb::zero)
    }

    /// Stored coefficients.
    pub fn coeffs(&self) -> &[Arb] {
        &self.coeffs
    }

    /// Mutable access to the stored coefficients.
    pub fn coeffs_mut(&mut self) -> &mut [Arb] {
        &mut self.coeffs
    }

    /// Reserves room for at least `n` coefficients without changing the
    /// length.
    pub fn fit_length(&mut self, n: usize) {
        if n > self.coeffs.capacity() {
            self.coeffs.reserve(n - self.coeffs.len());
        }
    }

    /// Sets the length to exactly `n`, zero-filling or dropping coefficients.
    pub fn set_length(&mut self, n: usize) {
        self.coeffs.resize(n, Arb::zero());
    }

    /// Drops every coefficient of index `n` and above, then normalises.
    pub fn truncate(&mut self, n: usize) {
        self.coeffs.truncate(n);
        self.normalise();
    }

    /// Strips trailing exact zeros.
    pub fn normalise(&mut self) {
        while self.coeffs.last().is_some_and(Arb::is_zero) {
            self.coeffs.pop();
        }
    }

    /// Coefficient-wise sum.
    pub fn add(&self, other: &ArbPoly, prec: u32) -> ArbPoly {
        let len = self.len().max(other.len());
        let coeffs = (0..len)
            .map(|i| self.coeff(i).add(&other.coeff(i), prec))
            .collect();
        ArbPoly::from_coeffs(coeffs)
    }

    /// Product truncated to its first `n` coefficients.
    pub fn mullow(&self, other: &ArbPoly, n: usize, prec: u32) -> ArbPoly {
        if self.is_empty() || other.is_empty() || n == 0 {
            return ArbPoly::zero();
        }
        let len = n.min(self.len() + other.len() - 1);
        let mut coeffs = vec![Arb::zero(); len];
        for (i, a) in self.coeffs.iter().enumerate().take(len) {
            for (j, b) in other.coeffs.iter().enumerate().take(len - i) {
                coeffs[i + j] = coeffs[i + j].addmul(a, b, prec);
            }
        }
        ArbPoly::from_coeffs(coeffs)
    }

    /// Value at `x` by Horner's rule.
    pub fn evaluate(&self, x: &Arb, prec: u32) -> Arb {
        self.coeffs
            .iter()
            .rev()
            .fold(Arb::zero(), |acc, c| acc.mul(x, prec).add(c, prec))
    }
}

impl From<Vec<Arb>> for ArbPoly {
    fn from(coeffs: Vec<Arb>) -> Self {
        ArbPoly::from_coeffs(coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_strips_only_exact_zeros() {
        let mut poly = ArbPoly::from_f64s(&[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(poly.len(), 2);
        poly.set_length(5);
        assert_eq!(poly.len(), 5);
        poly.normalise();
        assert_eq!(poly.len(), 2);

        let fuzzy = Arb::new(0.0, cert_core::Mag::from_2exp(-60));
        let poly = ArbPoly::from_coeffs(vec![Arb::one(), fuzzy]);
        assert_eq!(poly.len(), 2);
    }

    #[test]
    fn mullow_truncates() {
        // (1 + x)^2 = 1 + 2x + x^2
        let p = ArbPoly::from_f64s(&[1.0, 1.0]);
        let sq = p.mullow(&p, 2, 53);
        assert_eq!(sq.len(), 2);
        assert!(sq.coeff(1).contains_f64(2.0));
        assert!(sq.coeff(2).is_zero());
    }

    #[test]
    fn horner_evaluation() {
        let p = ArbPoly::from_f64s(&[1.0, -3.0, 2.0]);
        assert!(p.evaluate(&Arb::from_f64(2.0), 53).contains_f64(3.0));
    }
}
