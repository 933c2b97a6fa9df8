//! Sine and cosine of a power series by the derivative recurrence.
//!
//! With `s = sin(h)` and `c = cos(h)` we have `s' = c h'` and `c' = -s h'`.
//! Matching coefficients gives, for `k >= 1`,
//!
//! ```text
//! k s_k =  sum_{j=1}^{k} j h_j c_{k-j}
//! k c_k = -sum_{j=1}^{k} j h_j s_{k-j}
//! ```
//!
//! so each output coefficient depends only on lower-indexed ones.

use cert_core::errors::{CertError, ErrorInfo};
use cert_core::Arb;
use tracing::{debug, trace};

use crate::poly::ArbPoly;

fn series_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::Config(ErrorInfo::new(code, message.into()))
}

/// Scratch storage for the derivative-weighted input series `k h_k`.
///
/// The buffer only grows, so one workspace can serve repeated evaluations
/// without reallocating.
#[derive(Debug, Clone, Default)]
pub struct SinCosWorkspace {
    weighted: Vec<Arb>,
}

impl SinCosWorkspace {
    /// Empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspace able to handle inputs of `len` coefficients without growing.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            weighted: vec![Arb::zero(); len],
        }
    }

    /// Number of coefficients the buffer currently holds.
    pub fn capacity(&self) -> usize {
        self.weighted.len()
    }

    fn prepare(&mut self, len: usize) -> &mut [Arb] {
        if self.weighted.len() < len {
            self.weighted.resize(len, Arb::zero());
        }
        &mut self.weighted[..len]
    }
}

/// Writes the first `n` coefficients of `sin(h)` and `cos(h)` (or of
/// `sin(pi h)` and `cos(pi h)` when `times_pi` is set) into `s` and `c`.
///
/// `h` must hold at least one coefficient and both outputs at least `n`
/// slots; entries of `s` and `c` past `n` are left untouched. Coefficients
/// past `n` are not bounded: the output is the exact truncation of the
/// series, enclosed coefficient by coefficient.
pub fn sin_cos_series_basecase(
    s: &mut [Arb],
    c: &mut [Arb],
    h: &[Arb],
    n: usize,
    prec: u32,
    times_pi: bool,
    workspace: &mut SinCosWorkspace,
) -> Result<(), CertError> {
    if n == 0 {
        return Ok(());
    }
    if h.is_empty() {
        return Err(series_error("empty-input", "input series has no coefficients"));
    }
    if s.len() < n || c.len() < n {
        return Err(CertError::Config(
            ErrorInfo::new("output-too-short", "output storage is shorter than n")
                .with_context("n", n)
                .with_context("sin_len", s.len())
                .with_context("cos_len", c.len()),
        ));
    }

    let hlen = h.len();
    (s[0], c[0]) = if times_pi {
        h[0].sin_cos_pi(prec)
    } else {
        h[0].sin_cos(prec)
    };

    if hlen == 1 {
        s[1..n].fill(Arb::zero());
        c[1..n].fill(Arb::zero());
        return Ok(());
    }

    let alen = n.min(hlen);
    let weighted = workspace.prepare(alen);
    let pi = times_pi.then(|| Arb::const_pi(prec));
    for k in 1..alen {
        let a = h[k].mul_ui(k as u64, prec);
        weighted[k] = match &pi {
            Some(pi) => a.mul(pi, prec),
            None => a,
        };
    }

    for k in 1..n {
        let mut t = Arb::zero();
        let mut u = Arb::zero();
        for j in 1..(k + 1).min(hlen) {
            t = t.submul(&weighted[j], &s[k - j], prec);
            u = u.addmul(&weighted[j], &c[k - j], prec);
        }
        c[k] = t.div_ui(k as u64, prec);
        s[k] = u.div_ui(k as u64, prec);
        trace!(k, sin = %s[k], cos = %c[k], "series coefficient");
    }
    Ok(())
}

/// Writes `sin(h)` and `cos(h)` truncated to length `n` into `s` and `c`,
/// reusing their storage and the workspace.
///
/// With `n == 0` both outputs are zero; an empty `h` gives `s = 0` and
/// `c = 1`. Outputs are normalised.
pub fn sin_cos_series_into(
    s: &mut ArbPoly,
    c: &mut ArbPoly,
    h: &ArbPoly,
    n: usize,
    prec: u32,
    times_pi: bool,
    workspace: &mut SinCosWorkspace,
) -> Result<(), CertError> {
    if n == 0 {
        *s = ArbPoly::zero();
        *c = ArbPoly::zero();
        return Ok(());
    }
    if h.is_empty() {
        *s = ArbPoly::zero();
        *c = ArbPoly::one();
        return Ok(());
    }
    debug!(n, hlen = h.len(), prec, times_pi, "sin/cos series");
    s.fit_length(n);
    c.fit_length(n);
    s.set_length(n);
    c.set_length(n);
    sin_cos_series_basecase(
        s.coeffs_mut(),
        c.coeffs_mut(),
        h.coeffs(),
        n,
        prec,
        times_pi,
        workspace,
    )?;
    s.normalise();
    c.normalise();
    Ok(())
}

/// `(sin(h), cos(h))` truncated to length `n`.
pub fn sin_cos_series(h: &ArbPoly, n: usize, prec: u32) -> Result<(ArbPoly, ArbPoly), CertError> {
    let mut s = ArbPoly::zero();
    let mut c = ArbPoly::zero();
    let mut workspace = SinCosWorkspace::with_capacity(n.min(h.len()));
    sin_cos_series_into(&mut s, &mut c, h, n, prec, false, &mut workspace)?;
    Ok((s, c))
}

/// `(sin(pi h), cos(pi h))` truncated to length `n`.
pub fn sin_cos_pi_series(
    h: &ArbPoly,
    n: usize,
    prec: u32,
) -> Result<(ArbPoly, ArbPoly), CertError> {
    let mut s = ArbPoly::zero();
    let mut c = ArbPoly::zero();
    let mut workspace = SinCosWorkspace::with_capacity(n.min(h.len()));
    sin_cos_series_into(&mut s, &mut c, h, n, prec, true, &mut workspace)?;
    Ok((s, c))
}

/// `sin(h)` truncated to length `n`.
pub fn sin_series(h: &ArbPoly, n: usize, prec: u32) -> Result<ArbPoly, CertError> {
    sin_cos_series(h, n, prec).map(|(s, _)| s)
}

/// `cos(h)` truncated to length `n`.
pub fn cos_series(h: &ArbPoly, n: usize, prec: u32) -> Result<ArbPoly, CertError> {
    sin_cos_series(h, n, prec).map(|(_, c)| c)
}
