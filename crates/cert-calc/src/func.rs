//! The evaluation callback capability.

use cert_core::errors::{CertError, ErrorInfo};
use cert_core::Acb;

/// Analytic function supplied by the caller.
///
/// `evaluate` writes the first `out.len()` Taylor coefficients of the
/// function at `z` into `out`: `f(z), f'(z), f''(z)/2!, ...`. Each entry
/// must enclose the true coefficient for every point of the ball `z`.
/// Implementations must be deterministic for fixed inputs; any state they
/// need is captured by the implementing value.
pub trait CalcFunc {
    /// Evaluates the Taylor coefficients at `z`, or reports failure.
    fn evaluate(&self, out: &mut [Acb], z: &Acb, prec: u32) -> Result<(), CertError>;
}

impl<F> CalcFunc for F
where
    F: Fn(&mut [Acb], &Acb, u32) -> Result<(), CertError>,
{
    fn evaluate(&self, out: &mut [Acb], z: &Acb, prec: u32) -> Result<(), CertError> {
        self(out, z, prec)
    }
}

/// Error a callback returns when it cannot evaluate at the given input.
pub fn callback_error(code: &str, message: impl Into<String>) -> CertError {
    CertError::Callback(ErrorInfo::new(code, message.into()))
}

/// Calls `func` for `order` coefficients and rejects non-finite output.
pub(crate) fn evaluate_checked<F>(
    func: &F,
    z: &Acb,
    order: usize,
    prec: u32,
) -> Result<Vec<Acb>, CertError>
where
    F: CalcFunc + ?Sized,
{
    let mut out = vec![Acb::zero(); order];
    func.evaluate(&mut out, z, prec)?;
    if let Some(index) = out.iter().position(|coeff| !coeff.is_finite()) {
        return Err(CertError::NonFinite(
            ErrorInfo::new("non-finite-callback", "callback produced a non-finite value")
                .with_context("input", z)
                .with_context("index", index)
                .with_context("prec", prec)
                .with_hint("shrink the outer radius or raise the working precision"),
        ));
    }
    Ok(out)
}
