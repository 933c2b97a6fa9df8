#![deny(missing_docs)]
#![doc = "Ball-coefficient power series and rigorous evaluation of sin/cos of a power series."]

/// Series container with ball coefficients.
pub mod poly;
/// Sine and cosine of a power series.
pub mod sin_cos;

pub use poly::ArbPoly;
pub use sin_cos::{
    cos_series, sin_cos_pi_series, sin_cos_series, sin_cos_series_basecase, sin_cos_series_into,
    sin_series, SinCosWorkspace,
};
