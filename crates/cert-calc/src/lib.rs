#![deny(missing_docs)]
#![doc = "Rigorous calculus on analytic callbacks: Cauchy bounds on circles and Taylor-series integration along straight paths."]

/// Bounds for a function on a circle.
pub mod cauchy;
/// The evaluation callback capability.
pub mod func;
/// Taylor-series integration along straight paths.
pub mod integrate;

pub use cauchy::cauchy_bound;
pub use func::{callback_error, CalcFunc};
pub use integrate::{
    integrate_taylor, integrate_taylor_report, StepSummary, TaylorOpts, TaylorPath, TaylorReport,
};
