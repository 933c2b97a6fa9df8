//! Fixed-point kernels for `pi`, `sin` and `cos` at any precision.
//!
//! Values are integers `V` standing for `V * 2^-wp`. Each kernel returns
//! its result together with an error bound counted in units of `2^-wp`.

use std::cell::RefCell;

use num_bigint::BigUint;
use num_traits::{One, Zero};

thread_local! {
    /// Most precise `pi` computed so far on this thread, with its working
    /// precision and error.
    static PI_CACHE: RefCell<Option<(u64, BigUint, u64)>> = const { RefCell::new(None) };
}

/// `atan(1/k)` by its alternating Taylor series.
fn atan_recip(k: u64, wp: u64) -> (BigUint, u64) {
    let one = BigUint::one() << wp;
    let k_sq = BigUint::from(k) * k;
    let mut power = BigUint::from(k);
    let mut pos = BigUint::zero();
    let mut neg = BigUint::zero();
    let mut terms = 0u64;
    loop {
        // floor division: each term is low by less than one unit
        let term = &one / (&power * (2 * terms + 1));
        if term.is_zero() {
            break;
        }
        if terms % 2 == 0 {
            pos += term;
        } else {
            neg += term;
        }
        power *= &k_sq;
        terms += 1;
    }
    // the first omitted term, and so the alternating tail, is below one unit
    (pos - neg, terms + 1)
}

/// `pi` by Machin's formula `pi = 16 atan(1/5) - 4 atan(1/239)`.
fn machin_pi(wp: u64) -> (BigUint, u64) {
    let (a5, e5) = atan_recip(5, wp);
    let (a239, e239) = atan_recip(239, wp);
    (a5 * 16u32 - a239 * 4u32, 16 * e5 + 4 * e239)
}

/// `pi` to `wp` bits, truncated from the cached value when one is precise
/// enough.
pub(crate) fn pi_fixed(wp: u64) -> (BigUint, u64) {
    PI_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some((cached_wp, pi, err)) = cache.as_ref() {
            if *cached_wp >= wp {
                let drop = cached_wp - wp;
                let scaled = u32::try_from(drop)
                    .ok()
                    .and_then(|shift| err.checked_shr(shift))
                    .unwrap_or(0);
                // truncation costs less than one unit, the scaled error one more
                return (pi >> drop, scaled + 2);
            }
        }
        let (pi, err) = machin_pi(wp);
        *cache = Some((wp, pi.clone(), err));
        (pi, err)
    })
}

/// Sums `sum (-1)^i t_i` with `t_0 = first` and
/// `t_(i+1) = t_i r^2 / ((d + 1)(d + 2))`, `d` starting at `start`.
fn alternating_series(first: BigUint, r_sq: &BigUint, start: u64, wp: u64) -> (BigUint, u64) {
    let mut term = first;
    let mut pos = term.clone();
    let mut neg = BigUint::zero();
    let mut d = start;
    let mut terms = 1u64;
    loop {
        term = ((&term * r_sq) >> wp) / ((d + 1) * (d + 2));
        d += 2;
        if term.is_zero() {
            break;
        }
        if terms % 2 == 0 {
            pos += &term;
        } else {
            neg += &term;
        }
        terms += 1;
    }
    // computed terms never increase, so the alternating sum is non-negative
    let sum = if pos >= neg { pos - neg } else { BigUint::zero() };
    // each term is off by at most four units and so is the dropped tail
    (sum, 4 * (terms + 2))
}

/// `sin(r)` and `cos(r)` for `0 <= r <= 1`, with a shared error bound.
pub(crate) fn sin_cos_fixed(r: &BigUint, wp: u64) -> (BigUint, BigUint, u64) {
    let r_sq = (r * r) >> wp;
    let (sin, sin_err) = alternating_series(r.clone(), &r_sq, 1, wp);
    let (cos, cos_err) = alternating_series(BigUint::one() << wp, &r_sq, 0, wp);
    (sin, cos, sin_err.max(cos_err))
}
