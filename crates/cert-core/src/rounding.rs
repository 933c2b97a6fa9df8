//! Bit-level `f64` helpers used to round magnitude bounds outward and to
//! move between `f64` and the wide-exponent types.

const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Width of the `f64` significand in bits.
pub const F64_BITS: u32 = 53;

/// Returns the smallest `f64` strictly greater than `x`.
///
/// `NaN` and `+inf` are returned unchanged.
pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Returns the largest `f64` strictly smaller than `x`.
pub fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

/// Splits a finite non-zero `x` into `(m, e)` with `x = m * 2^e` and
/// `0.5 <= |m| < 1`. Zero and non-finite values are returned as `(x, 0)`.
pub fn frexp(x: f64) -> (f64, i64) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i64;
    if raw_exp == 0 {
        let (m, e) = frexp(x * TWO_POW_64);
        return (m, e - 64);
    }
    let m = f64::from_bits((bits & !(0x7ff_u64 << 52)) | (1022_u64 << 52));
    (m, raw_exp - 1022)
}

/// Computes `x * 2^e`, saturating to infinity or zero outside the `f64` range.
pub fn ldexp(x: f64, e: i64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    if e > 2200 {
        return x.signum() * f64::INFINITY;
    }
    if e < -2200 {
        return x.signum() * 0.0;
    }
    let mut value = x;
    let mut rest = e;
    while rest > 1000 {
        value *= 2f64.powi(1000);
        rest -= 1000;
    }
    while rest < -1000 {
        value *= 2f64.powi(-1000);
        rest += 1000;
    }
    value * 2f64.powi(rest as i32)
}

/// Error-free addition: returns `(s, e)` with `s = fl(a + b)` and
/// `a + b = s + e` exactly whenever `s` is finite.
pub fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

/// Error-free multiplication: returns `(p, e)` with `p = fl(a * b)` and
/// `a * b = p + e` exactly unless the product underflows.
pub fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let err = a.mul_add(b, -p);
    (p, err)
}
