use cert_calc::{
    callback_error, cauchy_bound, integrate_taylor, integrate_taylor_report, TaylorOpts,
    TaylorPath,
};
use cert_core::{from_yaml_slice, Acb, Arb, CertError, Float, Mag};
use proptest::prelude::*;

const PREC: u32 = 53;

fn constant_one(out: &mut [Acb], _z: &Acb, _prec: u32) -> Result<(), CertError> {
    for (k, coeff) in out.iter_mut().enumerate() {
        *coeff = if k == 0 { Acb::one() } else { Acb::zero() };
    }
    Ok(())
}

fn identity(out: &mut [Acb], z: &Acb, _prec: u32) -> Result<(), CertError> {
    for (k, coeff) in out.iter_mut().enumerate() {
        *coeff = match k {
            0 => z.clone(),
            1 => Acb::one(),
            _ => Acb::zero(),
        };
    }
    Ok(())
}

/// `z^3 - 2z + 1i`.
fn cubic(out: &mut [Acb], z: &Acb, prec: u32) -> Result<(), CertError> {
    let z2 = z.sqr(prec);
    let values = [
        z2.mul(z, prec)
            .sub(&z.mul_ui(2, prec), prec)
            .add(&Acb::from_f64(0.0, 1.0), prec),
        z2.mul_ui(3, prec).sub(&Acb::from_f64(2.0, 0.0), prec),
        z.mul_ui(3, prec),
        Acb::one(),
    ];
    for (k, coeff) in out.iter_mut().enumerate() {
        *coeff = values.get(k).cloned().unwrap_or_else(Acb::zero);
    }
    Ok(())
}

fn goal_slack(goal: u32) -> Mag {
    Mag::from_2exp(-i64::from(goal)).add(&Mag::from_2exp(-40))
}

#[test]
fn constant_integrates_to_path_length() {
    let a = Acb::from_f64(-1.0, 0.5);
    let b = Acb::from_f64(2.0, -1.5);
    let value = integrate_taylor(&constant_one, &a, &b, 0.5, 1.0, 53, PREC).expect("integral");
    assert!(value.contains_point(3.0, -2.0));
    assert!(value.re().rad() <= goal_slack(53));
    assert!(value.im().rad() <= goal_slack(53));
}

#[test]
fn identity_integrates_to_half_difference_of_squares() {
    let a = Acb::from_f64(0.0, 0.0);
    let b = Acb::from_f64(1.0, 0.0);
    let value = integrate_taylor(&identity, &a, &b, 0.25, 0.75, 40, PREC).expect("integral");
    assert!(value.contains_point(0.5, 0.0));
    assert!(value.re().rad() <= goal_slack(40));
}

/// `F(z) = z^4/4 - z^2 + i z`; exact for dyadic `z` at 256 bits.
fn cubic_antiderivative(z: &Acb) -> Acb {
    let z2 = z.sqr(256);
    z2.sqr(256)
        .div_ui(4, 256)
        .sub(&z2, 256)
        .add(&Acb::from_f64(0.0, 1.0).mul(z, 256), 256)
}

#[test]
fn cubic_matches_antiderivative() {
    let a = Acb::from_f64(0.5, -0.25);
    let b = Acb::from_f64(-1.0, 1.0);
    let value = integrate_taylor(&cubic, &a, &b, 0.3, 0.6, 50, PREC).expect("integral");
    let expected = cubic_antiderivative(&b).sub(&cubic_antiderivative(&a), 256);
    assert!(expected.is_exact());
    assert!(value.contains(&expected), "value = {value}");
    assert!(value.re().rad() < Mag::from_2exp(-30));
}

proptest! {
    #[test]
    fn identity_integral_encloses_closed_form(
        ax in -2.0f64..2.0, ay in -2.0f64..2.0,
        bx in -2.0f64..2.0, by in -2.0f64..2.0,
    ) {
        let a = Acb::from_f64(ax, ay);
        let b = Acb::from_f64(bx, by);
        let value = integrate_taylor(&identity, &a, &b, 0.5, 1.5, 30, PREC).expect("integral");
        // (b^2 - a^2) / 2, exact for doubles at 200 bits
        let exact = b.sqr(200).sub(&a.sqr(200), 200).div_ui(2, 200);
        prop_assert!(exact.is_exact());
        prop_assert!(value.contains(&exact), "value = {}", value);
    }
}

#[test]
fn report_lists_every_segment() {
    let path = TaylorPath::new(Acb::zero(), Acb::from_f64(4.0, 0.0), 0.5, 1.0);
    let report = integrate_taylor_report(&identity, &path, 30, PREC, &TaylorOpts::default())
        .expect("report");
    assert_eq!(report.steps.len(), 4);
    assert!(report.value.contains_point(8.0, 0.0));
    for (j, step) in report.steps.iter().enumerate() {
        assert!(step.center.contains_point(0.5 + j as f64, 0.0));
        assert!(step.order >= 2);
        assert!(step.tail_bound <= Mag::from_2exp(-32));
    }
    let again = integrate_taylor_report(&identity, &path, 30, PREC, &TaylorOpts::default())
        .expect("report");
    assert_eq!(report.fingerprint, again.fingerprint);
    assert_eq!(report.fingerprint.len(), 64);
}

#[test]
fn constant_cauchy_bound_is_the_constant() {
    let c = Acb::from_f64(3.0, -4.0);
    let constant = move |out: &mut [Acb], _: &Acb, _: u32| -> Result<(), CertError> {
        out[0] = c.clone();
        Ok(())
    };
    let bound = cauchy_bound(&constant, &Acb::from_f64(1.0, 1.0), &Arb::from_f64(2.0), 8, PREC)
        .expect("bound");
    assert!(bound >= Mag::from_f64(5.0));
    assert!(bound.to_f64() < 5.0 + 1e-12);
}

#[test]
fn identity_cauchy_bound_approaches_radius() {
    let bound = cauchy_bound(&identity, &Acb::zero(), &Arb::from_f64(2.0), 8, PREC).expect("bound");
    assert!(bound >= Mag::from_f64(2.0));
    assert!(bound <= Mag::from_f64(2.25), "bound = {bound}");
}

#[test]
fn shallow_cauchy_bound_is_still_valid() {
    let bound = cauchy_bound(&identity, &Acb::zero(), &Arb::from_f64(2.0), 0, PREC).expect("bound");
    assert!(bound >= Mag::from_f64(2.0));
    assert!(bound.is_finite());
}

#[test]
fn non_finite_circle_is_a_non_finite_error() {
    let center = Acb::from_f64(f64::NAN, 0.0);
    let err = cauchy_bound(&identity, &center, &Arb::from_f64(1.0), 4, PREC)
        .expect_err("non-finite center");
    assert!(matches!(err, CertError::NonFinite(_)));
    assert_eq!(err.code(), "non-finite-circle");

    let radius = Arb::new(1.0, Mag::inf());
    let err = cauchy_bound(&identity, &Acb::zero(), &radius, 4, PREC)
        .expect_err("non-finite radius");
    assert!(matches!(err, CertError::NonFinite(_)));
}

/// Taylor coefficients of `1 / (z - pole)`: `(-1)^k / (z - pole)^(k+1)`.
fn reciprocal_shift(pole: Acb) -> impl Fn(&mut [Acb], &Acb, u32) -> Result<(), CertError> {
    move |out: &mut [Acb], z: &Acb, prec: u32| {
        let w = z.sub(&pole, prec).inv(prec);
        let mut power = w.clone();
        for (k, coeff) in out.iter_mut().enumerate() {
            *coeff = if k % 2 == 0 { power.clone() } else { power.neg() };
            power = power.mul(&w, prec);
        }
        Ok(())
    }
}

#[test]
fn reciprocal_integrates_to_logarithm_difference() {
    // log(1 - p) - log(-p) with p = 1/2 + 2i is 2i atan(1/4)
    let func = reciprocal_shift(Acb::from_f64(0.5, 2.0));
    let value = integrate_taylor(&func, &Acb::zero(), &Acb::one(), 0.5, 1.5, 40, PREC)
        .expect("integral");
    let expected = 2.0 * 0.25f64.atan();
    assert!(value.add_error(&Mag::from_2exp(-48)).contains_point(0.0, expected), "value = {value}");
    assert!(value.re().rad() < Mag::from_2exp(-35));
    assert!(value.im().rad() < Mag::from_2exp(-35));
}

#[test]
fn pole_on_the_outer_circle_is_rejected() {
    let func = reciprocal_shift(Acb::from_f64(0.5, 1.5));
    let err = integrate_taylor(&func, &Acb::zero(), &Acb::one(), 0.5, 1.5, 40, PREC)
        .expect_err("pole on the circle");
    assert!(matches!(err, CertError::NonFinite(_)));
}

#[test]
fn unbounded_samples_abort_with_infinite_cauchy_bound() {
    // finite radius, but a midpoint far beyond any magnitude bound
    let enormous = |out: &mut [Acb], _: &Acb, _: u32| -> Result<(), CertError> {
        out.fill(Acb::zero());
        out[0] = Acb::from_real(Arb::from_parts(Float::from_2exp(1 << 62), Mag::zero()));
        Ok(())
    };
    let err = integrate_taylor(&enormous, &Acb::zero(), &Acb::one(), 0.5, 1.0, 20, PREC)
        .expect_err("unbounded");
    assert!(matches!(err, CertError::NonFinite(_)));
    assert_eq!(err.code(), "infinite-cauchy-bound");
    assert_eq!(err.info().context.get("step").map(String::as_str), Some("0"));
}

#[test]
fn high_precision_meets_a_goal_beyond_double() {
    let a = Acb::from_f64(0.1, 0.0);
    let b = Acb::from_f64(0.7, 0.3);
    let path = TaylorPath::new(a.clone(), b.clone(), 0.5, 1.0);
    let report = integrate_taylor_report(&identity, &path, 150, 300, &TaylorOpts::default())
        .expect("report");
    let goal = Mag::from_2exp(-150);
    assert!(report.value.re().rad() <= goal, "value = {}", report.value);
    assert!(report.value.im().rad() <= goal, "value = {}", report.value);
    assert!(report.goal_met);
    let exact = b.sqr(300).sub(&a.sqr(300), 300).div_ui(2, 300);
    assert!(report.value.contains(&exact));

    let value = integrate_taylor(&identity, &a, &b, 0.5, 1.0, 150, 300).expect("integral");
    assert_eq!(value, report.value);
}

#[test]
fn double_precision_reports_a_missed_goal() {
    let a = Acb::from_f64(0.1, 0.0);
    let b = Acb::from_f64(0.7, 0.3);
    let path = TaylorPath::new(a.clone(), b.clone(), 0.5, 1.0);
    let report = integrate_taylor_report(&identity, &path, 150, PREC, &TaylorOpts::default())
        .expect("report");
    assert!(!report.goal_met);
    assert!(report.total_tail <= Mag::from_2exp(-150));
    // still a valid enclosure of (b^2 - a^2) / 2
    let exact = b.sqr(300).sub(&a.sqr(300), 300).div_ui(2, 300);
    assert!(report.value.contains(&exact));
}

#[test]
fn callback_failures_propagate() {
    let refuses = |_: &mut [Acb], _: &Acb, _: u32| -> Result<(), CertError> {
        Err(callback_error("domain", "outside the domain"))
    };
    let err = integrate_taylor(&refuses, &Acb::zero(), &Acb::one(), 0.5, 1.0, 20, PREC)
        .expect_err("callback failure");
    assert!(matches!(err, CertError::Callback(_)));
    assert_eq!(err.code(), "domain");
}

#[test]
fn non_finite_callback_values_abort() {
    let pole = |out: &mut [Acb], z: &Acb, _: u32| -> Result<(), CertError> {
        // pretends to have a pole wherever the input touches the real axis
        out.fill(Acb::zero());
        if z.im().contains_f64(0.0) {
            out[0] = Acb::from_f64(f64::NAN, 0.0);
        }
        Ok(())
    };
    let err = integrate_taylor(&pole, &Acb::zero(), &Acb::one(), 0.5, 1.0, 20, PREC)
        .expect_err("non-finite");
    assert!(matches!(err, CertError::NonFinite(_)));
}

#[test]
fn invalid_radii_are_rejected() {
    for (inner, outer) in [(1.0, 1.0), (2.0, 1.0), (0.0, 1.0), (0.5, f64::INFINITY)] {
        let err = integrate_taylor(&identity, &Acb::zero(), &Acb::one(), inner, outer, 20, PREC)
            .expect_err("invalid radii");
        assert_eq!(err.code(), "invalid-radii");
    }
}

#[test]
fn step_budget_is_enforced() {
    let opts = TaylorOpts {
        max_steps: 3,
        ..TaylorOpts::default()
    };
    let path = TaylorPath::new(Acb::zero(), Acb::from_f64(10.0, 0.0), 0.5, 1.0);
    let err = integrate_taylor_report(&identity, &path, 20, PREC, &opts).expect_err("budget");
    assert_eq!(err.code(), "too-many-steps");
}

#[test]
fn tight_order_limit_reports_search_failure() {
    let opts = TaylorOpts {
        order_limit: Some(3),
        ..TaylorOpts::default()
    };
    let path = TaylorPath::new(Acb::zero(), Acb::one(), 0.9, 1.0);
    let err = integrate_taylor_report(&identity, &path, 60, PREC, &opts).expect_err("order limit");
    assert!(matches!(err, CertError::Search(_)));
    assert_eq!(err.code(), "tolerance-unreachable");
    assert_eq!(err.info().context.get("step").map(String::as_str), Some("0"));
}

#[test]
fn options_load_from_yaml() {
    let opts: TaylorOpts = from_yaml_slice(b"cauchy_depth: 4\norder_limit: 500\n").expect("yaml");
    assert_eq!(opts.cauchy_depth, 4);
    assert_eq!(opts.order_limit, Some(500));
    assert_eq!(opts.max_steps, 1 << 20);
}
