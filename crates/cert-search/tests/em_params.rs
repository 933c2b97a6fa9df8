use cert_core::{from_yaml_slice, stable_hash_string, Acb, CertError, ErrorInfo, Mag};
use cert_search::{choose_em_params, choose_m, em_limit, em_tolerance, EmParamOpts, MagEstimate};

/// Synthetic truncation bound shaped like the Euler–Maclaurin remainder:
/// each Bernoulli term buys a bit and each summed term a little more.
fn toy_bound(n: u64, m: u64, _prec: u32) -> Result<Mag, CertError> {
    Ok(Mag::from_2exp(-(m as i64)).mul(&Mag::from_f64(1.0 / n as f64)))
}

#[test]
fn flat_tolerance_when_a_is_one() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(20.0, 0.0);
    let tol = em_tolerance(&s, &Acb::one(), 64, 53, &opts);
    assert_eq!(tol, Mag::from_2exp(-64));
}

#[test]
fn flat_tolerance_when_real_part_is_small() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(8.0, 3.0);
    let a = Acb::from_f64(2.0, 0.0);
    assert_eq!(em_tolerance(&s, &a, 30, 53, &opts), Mag::from_2exp(-30));
}

#[test]
fn tolerance_is_rescaled_by_leading_term() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(16.0, 0.0);
    let a = Acb::from_f64(2.0, 0.0);
    let tol = em_tolerance(&s, &a, 30, 53, &opts).to_f64();
    let expected = 2f64.powi(-46);
    assert!((tol / expected - 1.0).abs() < 1e-9);
}

#[test]
fn overflowing_estimate_falls_back_to_flat_tolerance() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(16.0, 0.0);
    // a = 0 makes ln|a| infinite
    let a = Acb::zero();
    assert_eq!(em_tolerance(&s, &a, 30, 53, &opts), Mag::from_2exp(-30));
    assert_eq!(cert_search::estimate_mag(&s, &a, 53), MagEstimate::Overflowed);
}

#[test]
fn limit_depends_on_imaginary_part() {
    let opts = EmParamOpts::default();
    assert_eq!(em_limit(&Acb::from_f64(0.5, 14.0), 53, &opts), 5300);
    assert_eq!(em_limit(&Acb::from_f64(0.5, 1024.0), 53, &opts), 5300);
    assert_eq!(em_limit(&Acb::from_f64(0.5, -1025.0), 53, &opts), u64::MAX / 4);
}

#[test]
fn selects_small_parameters_for_the_toy_bound() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(2.0, 0.0);
    let params = choose_em_params(&s, &Acb::one(), 53, 53, &opts, toy_bound).expect("params");
    assert!(params.bound <= params.tolerance);
    assert_eq!(params.m, choose_m(params.n, 53, opts.m_cap));
    // 48 is the first n with n + log2(n) >= 53
    assert!(params.n >= 48 && params.n <= 52, "n = {}", params.n);
    assert_eq!(params.limit, 5300);
}

#[test]
fn immediate_success_at_two() {
    let params = choose_em_params(
        &Acb::from_f64(2.0, 0.0),
        &Acb::one(),
        10,
        53,
        &EmParamOpts::default(),
        |_, _, _| Ok(Mag::zero()),
    )
    .expect("params");
    assert_eq!(params.n, 2);
    assert_eq!(params.m, 2);
    assert_eq!(params.evaluations, 1);
}

#[test]
fn unreachable_tolerance_is_reported() {
    let opts = EmParamOpts::default();
    let err = choose_em_params(&Acb::from_f64(0.5, 3.0), &Acb::one(), 20, 53, &opts, |_, _, _| {
        Ok(Mag::from_2exp(-5))
    })
    .expect_err("cannot reach 2^-20");
    assert_eq!(err.code(), "tolerance-unreachable");
    assert_eq!(err.info().context.get("limit").map(String::as_str), Some("2000"));
}

#[test]
fn bound_failures_propagate() {
    let err = choose_em_params(
        &Acb::from_f64(3.0, 0.0),
        &Acb::one(),
        20,
        53,
        &EmParamOpts::default(),
        |_, _, _| Err(CertError::NonFinite(ErrorInfo::new("bound-nan", "bad bound"))),
    )
    .expect_err("propagated");
    assert_eq!(err.code(), "bound-nan");
}

#[test]
fn non_finite_inputs_are_rejected() {
    let s = Acb::from_f64(f64::NAN, 0.0);
    let err = choose_em_params(&s, &Acb::one(), 20, 53, &EmParamOpts::default(), toy_bound)
        .expect_err("non-finite");
    assert!(matches!(err, CertError::NonFinite(_)));
}

#[test]
fn working_precision_reaches_the_bound() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(2.0, 0.0);
    let seen = std::cell::Cell::new(0u32);
    let params = choose_em_params(&s, &Acb::one(), 40, 96, &opts, |n, m, prec| {
        seen.set(prec);
        toy_bound(n, m, prec)
    })
    .expect("params");
    assert_eq!(seen.get(), 96);
    assert!(params.bound <= params.tolerance);
}

#[test]
fn tolerance_rescaling_holds_at_higher_precision() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(16.0, 0.0);
    let a = Acb::from_f64(2.0, 0.0);
    assert_eq!(em_tolerance(&s, &a, 30, 53, &opts), em_tolerance(&s, &a, 30, 256, &opts));
}

#[test]
fn options_load_from_partial_yaml() {
    let opts: EmParamOpts = from_yaml_slice(b"limit_factor: 10\nwindow: 1\n").expect("yaml");
    assert_eq!(opts.limit_factor, 10);
    assert_eq!(opts.window, 1);
    assert_eq!(opts.m_cap, 2000);
    assert_eq!(opts.imag_threshold_log2, 10);
    assert_eq!(opts.pathological_limit, u64::MAX / 4);
}

#[test]
fn selections_are_reproducible() {
    let opts = EmParamOpts::default();
    let s = Acb::from_f64(12.0, 1.0);
    let a = Acb::from_f64(1.5, 0.0);
    let first = choose_em_params(&s, &a, 80, 128, &opts, toy_bound).expect("params");
    let second = choose_em_params(&s, &a, 80, 128, &opts, toy_bound).expect("params");
    assert_eq!(first, second);
    assert_eq!(
        stable_hash_string(&first).expect("hash"),
        stable_hash_string(&second).expect("hash")
    );
}
