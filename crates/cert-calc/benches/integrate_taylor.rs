use cert_calc::{cauchy_bound, integrate_taylor};
use cert_core::{Acb, Arb, CertError};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn quartic(out: &mut [Acb], z: &Acb, prec: u32) -> Result<(), CertError> {
    // z^4 + z
    let z2 = z.sqr(prec);
    let values = [
        z2.sqr(prec).add(z, prec),
        z2.mul(z, prec).mul_ui(4, prec).add(&Acb::one(), prec),
        z2.mul_ui(6, prec),
        z.mul_ui(4, prec),
        Acb::one(),
    ];
    for (k, coeff) in out.iter_mut().enumerate() {
        *coeff = values.get(k).cloned().unwrap_or_else(Acb::zero);
    }
    Ok(())
}

fn bench_integrate(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1234);
    let endpoints: Vec<(Acb, Acb)> = (0..8)
        .map(|_| {
            let a = Acb::from_f64(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
            let b = Acb::from_f64(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
            (a, b)
        })
        .collect();

    c.bench_function("integrate_taylor_quartic", |b| {
        b.iter(|| {
            for (start, end) in &endpoints {
                let _ = black_box(integrate_taylor(&quartic, start, end, 0.5, 1.0, 53, 53));
            }
        })
    });

    c.bench_function("cauchy_bound_depth8", |b| {
        b.iter(|| {
            let _ = black_box(cauchy_bound(
                &quartic,
                &Acb::from_f64(0.3, -0.2),
                &Arb::from_f64(1.5),
                8,
                53,
            ));
        })
    });
}

criterion_group!(benches, bench_integrate);
criterion_main!(benches);
