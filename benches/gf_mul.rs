use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rlnc_decoder::fec::gf_tables::{gf_mul, GF256};

fn bench_gf_mul(c: &mut Criterion) {
    c.bench_function("gf256_mul", |b| {
        b.iter(|| {
            let mut acc = 1u8;
            for x in 0..=255u8 {
                acc = gf_mul(GF256, black_box(acc), black_box(x));
            }
            acc
        })
    });
}

criterion_group!(benches, bench_gf_mul);
criterion_main!(benches);
