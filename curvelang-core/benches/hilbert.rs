use criterion::{black_box, criterion_group, criterion_main, Criterion};
use curvelang_core::hilbert::{coord_of, dist_of};

fn bench_round_trip(c: &mut Criterion) {
    let p = 10u32; // 1024x1024 grid, 2^20 points
    let len = 1u64 << (2 * p);
    c.bench_function("coord_of order 10", |b| {
        b.iter(|| {
            for d in (0..len).step_by(997) {
                black_box(coord_of(black_box(d), p));
            }
        })
    });
    c.bench_function("dist_of order 10", |b| {
        b.iter(|| {
            for d in (0..len).step_by(997) {
                let (x, y) = coord_of(d, p);
                black_box(dist_of(black_box(x), black_box(y), p));
            }
        })
    });
}

criterion_group!(benches, bench_round_trip);
criterion_main!(benches);
