//! Benchmarks for the recycling pool

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use textmesh_core::alloc::{Pool, Reusable};

#[derive(Default)]
struct Unit {
    glyphs: Vec<u32>,
}

impl Reusable for Unit {
    fn reset(&mut self) {
        self.glyphs.clear();
    }
}

fn bench_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool");

    for count in [16usize, 256, 4096] {
        group.bench_function(format!("cold_{}", count), |b| {
            b.iter(|| {
                let mut pool = Pool::<Unit>::new();
                let units: Vec<_> = (0..count).map(|_| pool.acquire()).collect();
                black_box(pool.recycle(units))
            });
        });

        group.bench_function(format!("warm_{}", count), |b| {
            let mut pool = Pool::<Unit>::new();
            let units: Vec<_> = (0..count).map(|_| pool.acquire()).collect();
            pool.recycle(units);
            b.iter(|| {
                let units: Vec<_> = (0..count).map(|_| pool.acquire()).collect();
                black_box(pool.recycle(units))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_acquire_release);
criterion_main!(benches);
