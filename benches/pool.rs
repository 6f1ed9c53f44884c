use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use corral::{FactoryError, Pool};

fn acquire_release(c: &mut Criterion) {
    let pool = Pool::new(16, || Ok::<_, FactoryError>(0u64)).unwrap();

    c.bench_function("acquire_release", |b| {
        b.iter(|| {
            let handle = pool.acquire().unwrap();
            black_box(*handle);
            pool.release(handle).unwrap();
        })
    });

    c.bench_function("checkout_guard", |b| {
        b.iter(|| {
            let guard = pool.checkout().unwrap();
            black_box(*guard);
        })
    });

    c.bench_function("acquire_timeout_hit", |b| {
        b.iter(|| {
            let handle = pool.acquire_timeout(Duration::from_millis(100)).unwrap();
            pool.release(handle).unwrap();
        })
    });
}

criterion_group!(benches, acquire_release);
criterion_main!(benches);
