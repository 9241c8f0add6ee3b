//! 短码分配基准测试

use std::collections::HashSet;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use majlis_portal::utils::code_allocator::{allocate, candidates};

/// 预占 `BASE`, `BASE1` .. `BASE{n-1}`
fn taken_codes(base: &str, n: usize) -> HashSet<String> {
    candidates(base).take(n).collect()
}

fn bench_allocate_free(c: &mut Criterion) {
    let taken = HashSet::new();
    c.bench_function("allocate/free_base", |b| {
        b.iter(|| allocate("Nairobi", |code| taken.contains(code)).expect("allocate"));
    });
}

fn bench_allocate_collisions(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate/collisions");
    for n in [1usize, 10, 100, 999] {
        let taken = taken_codes("NAI", n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &taken, |b, taken| {
            b.iter(|| allocate("Nairobi", |code| taken.contains(code)).expect("allocate"));
        });
    }
    group.finish();
}

fn bench_allocate_exhausted(c: &mut Criterion) {
    let taken = taken_codes("NAI", 1000);
    c.bench_function("allocate/exhausted", |b| {
        b.iter(|| {
            assert!(allocate("Nairobi", |code| taken.contains(code)).is_err());
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_free,
    bench_allocate_collisions,
    bench_allocate_exhausted,
);
criterion_main!(benches);
