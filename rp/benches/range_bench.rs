use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rangepool::range;
use std::hint::black_box;

fn bench_run(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime");

    let mut group = c.benchmark_group("range_run");
    for max_concurrency in [1usize, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_concurrency),
            &max_concurrency,
            |b, &max_concurrency| {
                let factory = range(0, 10_000, Some(max_concurrency), |n| async move {
                    tokio::task::yield_now().await;
                    Ok::<_, String>(vec![black_box(n)])
                })
                .expect("valid range");

                b.iter(|| runtime.block_on(factory.run()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
