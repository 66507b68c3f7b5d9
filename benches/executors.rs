use criterion::{criterion_group, criterion_main, Criterion};

use spindle::work::{self, Dataset};
use spindle::{AtomicQueueExecutor, LockedQueueExecutor, PreassignedExecutor};

const WORKERS: usize = 4;

// A stacked dataset is the adversarial case for pre-assignment: all the
// heavy items land in one worker's sub-range, so the queued strategies
// should win by a wide margin here.
fn stacked_data() -> Dataset {
    work::generate_stacked(8, 2_048)
}

fn executors(c: &mut Criterion) {
    let data = stacked_data();

    let mut g = c.benchmark_group("stacked");
    g.sample_size(10);
    g.bench_function("preassigned", |b| {
        b.iter(|| PreassignedExecutor::new(WORKERS).process(&data).result)
    });
    g.bench_function("locked-queue", |b| {
        b.iter(|| LockedQueueExecutor::new(WORKERS).process(&data).result)
    });
    g.bench_function("atomic-queue", |b| {
        b.iter(|| AtomicQueueExecutor::new(WORKERS).process(&data).result)
    });
    g.finish();

    let even = work::generate_even(8, 2_048);
    let mut g = c.benchmark_group("even");
    g.sample_size(10);
    g.bench_function("preassigned", |b| {
        b.iter(|| PreassignedExecutor::new(WORKERS).process(&even).result)
    });
    g.bench_function("atomic-queue", |b| {
        b.iter(|| AtomicQueueExecutor::new(WORKERS).process(&even).result)
    });
    g.finish();
}

criterion_group!(benches, executors);
criterion_main!(benches);
