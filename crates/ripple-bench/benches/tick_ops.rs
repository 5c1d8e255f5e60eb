//! Criterion benchmarks for tick execution on cached schedules.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ripple_bench::{chain_profile, mixed_profile};
use ripple_engine::Simulator;

fn bench_tick_chain_1k(c: &mut Criterion) {
    let mut sim = Simulator::build(chain_profile(1_000)).unwrap();

    // Warm up: size the per-tick buffers.
    sim.tick().unwrap();

    c.bench_function("tick_chain_1k", |b| {
        b.iter(|| {
            let outcome = sim.tick().unwrap();
            black_box(&outcome);
        });
    });
}

fn bench_tick_mixed_10k(c: &mut Criterion) {
    let mut sim = Simulator::build(mixed_profile(10_000, 42)).unwrap();
    sim.tick().unwrap();

    c.bench_function("tick_mixed_10k", |b| {
        b.iter(|| {
            let outcome = sim.tick().unwrap();
            black_box(&outcome);
        });
    });
}

fn bench_1000_ticks_mixed_1k(c: &mut Criterion) {
    c.bench_function("1000_ticks_mixed_1k", |b| {
        b.iter(|| {
            let mut sim = Simulator::build(mixed_profile(1_000, 42)).unwrap();
            black_box(sim.run(1_000).unwrap());
        });
    });
}

fn bench_line_trace_10k(c: &mut Criterion) {
    let mut sim = Simulator::build(mixed_profile(10_000, 42)).unwrap();
    sim.run(10).unwrap();

    c.bench_function("line_trace_10k", |b| {
        b.iter(|| black_box(sim.line_trace()));
    });
}

criterion_group!(
    benches,
    bench_tick_chain_1k,
    bench_tick_mixed_10k,
    bench_1000_ticks_mixed_1k,
    bench_line_trace_10k
);
criterion_main!(benches);
