//! Criterion benchmarks for schedule construction and cache lookups.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ripple_bench::{chain_profile, decls, mixed_profile};
use ripple_core::ActionId;
use ripple_sched::{
    build_schedule, collect_constraints, DependencyGraph, FootprintOracle, Scheduler, TieBreak,
};

fn bench_build_chain_1k(c: &mut Criterion) {
    let cfg = chain_profile(1_000);
    let decls = decls(&cfg);

    c.bench_function("build_chain_1k", |b| {
        b.iter(|| {
            let schedule = build_schedule(
                &decls,
                &cfg.constraints,
                &cfg.footprints,
                &cfg.nets,
                TieBreak::DeclarationOrder,
            )
            .unwrap();
            black_box(&schedule);
        });
    });
}

fn bench_build_mixed_10k(c: &mut Criterion) {
    let cfg = mixed_profile(10_000, 42);
    let decls = decls(&cfg);

    c.bench_function("build_mixed_10k", |b| {
        b.iter(|| {
            let schedule = build_schedule(
                &decls,
                &cfg.constraints,
                &cfg.footprints,
                &cfg.nets,
                TieBreak::Seeded(7),
            )
            .unwrap();
            black_box(&schedule);
        });
    });
}

fn bench_graph_mixed_10k(c: &mut Criterion) {
    let cfg = mixed_profile(10_000, 42);
    let decls = decls(&cfg);
    let footprints: Vec<_> = (0..decls.len())
        .map(|i| cfg.footprints.footprint(ActionId(i as u32)).unwrap())
        .collect();
    let explicit = collect_constraints(&cfg.constraints, &footprints, &cfg.nets).unwrap();

    c.bench_function("graph_mixed_10k", |b| {
        b.iter(|| {
            let graph = DependencyGraph::build(&decls, &footprints, &explicit, &cfg.nets).unwrap();
            black_box(&graph);
        });
    });
}

fn bench_cache_hit_mixed_10k(c: &mut Criterion) {
    let cfg = mixed_profile(10_000, 42);
    let decls = decls(&cfg);
    let mut scheduler = Scheduler::default();
    scheduler
        .schedule(&decls, &cfg.constraints, &cfg.footprints, &cfg.nets)
        .unwrap();

    c.bench_function("cache_hit_mixed_10k", |b| {
        b.iter(|| {
            let schedule = scheduler
                .schedule(&decls, &cfg.constraints, &cfg.footprints, &cfg.nets)
                .unwrap();
            black_box(&schedule);
        });
    });
}

criterion_group!(
    benches,
    bench_build_chain_1k,
    bench_build_mixed_10k,
    bench_graph_mixed_10k,
    bench_cache_hit_mixed_10k
);
criterion_main!(benches);
