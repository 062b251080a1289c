//! Benchmarks for cell sequence aggregation over synthetic taxi trips.
//!
//! Run with: `cargo bench --bench aggregation --features synthetic`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hextrail::synthetic::SyntheticScenario;
use hextrail::{
    AggregationConfig, H3Grid, NoopProgress, TaskVariant, aggregate, build_cell_sequence,
};

fn bench_build_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_cell_sequence");

    for (name, scenario) in [
        ("porto", SyntheticScenario::porto_taxis(20)),
        ("sparse_highway", SyntheticScenario::sparse_highway(20)),
    ] {
        let trajectories = scenario.generate().trajectories();
        for resolution in [8u8, 9, 10] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("res{}", resolution)),
                &trajectories,
                |b, trajectories| {
                    b.iter(|| {
                        for trajectory in trajectories {
                            black_box(build_cell_sequence(
                                trajectory.samples(),
                                black_box(resolution),
                                &H3Grid,
                            ));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    group.sample_size(20);

    for trip_count in [100usize, 500, 2000] {
        let trajectories = SyntheticScenario::porto_taxis(trip_count)
            .generate()
            .trajectories();

        for variant in [TaskVariant::Estimation, TaskVariant::Prediction] {
            let config = AggregationConfig::new(variant, None).unwrap();
            group.bench_with_input(
                BenchmarkId::new(variant.version_id(), trip_count),
                &trajectories,
                |b, trajectories| {
                    b.iter(|| {
                        black_box(aggregate(
                            black_box(trajectories),
                            &config,
                            &H3Grid,
                            &NoopProgress,
                        ))
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build_sequence, bench_aggregate);
criterion_main!(benches);
