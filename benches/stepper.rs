//! Benchmarks for the Gray-Scott step program.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use gray_scott::{
    compute::{BRUSH_SENTINEL, FieldPair, StepParams, step_pair},
    schema::{Seed, SimulationConfig},
};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for size in [128, 256, 512, 1024] {
        let config = SimulationConfig {
            width: size,
            height: size,
            ..SimulationConfig::default()
        };
        let params = StepParams::from_config(&config, 0.8);
        let mut pair = FieldPair::from_seed(&Seed::default(), size, size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    step_pair(black_box(&mut pair), &params, BRUSH_SENTINEL);
                });
            },
        );
    }

    group.finish();
}

fn bench_frame_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_batch");
    group.sample_size(20);

    let config = SimulationConfig {
        width: 512,
        height: 512,
        ..SimulationConfig::default()
    };
    let substeps = config.substeps;
    let params = StepParams::from_config(&config, 0.8);
    let mut pair = FieldPair::from_seed(&Seed::default(), 512, 512);

    group.bench_function("512x512x8", |b| {
        b.iter(|| {
            for _ in 0..substeps {
                step_pair(black_box(&mut pair), &params, BRUSH_SENTINEL);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_frame_batch);
criterion_main!(benches);
