// In benches/grid_search_bench.rs

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use prepcv::kernels::color::Grayscale;
use prepcv::kernels::threshold::AdaptiveThreshold;
use prepcv::pipeline::{count_combinations, resolve};
use prepcv::search::ScoreOracle;
use prepcv::{Image, ParamSpec, PipelineDescription, PipelineRegistry, SearchStrategy, Selector};

// --- Mock Data Generation ---

/// A seeded noise image, so every run benchmarks the same pixels.
fn generate_noise_image(rows: usize, cols: usize) -> Image {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    Array3::from_shape_fn((rows, cols, 3), |_| rng.random::<u8>())
}

/// `grayscale -> adaptive_threshold` over a 4 x 2 x 3 grid (24 candidates).
fn generate_description() -> PipelineDescription {
    PipelineDescription::builder()
        .stage(Arc::new(Grayscale), ParamSpec::new())
        .stage(
            Arc::new(AdaptiveThreshold),
            ParamSpec::new()
                .candidates("blockSize", [3, 5, 7, 9])
                .candidates("adaptiveMethod", ["mean_c", "gaussian_c"])
                .candidates("C", [0, 2, 4]),
        )
        .build()
        .expect("benchmark description is valid")
}

// --- Benchmark Suite ---

const BENCH_IMAGE_SIDE: usize = 64;

fn bench_grid_search(c: &mut Criterion) {
    // --- Setup Data ---
    let description = generate_description();
    let input = generate_noise_image(BENCH_IMAGE_SIDE, BENCH_IMAGE_SIDE);

    // --- Create a Benchmark Group ---
    let mut group = c.benchmark_group("Grid Search");
    group.throughput(criterion::Throughput::Elements(count_combinations(&description) as u64));

    group.bench_function("Resolve [1] Expand Description", |b| {
        b.iter(|| black_box(resolve(black_box(&description))))
    });

    group.bench_function("Search [2] Automatic Tournament (batch 4)", |b| {
        b.iter(|| {
            let mut registry = PipelineRegistry::new();
            registry.register(&description);
            let mut oracle = ScoreOracle::foreground_ratio();
            let mut selector = Selector::new(4, &mut oracle).unwrap();
            let report = registry
                .run_search(black_box(&input), &SearchStrategy::default(), None, &mut selector, false)
                .unwrap();
            black_box(report.winner_index)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_grid_search);
criterion_main!(benches);
