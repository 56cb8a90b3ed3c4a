#[macro_use]
extern crate criterion;
extern crate parabrot;

use criterion::Criterion;
use parabrot::{NaiveRenderer, Pipeline, RunConfig};

fn bench_config(workers: usize) -> RunConfig {
    RunConfig {
        region_count: 64,
        worker_count: workers,
        iteration_bound: 255,
        progress: false,
        ..RunConfig::with_size(320, 200)
    }
}

fn naive(c: &mut Criterion) {
    let config = bench_config(1);
    c.bench_function("naive 320x200", move |b| {
        let renderer = NaiveRenderer::new(&config).unwrap();
        b.iter(|| renderer.render().unwrap())
    });
}

fn pipeline(c: &mut Criterion) {
    let config = bench_config(num_cpus::get());
    c.bench_function("pipeline 320x200", move |b| {
        b.iter(|| Pipeline::new(&config).run().unwrap())
    });
}

criterion_group!(benches, naive, pipeline);
criterion_main!(benches);
