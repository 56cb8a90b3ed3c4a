extern crate parabrot;
extern crate tempfile;

use parabrot::encode::{output_path, write_image};
use parabrot::progress::{ProgressObserver, Stage};
use parabrot::{
    Cancellation, Color, Error, EscapeTest, ImageFormat, NaiveRenderer, Pipeline, PixelComputer,
    RunConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

fn quiet(width: usize, height: usize, regions: usize, workers: usize, iterations: usize) -> RunConfig {
    RunConfig {
        width,
        height,
        region_count: regions,
        worker_count: workers,
        iteration_bound: iterations,
        progress: false,
        ..RunConfig::default()
    }
}

// Counts calls and, optionally, takes its time about each one.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
    delay_ms: u64,
}

impl PixelComputer for Counting {
    fn color(&self, x: usize, y: usize) -> Color {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.delay_ms));
        }
        Color(((x + y) % 256) as u8)
    }
}

#[test]
fn two_by_two_with_one_region_and_one_worker() {
    let config = quiet(2, 2, 1, 1, 10);
    let computer = Counting::default();
    let rendered = Pipeline::new(&config).run_with(&computer).unwrap();
    assert_eq!(rendered.pixels, 4);
    assert_eq!(rendered.dispatch.regions, 1);
    assert_eq!(rendered.dispatch.peak_workers, 1);
    assert_eq!(computer.calls.load(Ordering::SeqCst), 4);
    assert_eq!(rendered.raster.filled(), 4);
}

#[test]
fn four_by_four_never_runs_more_than_two_workers() {
    let config = quiet(4, 4, 4, 2, 10);
    let computer = Counting {
        delay_ms: 2,
        ..Counting::default()
    };
    let rendered = Pipeline::new(&config).run_with(&computer).unwrap();
    assert_eq!(rendered.dispatch.regions, 4);
    assert_eq!(rendered.pixels, 16);
    assert!(rendered.dispatch.peak_workers <= 2);
    // Each region takes several milliseconds, so the first two overlap.
    assert_eq!(rendered.dispatch.peak_workers, 2);
}

#[test]
fn the_pipeline_draws_what_the_naive_renderer_draws() {
    for &(regions, workers) in &[(1, 1), (4, 2), (16, 3), (64, 12)] {
        let config = quiet(64, 48, regions, workers, 60);
        let piped = Pipeline::new(&config).run().unwrap();
        let naive = NaiveRenderer::new(&config).unwrap().render().unwrap();
        assert_eq!(
            piped.raster, naive,
            "{} regions on {} workers",
            regions, workers
        );
    }
}

#[test]
fn legacy_escape_still_matches_between_renderers() {
    let config = RunConfig {
        escape_test: EscapeTest::LegacyRealPart,
        ..quiet(60, 40, 4, 4, 40)
    };
    let piped = Pipeline::new(&config).run().unwrap();
    let naive = NaiveRenderer::new(&config).unwrap().render().unwrap();
    assert_eq!(piped.raster, naive);
}

#[test]
fn ten_regions_render_a_three_by_three_grid_and_leave_the_edges_blank() {
    let config = quiet(10, 10, 10, 3, 10);
    let computer = Counting::default();
    let rendered = Pipeline::new(&config).run_with(&computer).unwrap();
    assert_eq!(rendered.dispatch.regions, 9);
    assert_eq!(rendered.pixels, 81);
    assert_eq!(computer.calls.load(Ordering::SeqCst), 81);
    assert_eq!(rendered.raster.get(9, 9), Color(0));
    assert_eq!(rendered.raster.get(8, 8), Color(16));
}

struct CancelsOnFirstPixel(Cancellation);

impl PixelComputer for CancelsOnFirstPixel {
    fn color(&self, _x: usize, _y: usize) -> Color {
        self.0.cancel();
        Color(7)
    }
}

#[test]
fn cancelling_mid_run_stops_early() {
    let config = quiet(32, 32, 16, 2, 10);
    let cancel = Cancellation::new();
    let computer = CancelsOnFirstPixel(cancel.clone());
    let result = Pipeline::new(&config)
        .with_cancellation(cancel)
        .run_with(&computer);
    match result {
        Err(Error::Cancelled { written, total }) => {
            assert_eq!(total, 1024);
            assert!(written >= 1 && written <= 2, "wrote {}", written);
        }
        other => panic!("expected cancellation, got {:?}", other.map(|r| r.pixels)),
    }
}

#[derive(Default)]
struct Deciles(Mutex<Vec<(Stage, usize)>>);

impl ProgressObserver for Deciles {
    fn on_decile(&self, stage: Stage, decile: usize) {
        self.0.lock().unwrap().push((stage, decile));
    }
}

#[test]
fn progress_reports_each_decile_of_each_stage_once() {
    let config = quiet(20, 20, 4, 2, 10);
    let deciles = Deciles::default();
    Pipeline::new(&config)
        .with_progress(&deciles)
        .run()
        .unwrap();

    let seen = deciles.0.lock().unwrap();
    for stage in &[Stage::Dispatch, Stage::Aggregate] {
        let mine: Vec<usize> = seen
            .iter()
            .filter(|(s, _)| s == stage)
            .map(|(_, d)| *d)
            .collect();
        assert_eq!(mine, (1..=10).collect::<Vec<_>>(), "{:?}", stage);
    }
}

#[test]
fn written_images_decode_to_the_same_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let config = quiet(40, 30, 4, 2, 30);
    let rendered = Pipeline::new(&config).run().unwrap();

    for &format in &[ImageFormat::Png, ImageFormat::Pnm] {
        let path = output_path(dir.path(), &config, format);
        write_image(&path, &rendered.raster, format).unwrap();
        let decoded = image::open(&path).unwrap().to_luma().into_raw();
        assert_eq!(decoded.as_slice(), rendered.raster.as_bytes(), "{:?}", format);
    }
}

#[test]
fn an_unwritable_destination_still_leaves_a_finished_raster() {
    let dir = tempfile::tempdir().unwrap();
    let config = quiet(8, 8, 4, 2, 10);
    let rendered = Pipeline::new(&config).run().unwrap();
    let path = output_path(&dir.path().join("missing"), &config, ImageFormat::Png);
    match write_image(&path, &rendered.raster, ImageFormat::Png) {
        Err(Error::ResourceCreation { .. }) => {}
        other => panic!("expected a resource error, got {:?}", other),
    }
    assert!(!path.exists());
    assert_eq!(rendered.raster.filled(), 64);
}
