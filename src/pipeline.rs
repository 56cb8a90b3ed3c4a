// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wires the partitioner, dispatcher, workers and aggregator into one
//! run.
//!
//! ```text
//!  partitioner ──regions──▶ dispatcher ──spawns──▶ workers ──pixels──▶ aggregator
//!                              ▲                      │
//!                              └──────permits─────────┘
//! ```
//!
//! The region channel holds every region, so partitioning finishes
//! before the dispatcher starts.  The pixel channel is unbounded: a
//! worker never waits on the aggregator.  Everything runs inside one
//! crossbeam scope, so no worker outlives the call that started it.

use crate::aggregate::{Aggregator, Completion, Raster};
use crate::cancel::Cancellation;
use crate::config::RunConfig;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::errors::Result;
use crate::escape::{Mandelbrot, PixelComputer};
use crate::progress::{ProgressBar, ProgressObserver, Silent};
use crate::regions::RegionPartitioner;
use crossbeam::channel::{bounded, unbounded};
use log::{info, warn};
use std::panic;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The result of a finished run.
#[derive(Debug)]
pub struct Rendered {
    /// The finished image.
    pub raster: Raster,
    /// Pixels the aggregator wrote.
    pub pixels: usize,
    /// What the dispatcher did.
    pub dispatch: DispatchReport,
    /// Wall-clock time from first region to last pixel.
    pub elapsed: Duration,
}

/// One configured render, ready to run.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    progress: Option<&'a dyn ProgressObserver>,
    bar: ProgressBar,
    cancel: Cancellation,
}

impl<'a> Pipeline<'a> {
    /// A pipeline for `config`.  Draws progress bars on stderr if the
    /// configuration asks for them.
    pub fn new(config: &'a RunConfig) -> Self {
        Pipeline {
            config,
            progress: None,
            bar: ProgressBar::new(),
            cancel: Cancellation::new(),
        }
    }

    /// Report progress to `progress` instead.
    pub fn with_progress(mut self, progress: &'a dyn ProgressObserver) -> Self {
        self.progress = Some(progress);
        self
    }

    fn observer(&self) -> &dyn ProgressObserver {
        match self.progress {
            Some(progress) => progress,
            None if self.config.progress => &self.bar,
            None => &Silent,
        }
    }

    /// Stop early when `cancel` is raised.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Render the Mandelbrot set described by the configuration.
    pub fn run(&self) -> Result<Rendered> {
        self.config.validate()?;
        let mandelbrot = Mandelbrot::new(self.config)?;
        self.run_with(&mandelbrot)
    }

    /// Render the configured image with any pixel computer.
    pub fn run_with<P: PixelComputer + ?Sized>(&self, computer: &P) -> Result<Rendered> {
        let config = self.config;
        config.validate()?;

        let partitioner = RegionPartitioner::new(config)?;
        let region_count = partitioner.region_count();
        let target = partitioner.covered_pixels();
        if target < config.len() {
            warn!(
                "{}x{} does not divide into a {}x{} grid; {} pixels along the edges stay blank",
                config.width,
                config.height,
                partitioner.side(),
                partitioner.side(),
                config.len() - target
            );
        }
        info!(
            "rendering {}x{} at {} iterations: {} regions on {} workers",
            config.width, config.height, config.iteration_bound, region_count, config.worker_count
        );
        let started = Instant::now();

        let (region_tx, region_rx) = bounded(region_count);
        for region in partitioner {
            if region_tx.send(region).is_err() {
                unreachable!("the region channel holds every region");
            }
        }
        drop(region_tx);

        let progress = self.observer();
        let (pixel_tx, pixel_rx) = unbounded();
        let completion = Arc::new(Completion::new(target));
        let dispatcher = Dispatcher::new(
            config.worker_count,
            computer,
            self.cancel.clone(),
            progress,
        );
        let aggregator = Aggregator::new(
            config.width,
            config.height,
            completion.clone(),
            progress,
        );
        let cancel = self.cancel.clone();

        let (raster, dispatch) = crossbeam::scope(|scope| {
            let dispatching =
                scope.spawn(move |scope| dispatcher.run(scope, region_rx, pixel_tx, region_count));
            let aggregating = scope.spawn(move |_| aggregator.run(pixel_rx, &cancel));

            let raster = aggregating
                .join()
                .unwrap_or_else(|e| panic::resume_unwind(e));
            let dispatch = dispatching
                .join()
                .unwrap_or_else(|e| panic::resume_unwind(e));
            (raster, dispatch)
        })
        .unwrap_or_else(|e| panic::resume_unwind(e));

        let raster = raster?;
        assert_eq!(dispatch.regions, region_count);
        assert!(completion.is_complete());

        let elapsed = started.elapsed();
        info!(
            "rendered {} pixels in {:.3}s, at most {} workers at once",
            completion.written(),
            elapsed.as_secs_f64(),
            dispatch.peak_workers
        );
        Ok(Rendered {
            raster,
            pixels: completion.written(),
            dispatch,
            elapsed,
        })
    }
}
