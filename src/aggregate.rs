// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single writer.  The aggregator owns the raster for the whole
//! run, takes pixel results off the channel in whatever order workers
//! produce them, and stops the moment the last expected pixel has been
//! written.
//!
//! Every pixel is written before it is counted.  When the counter
//! reaches its total, the raster already holds that pixel.

use crate::cancel::Cancellation;
use crate::errors::{Error, Result};
use crate::escape::Color;
use crate::progress::{DecileTracker, ProgressObserver, Stage};
use crate::worker::PixelResult;
use crossbeam::channel::Receiver;
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The image being drawn, one gray byte per pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    written: Vec<bool>,
    filled: usize,
}

impl Raster {
    /// A black raster with nothing written yet.
    pub fn new(width: usize, height: usize) -> Self {
        Raster {
            width,
            height,
            pixels: vec![0; width * height],
            written: vec![false; width * height],
            filled: 0,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels written so far.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// The color at `(x, y)`.  Pixels never written are black.
    pub fn get(&self, x: usize, y: usize) -> Color {
        Color(self.pixels[self.offset(x, y)])
    }

    /// Write `(x, y)`.  Panics on a pixel outside the raster or one
    /// that was already written.
    pub fn put(&mut self, x: usize, y: usize, color: Color) {
        let offset = self.offset(x, y);
        assert!(
            !self.written[offset],
            "pixel ({}, {}) written twice",
            x,
            y
        );
        self.written[offset] = true;
        self.pixels[offset] = color.0;
        self.filled += 1;
    }

    /// The raw gray bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) is outside a {}x{} raster",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }
}

/// The authoritative count of pixels written in a run.  Shared
/// between the aggregator, which advances it, and the driver, which
/// reads it when the run is over.
#[derive(Debug)]
pub struct Completion {
    written: AtomicUsize,
    total: usize,
}

impl Completion {
    /// A counter that completes at `total`.
    pub fn new(total: usize) -> Self {
        Completion {
            written: AtomicUsize::new(0),
            total,
        }
    }

    /// Count one more written pixel and return the new count.  Panics
    /// if that would go past the total.
    pub fn record(&self) -> usize {
        let now = self.written.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(
            now <= self.total,
            "pixel {} arrived for an image of {}",
            now,
            self.total
        );
        now
    }

    /// Pixels written so far.
    pub fn written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }

    /// Pixels the run will write.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether every pixel has been written.
    pub fn is_complete(&self) -> bool {
        self.written() == self.total
    }
}

/// Where an aggregator is in its run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AggregatorState {
    /// No pixel has arrived yet.
    Waiting,
    /// Some pixels have arrived, not all.
    Receiving,
    /// Every expected pixel has been written.  Final.
    Complete,
}

/// Collects pixel results into a raster.
pub struct Aggregator<'a> {
    raster: Raster,
    completion: Arc<Completion>,
    state: AggregatorState,
    tracker: DecileTracker,
    progress: &'a dyn ProgressObserver,
}

impl<'a> Aggregator<'a> {
    /// An aggregator for a `width` x `height` raster that completes
    /// when `completion` reaches its total.
    pub fn new(
        width: usize,
        height: usize,
        completion: Arc<Completion>,
        progress: &'a dyn ProgressObserver,
    ) -> Self {
        let total = completion.total();
        assert!(
            total <= width * height,
            "{} pixels expected in a {}x{} raster",
            total,
            width,
            height
        );
        Aggregator {
            raster: Raster::new(width, height),
            tracker: DecileTracker::new(total),
            state: if total == 0 {
                AggregatorState::Complete
            } else {
                AggregatorState::Waiting
            },
            completion,
            progress,
        }
    }

    /// Current state.
    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Write one pixel, count it, and report the new state.
    pub fn accept(&mut self, pixel: PixelResult) -> AggregatorState {
        assert!(
            self.state != AggregatorState::Complete,
            "pixel ({}, {}) arrived after the image was complete",
            pixel.x,
            pixel.y
        );
        self.raster.put(pixel.x, pixel.y, pixel.color);
        let count = self.completion.record();

        for decile in self.tracker.advance(count) {
            self.progress.on_decile(Stage::Aggregate, decile);
        }
        self.state = if count == self.completion.total() {
            AggregatorState::Complete
        } else {
            AggregatorState::Receiving
        };
        self.state
    }

    /// Receive until the image is complete and hand back the raster.
    /// Stops as soon as the count is reached, without waiting for the
    /// channel to close.  If the channel closes first the run must have
    /// been cancelled; anything else is a wiring bug and panics.
    pub fn run(mut self, pixels: Receiver<PixelResult>, cancel: &Cancellation) -> Result<Raster> {
        while self.state() != AggregatorState::Complete {
            match pixels.recv() {
                Ok(pixel) => {
                    self.accept(pixel);
                }
                Err(_) if cancel.is_cancelled() => {
                    debug!(
                        "pixel channel drained after cancellation, {} of {} written",
                        self.completion.written(),
                        self.completion.total()
                    );
                    self.progress.on_finish(Stage::Aggregate);
                    return Err(Error::Cancelled {
                        written: self.completion.written(),
                        total: self.completion.total(),
                    });
                }
                Err(_) => panic!(
                    "pixel channel closed after {} of {} pixels",
                    self.completion.written(),
                    self.completion.total()
                ),
            }
        }
        self.progress.on_finish(Stage::Aggregate);
        Ok(self.raster)
    }
}
