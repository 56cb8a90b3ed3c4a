// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Coarse progress reporting, kept out of the pipeline loops.  The
//! dispatcher and the aggregator each own a `DecileTracker` and call
//! the run's `ProgressObserver` whenever their count crosses another
//! tenth of its total.

use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::sync::Mutex;

/// Which part of the pipeline is reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Regions handed to workers.
    Dispatch,
    /// Pixels written into the raster.
    Aggregate,
}

/// Receives progress from a running pipeline.  Called from the
/// dispatcher and aggregator threads, so it must be shareable.
pub trait ProgressObserver: Sync {
    /// `stage` has completed `decile` tenths of its work, 1 through 10.
    fn on_decile(&self, stage: Stage, decile: usize);

    /// `stage` has nothing more to report.
    fn on_finish(&self, _stage: Stage) {}
}

/// Reports nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_decile(&self, _stage: Stage, _decile: usize) {}
}

/// Draws a bar of blocks, one per tenth of each stage's work: `▒` for
/// regions dispatched and `█` for pixels written.  Each stage ends its
/// bar with a newline.  The two stages run at the same time, so their
/// blocks may share a line.
#[derive(Debug)]
pub struct ProgressBar<W = io::Stderr> {
    out: Mutex<W>,
}

impl ProgressBar {
    /// A bar drawn on stderr.
    pub fn new() -> Self {
        ProgressBar::to(io::stderr())
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        ProgressBar::new()
    }
}

impl<W: Write> ProgressBar<W> {
    /// A bar drawn on `out`.
    pub fn to(out: W) -> Self {
        ProgressBar {
            out: Mutex::new(out),
        }
    }

    /// Hands back the writer, with everything drawn so far.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // Progress output is best effort; a closed stderr must not stop a render.
    fn draw(&self, mark: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(mark.as_bytes());
            let _ = out.flush();
        }
    }
}

impl<W: Write + Send> ProgressObserver for ProgressBar<W> {
    fn on_decile(&self, stage: Stage, _decile: usize) {
        self.draw(match stage {
            Stage::Dispatch => "▒",
            Stage::Aggregate => "█",
        });
    }

    fn on_finish(&self, _stage: Stage) {
        self.draw("\n");
    }
}

/// Turns a running count into decile crossings.
#[derive(Debug)]
pub struct DecileTracker {
    total: usize,
    reached: usize,
}

impl DecileTracker {
    /// A tracker for a count that will end at `total`.
    pub fn new(total: usize) -> Self {
        DecileTracker { total, reached: 0 }
    }

    /// Record that the count is now `count`.  Yields every decile
    /// crossed since the last call, which may be none.
    pub fn advance(&mut self, count: usize) -> RangeInclusive<usize> {
        let decile = if self.total == 0 {
            10
        } else {
            (count.min(self.total) * 10) / self.total
        };
        let crossed = (self.reached + 1)..=decile;
        if decile > self.reached {
            self.reached = decile;
        }
        crossed
    }
}
