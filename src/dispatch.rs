// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The dispatcher hands regions to workers, never letting more than
//! `worker_count` of them run at once.
//!
//! Each region waits for a permit from the token pool before its
//! worker is spawned.  Workers return the permit as they finish, which
//! is what lets the next region go.  The dispatcher is done as soon as
//! the last region has a worker; it does not wait for those workers to
//! finish.  Noticing that is the aggregator's job.

use crate::admission::TokenPool;
use crate::cancel::Cancellation;
use crate::escape::PixelComputer;
use crate::progress::{DecileTracker, ProgressObserver, Stage};
use crate::regions::Region;
use crate::worker::{PixelResult, Worker};
use crossbeam::channel::{Receiver, Sender};
use crossbeam::thread::Scope;
use log::{debug, info};

/// What the dispatcher did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    /// Regions handed to a worker.
    pub regions: usize,
    /// The most workers that were ever running at once.
    pub peak_workers: usize,
}

/// Launches one worker per region, gated by a token pool.
pub struct Dispatcher<'a, P: ?Sized> {
    computer: &'a P,
    pool: TokenPool,
    cancel: Cancellation,
    progress: &'a dyn ProgressObserver,
}

impl<'a, P: PixelComputer + ?Sized> Dispatcher<'a, P> {
    /// A dispatcher that allows `worker_count` concurrent workers, each
    /// of which colors pixels with `computer`.
    pub fn new(
        worker_count: usize,
        computer: &'a P,
        cancel: Cancellation,
        progress: &'a dyn ProgressObserver,
    ) -> Self {
        Dispatcher {
            computer,
            pool: TokenPool::new(worker_count),
            cancel,
            progress,
        }
    }

    /// Dispatch every region that arrives on `regions`, in arrival
    /// order, spawning workers into `scope`.  `expected` is only used
    /// for progress reporting.  Returns once the region channel is
    /// drained and closed, or once the run is cancelled.
    pub fn run<'env>(
        self,
        scope: &Scope<'env>,
        regions: Receiver<Region>,
        pixels: Sender<PixelResult>,
        expected: usize,
    ) -> DispatchReport
    where
        'a: 'env,
        P: 'env,
    {
        let mut tracker = DecileTracker::new(expected);
        let mut dispatched = 0;

        for region in regions.iter() {
            let permit = match self.pool.acquire_unless(&self.cancel) {
                Some(permit) => permit,
                None => {
                    info!(
                        "dispatch cancelled with {} of {} regions started",
                        dispatched, expected
                    );
                    break;
                }
            };
            let worker = Worker::new(
                region,
                self.computer,
                pixels.clone(),
                permit,
                self.cancel.clone(),
            );
            scope.spawn(move |_| worker.run());
            dispatched += 1;
            debug!(
                "dispatched region {} of {}, {} workers busy",
                dispatched,
                expected,
                self.pool.in_flight()
            );

            for decile in tracker.advance(dispatched) {
                self.progress.on_decile(Stage::Dispatch, decile);
            }
        }
        self.progress.on_finish(Stage::Dispatch);

        DispatchReport {
            regions: dispatched,
            peak_workers: self.pool.peak(),
        }
    }
}
