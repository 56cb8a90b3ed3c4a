// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A worker draws exactly one region.

use crate::admission::Permit;
use crate::cancel::Cancellation;
use crate::escape::{Color, PixelComputer};
use crate::regions::Region;
use crossbeam::channel::Sender;
use log::trace;

/// One finished pixel on its way to the aggregator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelResult {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Computed color.
    pub color: Color,
}

/// Computes every pixel of one region and sends each to the
/// aggregator.  Holds a permit from the dispatcher's pool for as long
/// as it runs; giving that permit back is how the dispatcher learns
/// the worker is done.
pub struct Worker<'a, P: ?Sized> {
    region: Region,
    computer: &'a P,
    pixels: Sender<PixelResult>,
    permit: Permit,
    cancel: Cancellation,
}

impl<'a, P: PixelComputer + ?Sized> Worker<'a, P> {
    /// A worker bound to `region`, admitted by `permit`.
    pub fn new(
        region: Region,
        computer: &'a P,
        pixels: Sender<PixelResult>,
        permit: Permit,
        cancel: Cancellation,
    ) -> Self {
        Worker {
            region,
            computer,
            pixels,
            permit,
            cancel,
        }
    }

    /// Draw the region row by row, then release the permit.  Returns
    /// the number of pixels sent, which is short of the region's size
    /// only when the run was cancelled.
    pub fn run(self) -> usize {
        let Worker {
            region,
            computer,
            pixels,
            permit,
            cancel,
        } = self;
        trace!("worker starting on {:?}", region);

        let mut sent = 0;
        for (x, y) in region.pixels() {
            if cancel.is_cancelled() {
                trace!("worker on {:?} cancelled after {} pixels", region, sent);
                break;
            }
            let color = computer.color(x, y);
            if pixels.send(PixelResult { x, y, color }).is_err() {
                panic!(
                    "aggregator hung up with {} pixels of {:?} still to send",
                    region.pixel_count() - sent,
                    region
                );
            }
            sent += 1;
        }

        drop(pixels);
        drop(permit);
        trace!("worker finished {:?}", region);
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::TokenPool;
    use crossbeam::channel::unbounded;

    struct Checkerboard;

    impl PixelComputer for Checkerboard {
        fn color(&self, x: usize, y: usize) -> Color {
            Color(if (x + y) % 2 == 0 { 255 } else { 0 })
        }
    }

    fn region() -> Region {
        Region {
            min_x: 1,
            max_x: 3,
            min_y: 4,
            max_y: 6,
        }
    }

    #[test]
    fn sends_every_pixel_in_row_order_then_releases() {
        let pool = TokenPool::new(1);
        let (tx, rx) = unbounded();
        let worker = Worker::new(region(), &Checkerboard, tx, pool.acquire(), Cancellation::new());
        assert_eq!(pool.in_flight(), 1);

        assert_eq!(worker.run(), 4);
        assert_eq!(pool.in_flight(), 0);

        let got: Vec<PixelResult> = rx.iter().collect();
        let coords: Vec<(usize, usize)> = got.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(1, 4), (2, 4), (1, 5), (2, 5)]);
        assert_eq!(got[0].color, Color(0));
        assert_eq!(got[1].color, Color(255));
    }

    #[test]
    fn a_cancelled_worker_sends_nothing_and_still_releases() {
        let pool = TokenPool::new(1);
        let (tx, rx) = unbounded();
        let cancel = Cancellation::new();
        cancel.cancel();
        let worker = Worker::new(region(), &Checkerboard, tx, pool.acquire(), cancel);
        assert_eq!(worker.run(), 0);
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    #[should_panic(expected = "aggregator hung up")]
    fn a_missing_aggregator_is_fatal() {
        let pool = TokenPool::new(1);
        let (tx, rx) = unbounded();
        drop(rx);
        Worker::new(region(), &Checkerboard, tx, pool.acquire(), Cancellation::new()).run();
    }
}
