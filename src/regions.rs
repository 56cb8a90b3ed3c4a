// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splitting the image into units of work.
//!
//! A run asks for some number of regions; we lay the largest square
//! grid that count allows over the image and hand out its cells one
//! row at a time.  Cells are all the same size, `width / side` by
//! `height / side`, so when the image does not divide evenly the
//! leftover strip along the right and bottom edges belongs to no
//! region and is never rendered.

use crate::config::RunConfig;
use crate::errors::{Error, Result};
use itertools::iproduct;
use log::debug;

/// A half-open rectangle of pixels, `[min_x, max_x) x [min_y, max_y)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First column inside the region.
    pub min_x: usize,
    /// First column past the region.
    pub max_x: usize,
    /// First row inside the region.
    pub min_y: usize,
    /// First row past the region.
    pub max_y: usize,
}

impl Region {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.max_x - self.min_x
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.max_y - self.min_y
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Every pixel of the region, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(self.min_y..self.max_y, self.min_x..self.max_x).map(|(y, x)| (x, y))
    }
}

/// Lazily emits the cells of a square grid laid over the image, in
/// row-major order.
#[derive(Clone, Debug)]
pub struct RegionPartitioner {
    side: usize,
    cell_width: usize,
    cell_height: usize,
    next: usize,
}

impl RegionPartitioner {
    /// A partitioner for `config.region_count` regions over the
    /// configured image.
    pub fn new(config: &RunConfig) -> Result<Self> {
        RegionPartitioner::with_count(config.width, config.height, config.region_count)
    }

    /// A partitioner for `count` regions over a `width` x `height`
    /// image.
    pub fn with_count(width: usize, height: usize, count: usize) -> Result<Self> {
        if count < 1 {
            return Err(Error::config("region count must be at least 1"));
        }
        let side = (count as f64).sqrt() as usize;
        if side > width || side > height {
            return Err(Error::config(format!(
                "a {}x{} region grid does not fit in a {}x{} image",
                side, side, width, height
            )));
        }
        Ok(RegionPartitioner {
            side,
            cell_width: width / side,
            cell_height: height / side,
            next: 0,
        })
    }

    /// Number of regions per side of the grid.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of regions this partitioner emits.
    pub fn region_count(&self) -> usize {
        self.side * self.side
    }

    /// Number of pixels that belong to some region.  Equal to the
    /// image size exactly when both dimensions divide by `side()`.
    pub fn covered_pixels(&self) -> usize {
        self.region_count() * self.cell_width * self.cell_height
    }
}

impl Iterator for RegionPartitioner {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        if self.next >= self.region_count() {
            return None;
        }
        let (row, column) = (self.next / self.side, self.next % self.side);
        self.next += 1;

        let region = Region {
            min_x: column * self.cell_width,
            max_x: (column + 1) * self.cell_width,
            min_y: row * self.cell_height,
            max_y: (row + 1) * self.cell_height,
        };
        debug!("region {}: {:?}", self.next - 1, region);
        Some(region)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.region_count() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RegionPartitioner {}
