// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The immutable description of one render.  Every stage of the
//! pipeline is handed a reference to the same `RunConfig`; nothing
//! about a run lives in global state.

use crate::errors::{Error, Result};
use crate::escape::EscapeTest;

/// The rectangle of the complex plane that is mapped onto the image.
/// The real axis runs along x, the imaginary axis along y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneBounds {
    /// Real value at pixel column 0.
    pub re_start: f64,
    /// Real value at pixel column `width`.
    pub re_end: f64,
    /// Imaginary value at pixel row 0.
    pub im_start: f64,
    /// Imaginary value at pixel row `height`.
    pub im_end: f64,
}

impl Default for PlaneBounds {
    fn default() -> Self {
        PlaneBounds {
            re_start: -2.0,
            re_end: 1.0,
            im_start: -1.0,
            im_end: 1.0,
        }
    }
}

/// Everything a render needs to know.  Built once, validated once,
/// then shared read-only with the partitioner and the pixel computer.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Requested number of regions.  The partitioner uses the largest
    /// square grid that fits, `floor(sqrt(region_count))` per side.
    pub region_count: usize,
    /// Ceiling on concurrently running workers.
    pub worker_count: usize,
    /// Maximum iterations before a point is declared inside the set.
    pub iteration_bound: usize,
    /// The window onto the complex plane.
    pub plane: PlaneBounds,
    /// Magnitude past which an orbit has escaped.
    pub escape_radius: f64,
    /// How escape is detected.
    pub escape_test: EscapeTest,
    /// Whether decile progress bars are drawn.
    pub progress: bool,
}

/// Base image size, multiplied by `DEFAULT_SCALE`.
pub const BASE_WIDTH: usize = 600;
/// Base image height, multiplied by `DEFAULT_SCALE`.
pub const BASE_HEIGHT: usize = 400;
/// Default scale factor applied to the base size.
pub const DEFAULT_SCALE: usize = 10;

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            width: BASE_WIDTH * DEFAULT_SCALE,
            height: BASE_HEIGHT * DEFAULT_SCALE,
            region_count: 64,
            worker_count: 12,
            iteration_bound: 255,
            plane: PlaneBounds::default(),
            escape_radius: 2.0,
            escape_test: EscapeTest::default(),
            progress: true,
        }
    }
}

impl RunConfig {
    /// A default configuration resized to `width` x `height`.
    pub fn with_size(width: usize, height: usize) -> Self {
        RunConfig {
            width,
            height,
            ..RunConfig::default()
        }
    }

    /// Total number of pixels in the raster.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the raster would have no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of regions per side of the partition grid.
    pub fn grid_side(&self) -> usize {
        (self.region_count as f64).sqrt() as usize
    }

    /// Check that this configuration describes a renderable image.
    /// Called before any channel or thread exists.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::config(format!(
                "image size {}x{} has no pixels",
                self.width, self.height
            )));
        }
        if self.region_count < 1 {
            return Err(Error::config("region count must be at least 1"));
        }
        let side = self.grid_side();
        if side > self.width || side > self.height {
            return Err(Error::config(format!(
                "a {}x{} region grid does not fit in a {}x{} image",
                side, side, self.width, self.height
            )));
        }
        if self.worker_count < 1 {
            return Err(Error::config("worker count must be at least 1"));
        }
        if self.iteration_bound < 1 {
            return Err(Error::config("iteration bound must be at least 1"));
        }

        let p = &self.plane;
        let finite = [p.re_start, p.re_end, p.im_start, p.im_end]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::config("plane bounds must be finite"));
        }
        if p.re_end <= p.re_start {
            return Err(Error::config(
                "the real axis must start to the left of where it ends",
            ));
        }
        if p.im_end <= p.im_start {
            return Err(Error::config(
                "the imaginary axis must start below where it ends",
            ));
        }
        if !(self.escape_radius.is_finite() && self.escape_radius > 0.0) {
            return Err(Error::config("escape radius must be a positive number"));
        }
        Ok(())
    }

    /// The conventional output name, `mandelbrot_<w>_<h>_<iter>.<ext>`.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "mandelbrot_{}_{}_{}.{}",
            self.width, self.height, self.iteration_bound, extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RunConfig {
        RunConfig {
            width: 4,
            height: 4,
            region_count: 4,
            worker_count: 2,
            ..RunConfig::default()
        }
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = RunConfig::default();
        assert_eq!((cfg.width, cfg.height), (6000, 4000));
        assert_eq!(cfg.len(), 24_000_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn grid_side_is_floor_of_square_root() {
        let mut cfg = small();
        for (n, side) in &[(1, 1), (3, 1), (4, 2), (10, 3), (64, 8), (99, 9)] {
            cfg.region_count = *n;
            assert_eq!(cfg.grid_side(), *side, "region_count = {}", n);
        }
    }

    #[test]
    fn rejects_zero_counts() {
        let mut cfg = small();
        cfg.region_count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.worker_count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.iteration_bound = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.height = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_grids_larger_than_the_image() {
        let mut cfg = small();
        cfg.region_count = 25;
        match cfg.validate() {
            Err(Error::Configuration(msg)) => assert!(msg.contains("5x5")),
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_inverted_or_degenerate_planes() {
        let mut cfg = small();
        cfg.plane.re_end = cfg.plane.re_start;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.plane.im_start = 2.0;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.plane.re_start = std::f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = small();
        cfg.escape_radius = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn file_name_follows_convention() {
        let cfg = RunConfig {
            iteration_bound: 10,
            ..small()
        };
        assert_eq!(cfg.file_name("png"), "mandelbrot_4_4_10.png");
    }
}
