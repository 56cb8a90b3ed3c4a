// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The sequential renderer.  "Naive" in this case means one thread,
//! no channels, no permits: walk the same regions the pipeline would,
//! in the same order, and color every pixel in place.  It is the
//! reference the pipeline is checked against, and a perfectly good
//! renderer for small images.

use crate::aggregate::Raster;
use crate::config::RunConfig;
use crate::errors::Result;
use crate::escape::{Mandelbrot, PixelComputer};
use crate::regions::RegionPartitioner;

/// Renders an image on the calling thread.
pub struct NaiveRenderer<P = Mandelbrot> {
    config: RunConfig,
    computer: P,
}

impl NaiveRenderer<Mandelbrot> {
    /// A renderer for the Mandelbrot set described by `config`.
    pub fn new(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let computer = Mandelbrot::new(config)?;
        Ok(NaiveRenderer {
            config: config.clone(),
            computer,
        })
    }
}

impl<P: PixelComputer> NaiveRenderer<P> {
    /// A renderer that colors the configured image with `computer`.
    pub fn with_computer(config: &RunConfig, computer: P) -> Result<Self> {
        config.validate()?;
        Ok(NaiveRenderer {
            config: config.clone(),
            computer,
        })
    }

    /// Draw every region, one after the other.
    pub fn render(&self) -> Result<Raster> {
        let mut raster = Raster::new(self.config.width, self.config.height);
        for region in RegionPartitioner::new(&self.config)? {
            for (x, y) in region.pixels() {
                raster.put(x, y, self.computer.color(x, y));
            }
        }
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::Color;

    #[test]
    fn fills_every_covered_pixel() {
        let config = RunConfig {
            progress: false,
            region_count: 4,
            ..RunConfig::with_size(6, 4)
        };
        let raster = NaiveRenderer::new(&config).unwrap().render().unwrap();
        assert_eq!(raster.filled(), 24);
    }

    #[test]
    fn leaves_the_truncated_edge_black() {
        struct White;
        impl PixelComputer for White {
            fn color(&self, _x: usize, _y: usize) -> Color {
                Color(255)
            }
        }

        let config = RunConfig {
            region_count: 10,
            ..RunConfig::with_size(10, 10)
        };
        let raster = NaiveRenderer::with_computer(&config, White)
            .unwrap()
            .render()
            .unwrap();
        assert_eq!(raster.filled(), 81);
        assert_eq!(raster.get(8, 8), Color(255));
        assert_eq!(raster.get(9, 0), Color(0));
        assert_eq!(raster.get(0, 9), Color(0));
    }

    #[test]
    fn the_set_is_black_and_the_outside_is_light() {
        let config = RunConfig {
            region_count: 1,
            iteration_bound: 50,
            ..RunConfig::with_size(30, 20)
        };
        let raster = NaiveRenderer::new(&config).unwrap().render().unwrap();
        // Pixel (20, 10) is the origin; (0, 0) is -2 - i.
        assert_eq!(raster.get(20, 10), Color(0));
        assert!(raster.get(0, 0).0 > 200);
    }
}
