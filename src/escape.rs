// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-pixel arithmetic: how many iterations of `z = z² + c` it
//! takes a point to escape, and how that count becomes a shade of
//! gray.  Everything here is pure; workers call it from many threads
//! at once.

use crate::config::RunConfig;
use crate::errors::Result;
use crate::planes::{Pixel, PlaneMapper};
use num::Complex;

/// An 8-bit grayscale intensity.  0 is black, 255 is white.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u8);

/// How an orbit is judged to have escaped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EscapeTest {
    /// Iterate in double precision while `|z|` stays within the
    /// escape radius.  The textbook criterion.
    Modulus,
    /// Iterate in single precision while the magnitude of the real
    /// part alone stays within the escape radius.  Not the textbook
    /// criterion, but reproduces images made by older renders of this
    /// program bit for bit.
    LegacyRealPart,
}

impl Default for EscapeTest {
    fn default() -> Self {
        EscapeTest::Modulus
    }
}

/// Number of iterations before the orbit of `c` leaves the escape
/// radius, or `bound` if it never does.
pub fn escape_time(c: Complex<f64>, bound: usize, radius: f64) -> usize {
    let limit = radius * radius;
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    let mut n = 0;
    while z.norm_sqr() <= limit && n < bound {
        z = z * z + c;
        n += 1;
    }
    n
}

/// `escape_time` as older renders computed it: single precision, and
/// only the real part is compared against the radius.
pub fn escape_time_legacy(c: Complex<f64>, bound: usize, radius: f64) -> usize {
    let c = Complex::new(c.re as f32, c.im as f32);
    let mut z = Complex::new(0.0_f32, 0.0_f32);
    let mut n = 0;
    while f64::from(z.re.abs()) <= radius && n < bound {
        z = z * z + c;
        n += 1;
    }
    n
}

/// Turns an iteration count into a color.
pub trait ColorMapper: Sync {
    /// The color of a point that took `count` of at most `bound`
    /// iterations to escape.
    fn map_intensity(&self, count: usize, bound: usize) -> Color;
}

/// Linear grayscale: fast escapes are white, the set itself is black.
/// With a bound of zero every point counts as inside the set.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinearGray;

impl ColorMapper for LinearGray {
    fn map_intensity(&self, count: usize, bound: usize) -> Color {
        if bound == 0 {
            return Color(0);
        }
        let count = count.min(bound);
        Color((255 - count * 255 / bound) as u8)
    }
}

/// The color of any pixel of the image.  Implementations must be pure:
/// the same pixel always yields the same color, from any thread.
pub trait PixelComputer: Sync {
    /// Color of the pixel at column `x`, row `y`.
    fn color(&self, x: usize, y: usize) -> Color;
}

/// The Mandelbrot set, drawn over a run's plane with a run's
/// iteration bound and escape radius.
#[derive(Debug)]
pub struct Mandelbrot<M = LinearGray> {
    plane: PlaneMapper,
    bound: usize,
    radius: f64,
    test: EscapeTest,
    colors: M,
}

impl Mandelbrot<LinearGray> {
    /// A grayscale Mandelbrot for the given run.
    pub fn new(config: &RunConfig) -> Result<Self> {
        Mandelbrot::with_colors(config, LinearGray)
    }
}

impl<M: ColorMapper> Mandelbrot<M> {
    /// A Mandelbrot for the given run, shaded by `colors`.
    pub fn with_colors(config: &RunConfig, colors: M) -> Result<Self> {
        Ok(Mandelbrot {
            plane: PlaneMapper::for_config(config)?,
            bound: config.iteration_bound,
            radius: config.escape_radius,
            test: config.escape_test,
            colors,
        })
    }

    /// Escape iteration count of one pixel.
    pub fn iterations(&self, x: usize, y: usize) -> usize {
        let c = self.plane.pixel_to_point(&Pixel(x, y));
        match self.test {
            EscapeTest::Modulus => escape_time(c, self.bound, self.radius),
            EscapeTest::LegacyRealPart => escape_time_legacy(c, self.bound, self.radius),
        }
    }
}

impl<M: ColorMapper> PixelComputer for Mandelbrot<M> {
    fn color(&self, x: usize, y: usize) -> Color {
        self.colors.map_intensity(self.iterations(x, y), self.bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 255, 2.0), 255);
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 100, 2.0), 100);
        assert_eq!(escape_time_legacy(Complex::new(0.0, 0.0), 255, 2.0), 255);
    }

    #[test]
    fn far_points_escape_quickly() {
        // z1 = 3, outside the radius on the second check.
        assert_eq!(escape_time(Complex::new(3.0, 0.0), 255, 2.0), 1);
        assert_eq!(escape_time(Complex::new(1.0, 1.0), 255, 2.0), 2);
    }

    #[test]
    fn legacy_test_ignores_the_imaginary_part() {
        // z1 = 3i is already outside the radius, but its real part is 0.
        // Only z2 = -9 + 3i trips the real-part test.
        let c = Complex::new(0.0, 3.0);
        assert_eq!(escape_time(c, 255, 2.0), 1);
        assert_eq!(escape_time_legacy(c, 255, 2.0), 2);
    }

    #[test]
    fn escape_time_is_pure() {
        let c = Complex::new(-0.743_643_887, 0.131_825_904);
        let first = escape_time(c, 1000, 2.0);
        for _ in 0..10 {
            assert_eq!(escape_time(c, 1000, 2.0), first);
            assert_eq!(
                escape_time_legacy(c, 1000, 2.0),
                escape_time_legacy(c, 1000, 2.0)
            );
        }
    }

    #[test]
    fn linear_gray_spans_white_to_black() {
        let gray = LinearGray;
        assert_eq!(gray.map_intensity(0, 255), Color(255));
        assert_eq!(gray.map_intensity(255, 255), Color(0));
        assert_eq!(gray.map_intensity(5, 10), Color(128));
        assert_eq!(gray.map_intensity(1, 10), Color(230));
        assert_eq!(gray.map_intensity(10, 10), Color(0));
    }

    #[test]
    fn linear_gray_with_no_iterations_is_black() {
        assert_eq!(LinearGray.map_intensity(0, 0), Color(0));
        assert_eq!(LinearGray.map_intensity(3, 0), Color(0));
    }

    #[test]
    fn mandelbrot_colors_by_escape_time() {
        let config = RunConfig {
            width: 3,
            height: 2,
            iteration_bound: 10,
            ..RunConfig::default()
        };
        let m = Mandelbrot::new(&config).unwrap();
        // (0, 0) is -2 - i, which escapes after one iteration.
        assert_eq!(m.iterations(0, 0), 1);
        assert_eq!(m.color(0, 0), Color(230));
        // (2, 1) is 0 + 0i, inside the set.
        assert_eq!(m.iterations(2, 1), 10);
        assert_eq!(m.color(2, 1), Color(0));
    }
}
