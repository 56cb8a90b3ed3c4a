//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane given by its start and end
//! values along each axis.
use crate::config::{PlaneBounds, RunConfig};
use crate::errors::{Error, Result};
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a window onto the complex plane.  Maps pixels from the first
/// onto points in the second.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The far corner of the integral cartesian plane.  The near
    /// corner is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The window onto the complex plane.
    pub complex_plane: PlaneBounds,
    // Width and height of the complex window.
    spans: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane and the
    /// bounds of the complex window.
    pub fn new(width: usize, height: usize, bounds: PlaneBounds) -> Result<PlaneMapper> {
        if width == 0 || height == 0 {
            return Err(Error::config("The integral plane has no area."));
        }
        if bounds.re_end < bounds.re_start {
            return Err(Error::config(
                "The real axis does not start to the left of where it ends.",
            ));
        }
        if bounds.im_end < bounds.im_start {
            return Err(Error::config(
                "The imaginary axis does not start below where it ends.",
            ));
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: bounds,
            spans: (
                bounds.re_end - bounds.re_start,
                bounds.im_end - bounds.im_start,
            ),
        })
    }

    /// The mapper for a run's image size and plane bounds.
    pub fn for_config(config: &RunConfig) -> Result<PlaneMapper> {
        PlaneMapper::new(config.width, config.height, config.plane)
    }

    /// Given a pixel on the integral cartesian plane, map it to a
    /// point in the complex window.  The fraction of the image is
    /// taken first and then scaled, so pixel `width` lands exactly on
    /// `re_end`.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let bounds = &self.complex_plane;
        Complex::new(
            bounds.re_start + (pixel.0 as f64) / (self.integral_plane.0 as f64) * self.spans.0,
            bounds.im_start + (pixel.1 as f64) / (self.integral_plane.1 as f64) * self.spans.1,
        )
    }
}
